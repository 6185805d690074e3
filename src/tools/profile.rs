//! Anchor-relative methylation profiles.
//!
//! Calls near a set of anchor positions are folded onto a common
//! relative axis, strand-flipped so upstream and downstream keep their
//! biological meaning, then aggregated per (offset, cell) with a
//! binomial confidence interval on each aggregate.

use std::io::Write;

use anyhow::Context;
use hashbrown::HashMap;
use log::{
    info,
    warn,
};
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::{
    DensityType,
    OffsetType,
    PosType,
    SumType,
};
use crate::data_structs::{
    AnchorPoint,
    MethylationCall,
    Strand,
};
use crate::error::MethsweepError;
use crate::io::store::StoreReader;
use crate::utils::{
    binomial_ci,
    safe_frac,
    z_score,
    CiMethod,
    DEFAULT_CONFIDENCE,
    THREAD_POOL,
};
use crate::with_field_fn;

/// Half-width of the window kept around each anchor.
pub const DEFAULT_WIDTH: PosType = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileConfig {
    width:      PosType,
    ci_method:  CiMethod,
    confidence: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            width:      DEFAULT_WIDTH,
            ci_method:  CiMethod::default(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl ProfileConfig {
    with_field_fn!(width, PosType);

    with_field_fn!(ci_method, CiMethod);

    with_field_fn!(confidence, f64);

    pub fn width(&self) -> PosType {
        self.width
    }

    pub fn ci_method(&self) -> CiMethod {
        self.ci_method
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// One aggregated (relative position, cell) point. Field order is the
/// output column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub position:  OffsetType,
    pub cell:      usize,
    pub n_meth:    SumType,
    pub cell_name: String,
    pub n_total:   SumType,
    pub meth_frac: DensityType,
    pub ci_lower:  DensityType,
    pub ci_upper:  DensityType,
}

const PROFILE_HEADER: [&str; 8] = [
    "position",
    "cell",
    "n_meth",
    "cell_name",
    "n_total",
    "meth_frac",
    "ci_lower",
    "ci_upper",
];

/// Profile rows sorted by (relative position, cell).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTable {
    rows: Vec<ProfileRow>,
}

impl ProfileTable {
    pub fn rows(&self) -> &[ProfileRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Aggregates every (call, anchor) pair within the window. Offsets
    /// run `position − anchor` on the forward strand and are mirrored
    /// on the reverse strand; anchors without a strand count as
    /// forward. A call near several anchors contributes once per
    /// anchor.
    pub fn build(
        store: &StoreReader,
        anchors: &[AnchorPoint],
        config: &ProfileConfig,
    ) -> anyhow::Result<Self> {
        if anchors.is_empty() {
            return Err(MethsweepError::EmptyResult(
                "no anchors to profile".to_string(),
            )
            .into());
        }

        let n_cells = store.n_cells();
        let mut by_chrom: HashMap<&str, Vec<(PosType, Strand)>> =
            HashMap::new();
        for anchor in anchors {
            by_chrom
                .entry(anchor.chrom())
                .or_default()
                .push((anchor.position(), anchor.strand()));
        }
        for list in by_chrom.values_mut() {
            list.sort_by_key(|(position, _)| *position);
        }

        let mut per_cell: Vec<HashMap<OffsetType, (SumType, SumType)>> =
            vec![HashMap::new(); n_cells];
        let mut chroms_seen = 0usize;
        for calls in store.iter_chroms()? {
            let calls = calls?;
            let Some(chrom_anchors) = by_chrom.get(calls.chrom())
            else {
                continue;
            };
            chroms_seen += 1;
            THREAD_POOL.install(|| {
                per_cell
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(cell, counts)| {
                        accumulate_cell(
                            calls.cell(cell),
                            chrom_anchors,
                            config.width,
                            counts,
                        );
                    });
            });
        }
        if chroms_seen < by_chrom.len() {
            warn!(
                "{} of {} anchor chromosomes have no calls in the store",
                by_chrom.len() - chroms_seen,
                by_chrom.len()
            );
        }

        let z = z_score(config.confidence);
        let mut rows = Vec::new();
        for (cell_idx, counts) in per_cell.iter().enumerate() {
            for (&position, &(n_meth, n_total)) in counts {
                let (ci_lower, ci_upper) =
                    binomial_ci(n_meth, n_total, z, config.ci_method);
                rows.push(ProfileRow {
                    position,
                    cell: cell_idx + 1,
                    n_meth,
                    cell_name: store.cell_names()[cell_idx].clone(),
                    n_total,
                    meth_frac: safe_frac(n_meth, n_total),
                    ci_lower,
                    ci_upper,
                });
            }
        }
        rows.sort_by_key(|row| (row.position, row.cell));

        if rows.is_empty() {
            warn!("No calls within {} of any anchor", config.width);
        }
        info!(
            "Profiled {} anchors into {} rows",
            anchors.len(),
            rows.len()
        );
        Ok(Self { rows })
    }

    /// Writes the table as CSV. The header is emitted even for an
    /// empty table.
    pub fn write_csv<W: Write>(
        &self,
        writer: W,
    ) -> anyhow::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer
            .write_record(PROFILE_HEADER)
            .context("writing profile header")?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn accumulate_cell(
    calls: &[MethylationCall],
    anchors: &[(PosType, Strand)],
    width: PosType,
    counts: &mut HashMap<OffsetType, (SumType, SumType)>,
) {
    for &(anchor, strand) in anchors {
        let lo = calls
            .partition_point(|call| call.position() < anchor.saturating_sub(width));
        let hi = calls
            .partition_point(|call| call.position() <= anchor.saturating_add(width));
        for call in &calls[lo..hi] {
            let offset = match strand {
                Strand::Reverse => {
                    anchor as OffsetType - call.position() as OffsetType
                },
                _ => call.position() as OffsetType - anchor as OffsetType,
            };
            let entry = counts.entry(offset).or_insert((0, 0));
            entry.0 += call.n_meth() as SumType;
            entry.1 += call.n_total() as SumType;
        }
    }
}
