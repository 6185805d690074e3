//! Cell × region methylation matrices with shrinkage.
//!
//! Coverage per (cell, region) pair spans orders of magnitude in
//! single-cell data, so besides the raw count and fraction matrices a
//! shrunken residual matrix is produced: the deviation from the
//! genome-wide mean, damped toward zero where few reads support it.

use std::path::Path;

use anyhow::Context;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{
    info,
    warn,
};
use ndarray::Array2;
use rayon::prelude::*;

use super::aggregate::{
    tally_intervals,
    IntervalTally,
    OverlapPolicy,
};
use crate::data_structs::typedef::{
    DensityType,
    SumType,
};
use crate::data_structs::GenomicInterval;
use crate::error::MethsweepError;
use crate::io::store::StoreReader;
use crate::io::{
    create_gz,
    finish_gz,
    finish_gz_csv,
};
use crate::utils::{
    safe_frac,
    THREAD_POOL,
};
use crate::{
    getter_fn,
    with_field_fn,
};

pub const DEFAULT_PSEUDOCOUNT: DensityType = 1.0;

/// Residual of a tally against the genome-wide mean, shrunk toward
/// zero by `pseudocount` extra virtual reads. Converges to the raw
/// residual `frac − global_mean` as coverage grows and to 0 as it
/// vanishes.
pub fn shrunken_residual(
    methylated_sites: SumType,
    total_sites: SumType,
    global_mean: DensityType,
    pseudocount: DensityType,
) -> DensityType {
    let total = total_sites as DensityType;
    (methylated_sites as DensityType - total * global_mean)
        / (total + pseudocount)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixConfig {
    pseudocount:    DensityType,
    overlap_policy: OverlapPolicy,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            pseudocount:    DEFAULT_PSEUDOCOUNT,
            overlap_policy: OverlapPolicy::default(),
        }
    }
}

impl MatrixConfig {
    with_field_fn!(pseudocount, DensityType);

    with_field_fn!(overlap_policy, OverlapPolicy);

    pub fn pseudocount(&self) -> DensityType {
        self.pseudocount
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }
}

/// One populated cell of the sparse matrix, with 1-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseEntry {
    pub cell:        usize,
    pub interval:    usize,
    pub total_sites: SumType,
    pub meth_frac:   DensityType,
}

/// The four aligned cell × interval matrices of one run. Rows follow
/// store cell order, columns follow the input interval order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMatrixSet {
    cell_names:         Vec<String>,
    labels:             Vec<String>,
    total_sites:        Array2<SumType>,
    methylated_sites:   Array2<SumType>,
    meth_fractions:     Array2<DensityType>,
    shrunken_residuals: Array2<DensityType>,
    global_mean:        DensityType,
}

impl RegionMatrixSet {
    getter_fn!(cell_names, Vec<String>);

    getter_fn!(labels, Vec<String>);

    getter_fn!(total_sites, Array2<SumType>);

    getter_fn!(methylated_sites, Array2<SumType>);

    getter_fn!(meth_fractions, Array2<DensityType>);

    getter_fn!(shrunken_residuals, Array2<DensityType>);

    pub fn global_mean(&self) -> DensityType {
        self.global_mean
    }

    pub fn n_cells(&self) -> usize {
        self.cell_names.len()
    }

    pub fn n_intervals(&self) -> usize {
        self.labels.len()
    }

    /// Builds all four matrices from a store in two passes over the
    /// tallies: counting (parallel across cells, one chromosome at a
    /// time), then residuals once the genome-wide mean is known. The
    /// mean covers every call in the store, including chromosomes no
    /// interval touches.
    pub fn build(
        store: &StoreReader,
        intervals: &[GenomicInterval],
        config: &MatrixConfig,
    ) -> anyhow::Result<Self> {
        if !config.pseudocount.is_finite() || config.pseudocount <= 0.0 {
            return Err(
                MethsweepError::InvalidPseudocount(config.pseudocount).into()
            );
        }
        if intervals.is_empty() {
            return Err(MethsweepError::EmptyResult(
                "no intervals to aggregate".to_string(),
            )
            .into());
        }

        let n_cells = store.n_cells();
        let n_intervals = intervals.len();

        // Columns must follow input order, but the sweep wants intervals
        // sorted by start, so keep the original index next to each one.
        let mut by_chrom: HashMap<&str, Vec<usize>> = HashMap::new();
        for (idx, interval) in intervals.iter().enumerate() {
            by_chrom
                .entry(interval.chrom())
                .or_default()
                .push(idx);
        }
        for indices in by_chrom.values_mut() {
            indices.sort_by_key(|&idx| intervals[idx].start());
        }

        let mut total_sites = Array2::<SumType>::zeros((n_cells, n_intervals));
        let mut methylated_sites =
            Array2::<SumType>::zeros((n_cells, n_intervals));
        let (mut meth_sum, mut read_sum) = (0 as SumType, 0 as SumType);
        let mut chroms_seen: Vec<String> = Vec::new();

        for calls in store.iter_chroms()? {
            let calls = calls?;
            let (chrom_meth, chrom_reads) = calls.count_sums();
            meth_sum += chrom_meth;
            read_sum += chrom_reads;
            chroms_seen.push(calls.chrom().to_string());

            let Some(indices) = by_chrom.get(calls.chrom())
            else {
                continue;
            };
            let sorted = indices
                .iter()
                .map(|&idx| intervals[idx].clone())
                .collect_vec();

            let per_cell: Vec<Vec<IntervalTally>> = THREAD_POOL.install(|| {
                (0..n_cells)
                    .into_par_iter()
                    .map(|cell| {
                        tally_intervals(
                            calls.cell(cell),
                            &sorted,
                            config.overlap_policy,
                        )
                    })
                    .collect::<Result<_, _>>()
            })
            .with_context(|| {
                format!("aggregating chromosome {}", calls.chrom())
            })?;

            for (cell, tallies) in per_cell.iter().enumerate() {
                for (&idx, tally) in indices.iter().zip(tallies) {
                    total_sites[[cell, idx]] = tally.total_sites;
                    methylated_sites[[cell, idx]] = tally.methylated_sites;
                }
            }
        }

        for (chrom, indices) in by_chrom
            .iter()
            .sorted_by_key(|(chrom, _)| *chrom)
        {
            if !chroms_seen.iter().any(|seen| seen == chrom) {
                warn!(
                    "Store has no calls for chromosome {} ({} intervals)",
                    chrom,
                    indices.len()
                );
            }
        }

        let global_mean = safe_frac(meth_sum, read_sum);
        if read_sum == 0 {
            warn!("Store holds no calls at all, global mean set to 0");
        }
        info!(
            "Aggregated {} intervals over {} cells, global mean {:.4}",
            n_intervals, n_cells, global_mean
        );

        let meth_fractions = ndarray::Zip::from(&methylated_sites)
            .and(&total_sites)
            .map_collect(|&meth, &total| safe_frac(meth, total));
        let shrunken_residuals = ndarray::Zip::from(&methylated_sites)
            .and(&total_sites)
            .map_collect(|&meth, &total| {
                shrunken_residual(meth, total, global_mean, config.pseudocount)
            });

        Ok(Self {
            cell_names: store.cell_names().to_vec(),
            labels: intervals
                .iter()
                .map(GenomicInterval::label)
                .collect(),
            total_sites,
            methylated_sites,
            meth_fractions,
            shrunken_residuals,
            global_mean,
        })
    }

    /// Populated entries in cell-major order, 1-based as written to
    /// coordinate output. Pairs without any covering read are omitted.
    pub fn sparse_entries(&self) -> Vec<SparseEntry> {
        let mut entries = Vec::new();
        for cell in 0..self.n_cells() {
            for interval in 0..self.n_intervals() {
                let total = self.total_sites[[cell, interval]];
                if total == 0 {
                    continue;
                }
                entries.push(SparseEntry {
                    cell:        cell + 1,
                    interval:    interval + 1,
                    total_sites: total,
                    meth_frac:   self.meth_fractions[[cell, interval]],
                });
            }
        }
        entries
    }

    /// Writes the four dense tables, gzipped, one row per cell with a
    /// leading name column.
    pub fn write_dense(
        &self,
        out_dir: &Path,
    ) -> anyhow::Result<()> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;

        self.write_dense_table(
            &out_dir.join("total_sites.csv.gz"),
            |cell| self.total_sites.row(cell).to_vec(),
        )?;
        self.write_dense_table(
            &out_dir.join("methylated_sites.csv.gz"),
            |cell| self.methylated_sites.row(cell).to_vec(),
        )?;
        self.write_dense_table(
            &out_dir.join("methylation_fractions.csv.gz"),
            |cell| self.meth_fractions.row(cell).to_vec(),
        )?;
        self.write_dense_table(
            &out_dir.join("mean_shrunken_residuals.csv.gz"),
            |cell| self.shrunken_residuals.row(cell).to_vec(),
        )?;

        info!(
            "Wrote dense {} x {} matrices to {}",
            self.n_cells(),
            self.n_intervals(),
            out_dir.display()
        );
        Ok(())
    }

    fn write_dense_table<T, F>(
        &self,
        path: &Path,
        row: F,
    ) -> anyhow::Result<()>
    where
        T: serde::Serialize,
        F: Fn(usize) -> Vec<T>, {
        let mut writer = csv::Writer::from_writer(create_gz(path)?);
        writer.serialize(("cell_name", &self.labels))?;
        for (cell, name) in self.cell_names.iter().enumerate() {
            writer.serialize((name.as_str(), row(cell)))?;
        }
        finish_gz_csv(writer)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Writes the sparse coordinate triple `matrix.mtx.gz` plus the
    /// `features`/`barcodes` label files next to it.
    pub fn write_sparse(
        &self,
        out_dir: &Path,
    ) -> anyhow::Result<()> {
        use std::io::Write;

        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;

        let entries = self.sparse_entries();
        let mtx_path = out_dir.join("matrix.mtx.gz");
        let mut writer = create_gz(&mtx_path)?;
        for entry in &entries {
            writeln!(
                writer,
                "{} {} {} {:?}",
                entry.cell, entry.interval, entry.total_sites, entry.meth_frac
            )?;
        }
        finish_gz(writer)
            .with_context(|| format!("writing {}", mtx_path.display()))?;

        let mut features = create_gz(out_dir.join("features.tsv.gz"))?;
        for label in &self.labels {
            writeln!(features, "{}", label)?;
        }
        finish_gz(features)?;

        let mut barcodes = create_gz(out_dir.join("barcodes.tsv.gz"))?;
        for name in &self.cell_names {
            writeln!(barcodes, "{}", name)?;
        }
        finish_gz(barcodes)?;

        info!(
            "Wrote {} sparse entries to {}",
            entries.len(),
            out_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn residual_limits() {
        // Coverage at the mean leaves no residual.
        assert_eq!(shrunken_residual(5, 10, 0.5, 1.0), 0.0);
        // No coverage shrinks fully to zero.
        assert_eq!(shrunken_residual(0, 0, 0.7, 1.0), 0.0);
        // High coverage approaches the raw residual.
        assert_approx_eq!(
            shrunken_residual(10_000, 10_000, 0.5, 1.0),
            0.5,
            1e-4
        );
    }

    #[test]
    fn residual_grows_monotonically_with_coverage() {
        // Fixed raw fraction 1.0 against mean 0.5: more reads, less
        // shrinkage.
        let residuals = (0..12)
            .map(|k| {
                let total = 1u64 << k;
                shrunken_residual(total, total, 0.5, 1.0)
            })
            .collect::<Vec<_>>();
        for pair in residuals.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(residuals.iter().all(|r| r.abs() < 0.5));
    }

    #[test]
    fn stronger_pseudocount_shrinks_harder() {
        let weak = shrunken_residual(4, 4, 0.5, 1.0);
        let strong = shrunken_residual(4, 4, 0.5, 10.0);
        assert!(strong.abs() < weak.abs());
        assert!(weak > 0.0 && strong > 0.0);
    }

    #[test]
    fn sparse_entries_skip_uncovered_pairs() {
        let set = RegionMatrixSet {
            cell_names:         vec!["a".to_string(), "b".to_string()],
            labels:             vec!["1:0-10".to_string(), "1:10-20".to_string()],
            total_sites:        array![[2, 0], [1, 3]],
            methylated_sites:   array![[1, 0], [0, 3]],
            meth_fractions:     array![[0.5, 0.0], [0.0, 1.0]],
            shrunken_residuals: array![[0.0, 0.0], [-0.25, 0.375]],
            global_mean:        0.5,
        };

        let entries = set.sparse_entries();
        let coords = entries
            .iter()
            .map(|e| (e.cell, e.interval, e.total_sites, e.meth_frac))
            .collect::<Vec<_>>();
        assert_eq!(coords, vec![
            (1, 1, 2, 0.5),
            (2, 1, 1, 0.0),
            (2, 2, 3, 1.0),
        ]);
    }

    #[test]
    fn config_builders() {
        let config = MatrixConfig::default()
            .with_pseudocount(2.5)
            .with_overlap_policy(OverlapPolicy::Disjoint);
        assert_eq!(config.pseudocount(), 2.5);
        assert_eq!(config.overlap_policy(), OverlapPolicy::Disjoint);
    }
}
