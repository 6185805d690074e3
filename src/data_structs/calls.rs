//! Per-site methylation counts and their per-chromosome containers.

use hashbrown::HashMap;
use itertools::Itertools;

use super::typedef::{
    CellIdx,
    CountType,
    DensityType,
    PosType,
    SumType,
};
use crate::error::MethsweepError;

/// A single measured cytosine in a single cell.
///
/// `n_total` is the number of reads covering the site and `n_meth` the
/// number of those reads that were methylated. `n_total` is always at
/// least one and `n_meth` never exceeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethylationCall {
    position: PosType,
    n_meth:   CountType,
    n_total:  CountType,
}

impl MethylationCall {
    pub fn new(
        position: PosType,
        n_meth: CountType,
        n_total: CountType,
    ) -> Result<Self, MethsweepError> {
        if n_total == 0 || n_meth > n_total {
            return Err(MethsweepError::InvalidCounts {
                position,
                n_meth: n_meth as u64,
                n_total: n_total as u64,
            });
        }
        Ok(Self {
            position,
            n_meth,
            n_total,
        })
    }

    pub fn position(&self) -> PosType {
        self.position
    }

    pub fn n_meth(&self) -> CountType {
        self.n_meth
    }

    pub fn n_total(&self) -> CountType {
        self.n_total
    }

    /// Methylated fraction of the covering reads.
    pub fn frac(&self) -> DensityType {
        self.n_meth as DensityType / self.n_total as DensityType
    }

    /// Whether a strict majority of the covering reads is methylated.
    /// Binary input (single-read sites) reduces to the read value itself.
    pub fn is_methylated(&self) -> bool {
        (self.n_meth as u32) * 2 > self.n_total as u32
    }
}

/// Checks that positions increase strictly. Equal neighbours are reported
/// as duplicates, decreasing ones as unsorted input.
pub fn validate_sorted(
    calls: &[MethylationCall]
) -> Result<(), MethsweepError> {
    for pair in calls.windows(2) {
        let (prev, current) = (pair[0].position, pair[1].position);
        if current == prev {
            return Err(MethsweepError::DuplicatePosition(current));
        }
        if current < prev {
            return Err(MethsweepError::UnsortedPositions { prev, current });
        }
    }
    Ok(())
}

/// Calls of one cell grouped by chromosome, the shape produced when
/// parsing a single coverage file.
#[derive(Debug, Clone, Default)]
pub struct CellTrack {
    per_chrom: HashMap<String, Vec<MethylationCall>>,
}

impl CellTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        chrom: &str,
        call: MethylationCall,
    ) {
        self.per_chrom
            .entry_ref(chrom)
            .or_default()
            .push(call);
    }

    pub fn iter(
        &self
    ) -> impl Iterator<Item = (&String, &Vec<MethylationCall>)> {
        self.per_chrom.iter()
    }

    pub fn get(
        &self,
        chrom: &str,
    ) -> Option<&[MethylationCall]> {
        self.per_chrom.get(chrom).map(Vec::as_slice)
    }

    /// Sorts every chromosome by position. Stable, so duplicates stay
    /// adjacent for [`validate_sorted`] to catch.
    pub fn sort(&mut self) {
        for calls in self.per_chrom.values_mut() {
            calls.sort_by_key(MethylationCall::position);
        }
    }

    pub fn n_calls(&self) -> usize {
        self.per_chrom.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_chrom.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Vec<MethylationCall>> {
        self.per_chrom
    }
}

/// All calls of one chromosome, split per cell with every cell's calls
/// sorted by position.
#[derive(Debug, Clone)]
pub struct ChromCalls {
    chrom:    String,
    per_cell: Vec<Vec<MethylationCall>>,
}

impl ChromCalls {
    pub fn new(
        chrom: impl Into<String>,
        n_cells: usize,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            per_cell: vec![Vec::new(); n_cells],
        }
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn n_cells(&self) -> usize {
        self.per_cell.len()
    }

    pub fn cell(
        &self,
        idx: CellIdx,
    ) -> &[MethylationCall] {
        &self.per_cell[idx]
    }

    pub fn push(
        &mut self,
        cell: CellIdx,
        call: MethylationCall,
    ) {
        self.per_cell[cell].push(call);
    }

    pub fn n_calls(&self) -> usize {
        self.per_cell.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.per_cell.iter().all(Vec::is_empty)
    }

    /// Sum of methylated and covering read counts over every cell, the
    /// quantities behind the genome-wide mean methylation.
    pub fn count_sums(&self) -> (SumType, SumType) {
        self.per_cell
            .iter()
            .flatten()
            .fold((0, 0), |(meth, total), call| {
                (
                    meth + call.n_meth as SumType,
                    total + call.n_total as SumType,
                )
            })
    }

    pub fn validate(&self) -> Result<(), MethsweepError> {
        self.per_cell
            .iter()
            .try_for_each(|calls| validate_sorted(calls))
    }

    /// Merges all cells into one sorted track of pooled methylated
    /// fractions, combining read counts where cells share a position.
    pub fn pooled_track(&self) -> (Vec<PosType>, Vec<DensityType>) {
        let merged = self
            .per_cell
            .iter()
            .map(|calls| calls.iter())
            .kmerge_by(|a, b| a.position < b.position);

        let mut positions = Vec::with_capacity(self.n_calls());
        let mut fractions = Vec::with_capacity(self.n_calls());
        for (position, group) in &merged.chunk_by(|call| call.position) {
            let (n_meth, n_total) =
                group.fold((0 as SumType, 0 as SumType), |(m, t), call| {
                    (m + call.n_meth as SumType, t + call.n_total as SumType)
                });
            positions.push(position);
            fractions.push(n_meth as DensityType / n_total as DensityType);
        }
        (positions, fractions)
    }
}
