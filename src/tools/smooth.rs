//! Kernel smoothing of pooled methylation tracks.
//!
//! Positions are irregularly spaced, so neighbours are weighted by
//! genomic distance within a bandwidth window, never by index rank.
//! Chromosome ends get no special treatment: a boundary position
//! simply has fewer neighbours on one side.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use log::{
    debug,
    info,
};

use crate::data_structs::typedef::{
    DensityType,
    PosType,
};
use crate::error::MethsweepError;
use crate::io::store::{
    write_smoothed_track,
    StoreReader,
};

pub const DEFAULT_BANDWIDTH: DensityType = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelType {
    #[default]
    Triangular,
    Epanechnikov,
}

impl KernelType {
    /// Weight of a neighbour at distance `d` under bandwidth `h`. Both
    /// kernels vanish at and beyond `d == h`; the centre point itself
    /// always carries positive weight.
    pub fn weight(
        &self,
        d: DensityType,
        h: DensityType,
    ) -> DensityType {
        let u = d / h;
        match self {
            KernelType::Triangular => (1.0 - u).max(0.0),
            KernelType::Epanechnikov => (0.75 * (1.0 - u * u)).max(0.0),
        }
    }
}

impl FromStr for KernelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "triangular" => Ok(Self::Triangular),
            "epanechnikov" => Ok(Self::Epanechnikov),
            other => Err(format!("unknown kernel: {}", other)),
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Triangular => write!(f, "triangular"),
            Self::Epanechnikov => write!(f, "epanechnikov"),
        }
    }
}

/// Distance-weighted smoother over one sorted track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    bandwidth: DensityType,
    kernel:    KernelType,
}

impl Default for Smoother {
    fn default() -> Self {
        Self {
            bandwidth: DEFAULT_BANDWIDTH,
            kernel:    KernelType::default(),
        }
    }
}

impl Smoother {
    pub fn new(
        bandwidth: DensityType,
        kernel: KernelType,
    ) -> Result<Self, MethsweepError> {
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(MethsweepError::InvalidBandwidth(bandwidth));
        }
        Ok(Self { bandwidth, kernel })
    }

    pub fn bandwidth(&self) -> DensityType {
        self.bandwidth
    }

    pub fn kernel(&self) -> KernelType {
        self.kernel
    }

    /// Smooths one chromosome's fractions in place of its positions.
    /// One output value per input position, in input order. Positions
    /// must be strictly ascending.
    ///
    /// The window holds every call within `bandwidth` of the centre,
    /// maintained by two cursors that only ever advance, so a full
    /// track costs the sum of its window sizes rather than a fresh
    /// scan per position.
    pub fn smooth_track(
        &self,
        positions: &[PosType],
        fractions: &[DensityType],
    ) -> Result<Vec<DensityType>, MethsweepError> {
        assert_eq!(positions.len(), fractions.len());
        for pair in positions.windows(2) {
            if pair[1] == pair[0] {
                return Err(MethsweepError::DuplicatePosition(pair[1]));
            }
            if pair[1] < pair[0] {
                return Err(MethsweepError::UnsortedPositions {
                    prev:    pair[0],
                    current: pair[1],
                });
            }
        }

        let h = self.bandwidth;
        let n = positions.len();
        let mut smoothed = Vec::with_capacity(n);
        let (mut lo, mut hi) = (0usize, 0usize);

        for i in 0..n {
            while positions[i].abs_diff(positions[lo]) as DensityType > h {
                lo += 1;
            }
            while hi < n
                && positions[hi].abs_diff(positions[i]) as DensityType <= h
            {
                hi += 1;
            }

            let mut weight_sum = 0.0;
            let mut value_sum = 0.0;
            for j in lo..hi {
                let d = positions[i].abs_diff(positions[j]) as DensityType;
                let w = self.kernel.weight(d, h);
                weight_sum += w;
                value_sum += w * fractions[j];
            }
            smoothed.push(if weight_sum > 0.0 {
                value_sum / weight_sum
            }
            else {
                // Degenerate window, fall back to the raw fraction.
                fractions[i]
            });
        }
        Ok(smoothed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothSummary {
    pub chromosomes: usize,
    pub sites:       usize,
}

/// Smooths the pooled track of every chromosome in a store, writing
/// one `smoothed/{chrom}.csv` per chromosome.
pub fn smooth_data_dir(
    data_dir: &Path,
    smoother: &Smoother,
) -> anyhow::Result<SmoothSummary> {
    let reader = StoreReader::open(data_dir)?;
    info!(
        "Smoothing {} with bandwidth {} ({} kernel)",
        data_dir.display(),
        smoother.bandwidth(),
        smoother.kernel()
    );

    let mut summary = SmoothSummary::default();
    for calls in reader.iter_chroms()? {
        let calls = calls?;
        if calls.is_empty() {
            debug!("Chromosome {} has no calls, skipping", calls.chrom());
            continue;
        }
        let (positions, fractions) = calls.pooled_track();
        let smoothed = smoother
            .smooth_track(&positions, &fractions)
            .with_context(|| format!("smoothing chromosome {}", calls.chrom()))?;
        write_smoothed_track(data_dir, calls.chrom(), &positions, &smoothed)?;

        debug!(
            "Chromosome {}: smoothed {} sites",
            calls.chrom(),
            positions.len()
        );
        summary.chromosomes += 1;
        summary.sites += positions.len();
    }
    Ok(summary)
}
