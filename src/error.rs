//! Typed errors for the aggregation core.
//!
//! Every precondition named by the component contracts maps to one variant
//! here, so callers can fail fast on malformed input instead of silently
//! correcting it. I/O layers wrap this type with [`anyhow`] context.

use thiserror::Error;

use crate::data_structs::typedef::PosType;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MethsweepError {
    /// Call positions must be strictly ascending within one cell and
    /// chromosome.
    #[error("positions out of order: {prev} followed by {current}")]
    UnsortedPositions { prev: PosType, current: PosType },

    /// The same position appeared twice within one cell and chromosome.
    #[error("duplicate position {0}")]
    DuplicatePosition(PosType),

    /// Interval start must lie strictly below its half-open end.
    #[error("invalid interval {chrom}:{start}-{end}")]
    InvalidInterval {
        chrom: String,
        start: PosType,
        end:   PosType,
    },

    /// Intervals must be sorted by start position within a chromosome.
    #[error("intervals out of order: start {prev} followed by start {current}")]
    UnsortedIntervals { prev: PosType, current: PosType },

    /// Overlap found while the disjoint policy was requested.
    #[error(
        "overlapping intervals under disjoint policy: previous end {prev_end} \
         exceeds start {start}"
    )]
    OverlappingIntervals { prev_end: PosType, start: PosType },

    /// Kernel bandwidth must be a positive number.
    #[error("bandwidth must be positive, got {0}")]
    InvalidBandwidth(f64),

    /// Shrinkage pseudocount must be a positive number.
    #[error("pseudocount must be positive, got {0}")]
    InvalidPseudocount(f64),

    /// Read counts must satisfy `1 <= n_total` and `n_meth <= n_total`.
    #[error("invalid read counts {n_meth}/{n_total} at position {position}")]
    InvalidCounts {
        position: PosType,
        n_meth:   u64,
        n_total:  u64,
    },

    /// A keep list referenced a cell that is not part of the store.
    #[error("unknown cell name: {0}")]
    UnknownCell(String),

    /// Filter invocations must carry exactly one predicate.
    #[error("exactly one filter predicate must be provided")]
    InvalidPredicate,

    /// An operation retained nothing; reported instead of writing empty
    /// output.
    #[error("empty result: {0}")]
    EmptyResult(String),
}
