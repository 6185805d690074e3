//! This module contains the core data structures used throughout the
//! `methsweep` crate for representing single-cell methylation data.
//!
//! Key components of this module include:
//!
//! - [`calls`]: Per-site read counts of one cell ([`MethylationCall`]) and
//!   their containers, a per-cell [`CellTrack`] grouped by chromosome and
//!   a per-chromosome [`ChromCalls`] split by cell.
//! - [`coords`]: Genomic locations consumed from BED input:
//!   [`GenomicInterval`] for half-open regions and [`AnchorPoint`] for
//!   strand-aware reference positions.
//! - [`cellstats`]: The per-cell coverage and methylation summary
//!   ([`CellStats`]) driving quality filtering.
//! - Common enumerations, such as [`Strand`] for genomic strand.
//! - [`typedef`]: Type aliases for positions, counts, and densities to
//!   improve code readability and maintainability.

pub mod calls;
pub mod cellstats;
pub mod coords;
mod enums;
pub mod typedef;

pub use calls::{
    CellTrack,
    ChromCalls,
    MethylationCall,
    validate_sorted,
};
pub use cellstats::CellStats;
pub use coords::{
    AnchorPoint,
    GenomicInterval,
};
pub use enums::Strand;
