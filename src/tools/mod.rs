//! This module provides the statistical tools of the methsweep crate.
//!
//! It covers every analysis step downstream of a prepared data
//! directory: kernel smoothing of pooled methylation tracks, cell by
//! region aggregation, anchor-relative methylation profiles and cell
//! quality filtering.
//!
//! Key submodules:
//!
//! - [`smooth`]: Kernel smoothing of pooled per-chromosome methylation
//!   tracks, the prerequisite for variance-based region selection.
//! - [`aggregate`]: The interval sweep shared by matrix building, which
//!   tallies per-cell read counts over sorted genomic intervals.
//! - [`matrix`]: Cell by region methylation matrices with shrunken
//!   residuals, in dense and sparse output layouts.
//! - [`profile`]: Anchor-relative methylation profiles with binomial
//!   confidence intervals.
//! - [`filter`]: Cell quality filtering and store rewriting.
pub mod aggregate;
pub mod filter;
pub mod matrix;
pub mod profile;
pub mod smooth;
