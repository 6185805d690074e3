//! # methsweep
//!
//! `methsweep` is a Rust library and command-line tool for statistical
//! aggregation of single-cell DNA methylation data. It takes the
//! per-cell methylation call files produced by bisulfite or enzymatic
//! sequencing pipelines, organizes them into a chromosome-partitioned
//! data directory, and derives the summaries downstream analyses start
//! from: smoothed methylation tracks, cell by region matrices with
//! shrunken residuals, anchor-relative methylation profiles and
//! quality-filtered cell sets.
//!
//! The crate provides core data structures to represent methylation
//! calls and genomic coordinates, streaming I/O over the data
//! directory, and the statistical tools themselves.
//!
//! If you do not want to use methsweep as a crate, check out the
//! `methsweep` CLI tool in this repository!
//!
//! ## Key Features
//!
//! * **Strict Data Model**: Per-site calls ([`MethylationCall`]) carry
//!   validated read counts; per-chromosome containers ([`ChromCalls`])
//!   keep every cell's calls sorted, and malformed input fails fast
//!   instead of being silently corrected.
//! * **Chromosome-Partitioned Storage**: A prepared data directory
//!   holds one compressed call table per chromosome plus per-cell
//!   statistics and a provenance log, so every tool streams one
//!   chromosome at a time regardless of genome size.
//! * **Kernel Smoothing**: Pooled methylation tracks smoothed with
//!   triangular or Epanechnikov kernels in a single pass per
//!   chromosome ([`Smoother`]).
//! * **Region Aggregation**: Cell by region count, fraction and
//!   shrunken-residual matrices ([`RegionMatrixSet`]) over arbitrary
//!   BED intervals, written dense or as a sparse triplet layout.
//! * **Anchor Profiles**: Strand-aware methylation profiles around
//!   anchor points such as TSSs, with binomial confidence intervals
//!   ([`ProfileTable`]).
//! * **Cell Filtering**: Predicate-based cell selection with an atomic
//!   in-place store rewrite ([`FilterPredicate`]).
//! * **Parallel Processing**: Leverages Rayon for per-cell fan-out
//!   while chromosomes are decoded ahead on a reader thread.
//!
//! Number of threads to be used can be configured with setting
//! `METHSWEEP_NUM_THREADS` environment variable.
//!
//! ## Structure
//!
//! The crate is organized into several modules:
//!
//! * [`data_structs`]: Defines the fundamental data types used
//!   throughout the crate, including methylation calls
//!   ([`MethylationCall`], [`ChromCalls`]), genomic coordinates
//!   ([`GenomicInterval`], [`AnchorPoint`]) and per-cell statistics
//!   ([`CellStats`]).
//! * [`error`]: The typed error enum every precondition maps to.
//! * [`io`]: Handles file input and output, including coverage file
//!   parsing, BED parsing and the data directory format.
//! * [`tools`]: Contains the analytical tools: smoothing (`smooth`),
//!   region aggregation (`aggregate`, `matrix`), anchor profiles
//!   (`profile`) and cell filtering (`filter`).
//! * [`utils`]: Provides common utility functions, including binomial
//!   confidence intervals and the shared thread pool.
//!
//! ## Installation
//!
//! ```bash
//! # Add as a dependency to your Cargo.toml
//! cargo add methsweep
//! ```
//!
//! ## Usage
//!
//! ### Preparing a data directory from coverage files
//!
//! ```no_run
//! use methsweep::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coverage = CellCoverage::read("cells/a.cov.gz")?;
//!     let (name, track, stats) = coverage.into_parts();
//!
//!     let mut chrom1 = ChromCalls::new("1", 1);
//!     for call in track.get("1").unwrap_or_default() {
//!         chrom1.push(0, *call);
//!     }
//!
//!     let writer = StoreWriter::create("data_dir", &[name])?;
//!     writer.write_chrom(&chrom1)?;
//!     let run_info = RunInfo::new(
//!         "prepare",
//!         [("input_files".to_string(), "1".to_string())],
//!     );
//!     writer.finish(&[stats], &run_info)?;
//!     Ok(())
//! }
//! ```
//!
//! ### Smoothing the pooled methylation track
//!
//! ```no_run
//! use std::path::Path;
//!
//! use methsweep::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let smoother = Smoother::new(1000.0, KernelType::Triangular)?;
//!     let summary = smooth_data_dir(Path::new("data_dir"), &smoother)?;
//!     println!(
//!         "Smoothed {} sites on {} chromosomes",
//!         summary.sites, summary.chromosomes
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ### Building a cell by region matrix
//!
//! ```no_run
//! use std::fs::File;
//! use std::path::Path;
//!
//! use methsweep::io::bed::read_intervals;
//! use methsweep::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StoreReader::open("data_dir")?;
//!     let intervals = read_intervals(File::open("regions.bed")?)?;
//!
//!     let config = MatrixConfig::default().with_pseudocount(2.0);
//!     let matrix = RegionMatrixSet::build(&store, &intervals, &config)?;
//!     println!(
//!         "{} cells over {} regions, global mean {:.3}",
//!         matrix.n_cells(),
//!         matrix.n_intervals(),
//!         matrix.global_mean()
//!     );
//!
//!     matrix.write_dense(Path::new("out_dir"))?;
//!     Ok(())
//! }
//! ```
//!
//! ### Profiling methylation around anchor points
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::stdout;
//!
//! use methsweep::io::bed::{
//!     read_anchors,
//!     DEFAULT_STRAND_COLUMN,
//! };
//! use methsweep::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = StoreReader::open("data_dir")?;
//!     let anchors =
//!         read_anchors(File::open("tss.bed")?, DEFAULT_STRAND_COLUMN)?;
//!
//!     let config = ProfileConfig::default().with_width(2000);
//!     let table = ProfileTable::build(&store, &anchors, &config)?;
//!     table.write_csv(stdout().lock())?;
//!     Ok(())
//! }
//! ```

pub mod data_structs;
pub mod error;
pub mod io;
pub mod prelude;
pub mod tools;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
