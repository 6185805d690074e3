//! The prepared cell-call store: one directory holding a column header
//! of cell names, per-chromosome gzipped call tables sorted by
//! (position, cell), per-cell quality statistics and a provenance log.

mod read;
mod run_info;
mod write;

pub use read::{
    StoreIterator,
    StoreReader,
};
pub use run_info::RunInfo;
pub use write::{
    write_smoothed_track,
    StoreWriter,
};

/// File holding one cell name per line, in store column order.
pub const COLUMN_HEADER: &str = "column_header.txt";
/// Per-cell quality statistics table.
pub const CELL_STATS: &str = "cell_stats.csv";
/// Provenance log of the commands that produced this store.
pub const RUN_INFO: &str = "run_info.txt";
/// Subdirectory for smoothed methylation tracks.
pub const SMOOTHED_DIR: &str = "smoothed";

pub(crate) const CHROM_SUFFIX: &str = ".csv.gz";

pub(crate) fn chrom_file_name(chrom: &str) -> String {
    format!("{}{}", chrom, CHROM_SUFFIX)
}
