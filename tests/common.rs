#![allow(dead_code)]

use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;
use methsweep::data_structs::typedef::CountType;
use methsweep::prelude::*;

pub const CELL_NAMES: [&str; 2] = ["a", "b"];

/// Pooled methylated reads over pooled total reads of the reference
/// store below.
pub const GLOBAL_MEAN: f64 = 6.0 / 11.0;

/// Writes the small reference store shared by the integration tests:
///
/// ```text
/// chromosome 1            chromosome 2
/// pos    a      b         pos     a      b
/// 42     0/1    1/1       1000    0/1    0/1
/// 50     1/1    .         1234    1/1    1/1
/// 52     0/1    0/1       1235    1/1    1/1
/// ```
///
/// Cell `a` covers 6 sites (3 methylated), cell `b` covers 5 sites
/// (3 methylated), and the pooled genome-wide mean is 6/11.
pub fn write_tiny_store(dir: &Path) -> anyhow::Result<()> {
    let mut stats = CELL_NAMES.map(CellStats::new).to_vec();

    let mut chr1 = ChromCalls::new("1", CELL_NAMES.len());
    fill(&mut chr1, &mut stats, 0, &[(42, 0, 1), (50, 1, 1), (52, 0, 1)])?;
    fill(&mut chr1, &mut stats, 1, &[(42, 1, 1), (52, 0, 1)])?;

    let mut chr2 = ChromCalls::new("2", CELL_NAMES.len());
    for cell in 0..CELL_NAMES.len() {
        fill(&mut chr2, &mut stats, cell, &[
            (1000, 0, 1),
            (1234, 1, 1),
            (1235, 1, 1),
        ])?;
    }

    let cell_names = CELL_NAMES.map(String::from).to_vec();
    let writer = StoreWriter::create(dir, &cell_names)?;
    writer.write_chrom(&chr1)?;
    writer.write_chrom(&chr2)?;
    writer.finish(
        &stats,
        &RunInfo::new("prepare", [(
            "input_files".to_string(),
            "2".to_string(),
        )]),
    )?;
    Ok(())
}

fn fill(
    chrom: &mut ChromCalls,
    stats: &mut [CellStats],
    cell: usize,
    calls: &[(PosType, CountType, CountType)],
) -> anyhow::Result<()> {
    for &(position, n_meth, n_total) in calls {
        let call = MethylationCall::new(position, n_meth, n_total)?;
        stats[cell].observe(&call);
        chrom.push(cell, call);
    }
    Ok(())
}

/// Decompresses a gzipped file into a string.
pub fn read_gz(path: &Path) -> anyhow::Result<String> {
    let mut text = String::new();
    MultiGzDecoder::new(std::fs::File::open(path)?).read_to_string(&mut text)?;
    Ok(text)
}
