//! Parsing of BED-like interval and anchor tables.
//!
//! Coordinates are read as end-inclusive, matching the tables this
//! toolchain historically consumed, and converted to half-open intervals
//! on the way in. Input row order is preserved because matrix columns
//! must line up with it.

use std::io::Read;

use anyhow::{
    bail,
    Context,
};
use log::warn;

use crate::data_structs::coords::{
    AnchorPoint,
    GenomicInterval,
};
use crate::data_structs::typedef::PosType;
use crate::data_structs::Strand;

/// 1-based index of the BED column holding the strand, as in the common
/// `chrom start end strand name` layout.
pub const DEFAULT_STRAND_COLUMN: usize = 4;

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn parse_coords(
    record: &csv::StringRecord
) -> anyhow::Result<(&str, PosType, PosType)> {
    let chrom = record.get(0).context("missing chromosome field")?;
    let start = record
        .get(1)
        .context("missing start field")?
        .trim()
        .parse::<PosType>()
        .context("invalid start coordinate")?;
    let end = record
        .get(2)
        .context("missing end field")?
        .trim()
        .parse::<PosType>()
        .context("invalid end coordinate")?;
    Ok((chrom, start, end))
}

/// Reads genomic intervals from a BED-like table, one per input row and
/// in input order. A fourth column, when present, becomes the interval
/// name.
pub fn read_intervals<R: Read>(
    reader: R
) -> anyhow::Result<Vec<GenomicInterval>> {
    let mut intervals = Vec::new();
    for (idx, record) in tsv_reader(reader).records().enumerate() {
        let row = || format!("BED record {}", idx + 1);
        let record = record.with_context(row)?;
        let (chrom, start, end) = parse_coords(&record).with_context(row)?;
        let name = record
            .get(3)
            .filter(|name| !name.is_empty())
            .map(String::from);
        intervals.push(
            GenomicInterval::from_inclusive(chrom, start, end, name)
                .with_context(row)?,
        );
    }
    if intervals.is_empty() {
        warn!("No intervals found in BED input");
    }
    Ok(intervals)
}

/// Reads anchor points from a BED-like table. Each row's anchor is the
/// midpoint of its end-inclusive span; the strand is taken from the
/// 1-based `strand_column` and treated as unstranded when the column is
/// absent or not `+`/`-`.
pub fn read_anchors<R: Read>(
    reader: R,
    strand_column: usize,
) -> anyhow::Result<Vec<AnchorPoint>> {
    if strand_column == 0 {
        bail!("Strand column index is 1-based, got 0");
    }
    let mut anchors = Vec::new();
    for (idx, record) in tsv_reader(reader).records().enumerate() {
        let row = || format!("BED record {}", idx + 1);
        let record = record.with_context(row)?;
        let (chrom, start, end) = parse_coords(&record).with_context(row)?;
        if end < start {
            bail!("{}: end {} below start {}", row(), end, start);
        }
        let strand = record
            .get(strand_column - 1)
            .and_then(|field| field.parse::<Strand>().ok())
            .unwrap_or(Strand::None);
        let midpoint = start + (end - start) / 2;
        anchors.push(AnchorPoint::new(chrom, midpoint, strand));
    }
    if anchors.is_empty() {
        warn!("No anchors found in BED input");
    }
    Ok(anchors)
}
