//! Reading of per-cell methylation coverage files.
//!
//! The accepted layout is the six-column coverage table emitted by
//! common bisulfite callers: `chrom  start  end  density  count_m
//! count_um`, tab-separated, optionally gzipped. One file holds one
//! cell; the cell takes its name from the file name with extensions
//! stripped.

use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;

use anyhow::Context;
use log::debug;

use crate::data_structs::typedef::{
    CountType,
    PosType,
};
use crate::data_structs::{
    CellStats,
    CellTrack,
    MethylationCall,
    validate_sorted,
};
use crate::io::compression::Compression;

type CoverageRow = (String, PosType, PosType, f64, CountType, CountType);

/// One parsed coverage file: the cell's calls grouped by chromosome
/// plus its accumulated quality statistics.
#[derive(Debug, Clone)]
pub struct CellCoverage {
    cell_name: String,
    track:     CellTrack,
    stats:     CellStats,
}

impl CellCoverage {
    pub fn read<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let handle = File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let decoder = Compression::from_path(path).get_decoder(handle);
        Self::from_reader(BufReader::new(decoder), &cell_name_from_path(path))
            .with_context(|| format!("reading {}", path.display()))
    }

    /// Parses coverage rows for one cell. Rows may arrive in any
    /// order; calls are sorted per chromosome on the way in, but a
    /// position appearing twice within one chromosome is rejected.
    /// Rows without any covering read are dropped.
    pub fn from_reader<R: Read>(
        reader: R,
        cell_name: &str,
    ) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut track = CellTrack::new();
        let mut stats = CellStats::new(cell_name);
        let mut skipped = 0usize;

        for (idx, row) in csv_reader.deserialize::<CoverageRow>().enumerate() {
            let (chrom, position, _end, _density, count_m, count_um) =
                row.with_context(|| format!("coverage record {}", idx + 1))?;
            let n_total = count_m.checked_add(count_um).with_context(|| {
                format!("read counts overflow at {}:{}", chrom, position)
            })?;
            if n_total == 0 {
                skipped += 1;
                continue;
            }
            let call = MethylationCall::new(position, count_m, n_total)?;
            stats.observe(&call);
            track.push(&chrom, call);
        }
        if skipped > 0 {
            debug!(
                "Cell {}: skipped {} rows without covering reads",
                cell_name, skipped
            );
        }

        track.sort();
        for (chrom, calls) in track.iter() {
            validate_sorted(calls).with_context(|| {
                format!("chromosome {} of cell {}", chrom, cell_name)
            })?;
        }

        Ok(Self {
            cell_name: cell_name.to_string(),
            track,
            stats,
        })
    }

    pub fn cell_name(&self) -> &str {
        &self.cell_name
    }

    pub fn stats(&self) -> &CellStats {
        &self.stats
    }

    pub fn track(&self) -> &CellTrack {
        &self.track
    }

    pub fn into_parts(self) -> (String, CellTrack, CellStats) {
        (self.cell_name, self.track, self.stats)
    }
}

/// Strips at most one content extension plus an optional `.gz` suffix,
/// so `a.cov.gz`, `a.cov` and `a` all name the cell `a`.
pub fn cell_name_from_path(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stripped = file_name
        .strip_suffix(".gz")
        .unwrap_or(&file_name);
    match stripped.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => stripped.to_string(),
    }
}
