use std::fs::{
    self,
    File,
};
use std::io::BufReader;
use std::path::{
    Path,
    PathBuf,
};
use std::thread::JoinHandle;

use anyhow::{
    bail,
    ensure,
    Context,
};
use crossbeam::channel::Receiver;
use log::debug;

use super::{
    chrom_file_name,
    RunInfo,
    CELL_STATS,
    CHROM_SUFFIX,
    COLUMN_HEADER,
    RUN_INFO,
};
use crate::data_structs::typedef::{
    CountType,
    PosType,
};
use crate::data_structs::{
    CellStats,
    ChromCalls,
    MethylationCall,
};
use crate::io::compression::Compression;

type StoreRow = (usize, PosType, CountType, CountType);

/// Read access to a prepared store directory.
pub struct StoreReader {
    dir:        PathBuf,
    cell_names: Vec<String>,
}

impl StoreReader {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            bail!("{} is not a prepared data directory", dir.display());
        }

        let header_path = dir.join(COLUMN_HEADER);
        let cell_names: Vec<String> = fs::read_to_string(&header_path)
            .with_context(|| format!("reading {}", header_path.display()))?
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        if cell_names.is_empty() {
            bail!("{} lists no cells", header_path.display());
        }
        debug!(
            "Opened store {} with {} cells",
            dir.display(),
            cell_names.len()
        );

        Ok(Self { dir, cell_names })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn cell_names(&self) -> &[String] {
        &self.cell_names
    }

    pub fn n_cells(&self) -> usize {
        self.cell_names.len()
    }

    /// Per-cell statistics, in column-header order.
    pub fn cell_stats(&self) -> anyhow::Result<Vec<CellStats>> {
        let path = self.dir.join(CELL_STATS);
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let stats = reader
            .deserialize::<CellStats>()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("reading {}", path.display()))?;

        ensure!(
            stats.len() == self.n_cells()
                && stats
                    .iter()
                    .zip(&self.cell_names)
                    .all(|(row, name)| row.cell_name() == name),
            "{} does not match the store's column header",
            path.display()
        );
        Ok(stats)
    }

    /// Provenance log, empty when the file is absent.
    pub fn run_info(&self) -> anyhow::Result<RunInfo> {
        let path = self.dir.join(RUN_INFO);
        if !path.is_file() {
            return Ok(RunInfo::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        Ok(content.parse::<RunInfo>().unwrap_or_default())
    }

    /// Chromosome names, in lexicographic file order.
    pub fn chromosomes(&self) -> anyhow::Result<Vec<String>> {
        let mut chroms = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("listing {}", self.dir.display()))?
        {
            let file_name = entry?.file_name();
            if let Some(chrom) = file_name
                .to_string_lossy()
                .strip_suffix(CHROM_SUFFIX)
            {
                chroms.push(chrom.to_string());
            }
        }
        chroms.sort();
        Ok(chroms)
    }

    pub fn read_chrom(
        &self,
        chrom: &str,
    ) -> anyhow::Result<ChromCalls> {
        read_chrom_file(&self.dir, chrom, self.n_cells())
    }

    /// Iterates chromosomes in order, decoding ahead on a reader
    /// thread.
    pub fn iter_chroms(&self) -> anyhow::Result<StoreIterator> {
        let chroms = self.chromosomes()?;
        let dir = self.dir.clone();
        let n_cells = self.n_cells();
        let (sender, receiver) = crossbeam::channel::bounded(2);

        let join_handle = std::thread::spawn(move || {
            for chrom in chroms {
                let result = read_chrom_file(&dir, &chrom, n_cells);
                let failed = result.is_err();
                if sender.send(result).is_err() || failed {
                    break;
                }
            }
        });

        Ok(StoreIterator {
            _join_handle: join_handle,
            receiver,
        })
    }
}

fn read_chrom_file(
    dir: &Path,
    chrom: &str,
    n_cells: usize,
) -> anyhow::Result<ChromCalls> {
    let path = dir.join(chrom_file_name(chrom));
    let handle = File::open(&path)
        .with_context(|| format!("opening {}", path.display()))?;
    let decoder = Compression::from_path(&path).get_decoder(handle);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(BufReader::new(decoder));

    let mut calls = ChromCalls::new(chrom, n_cells);
    for (idx, row) in reader.deserialize::<StoreRow>().enumerate() {
        let (cell, position, n_meth, n_total) = row
            .with_context(|| format!("record {} of {}", idx + 1, path.display()))?;
        ensure!(
            cell < n_cells,
            "cell index {} out of range ({} cells) in {}",
            cell,
            n_cells,
            path.display()
        );
        calls.push(cell, MethylationCall::new(position, n_meth, n_total)?);
    }
    calls
        .validate()
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(calls)
}

/// Yields one [`ChromCalls`] per chromosome file, stopping after the
/// first error.
pub struct StoreIterator {
    _join_handle: JoinHandle<()>,
    receiver:     Receiver<anyhow::Result<ChromCalls>>,
}

impl Iterator for StoreIterator {
    type Item = anyhow::Result<ChromCalls>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}
