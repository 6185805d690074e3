use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    ensure,
    Context,
};
use itertools::Itertools;
use log::debug;

use super::{
    chrom_file_name,
    RunInfo,
    CELL_STATS,
    COLUMN_HEADER,
    RUN_INFO,
    SMOOTHED_DIR,
};
use crate::data_structs::typedef::{
    DensityType,
    PosType,
};
use crate::data_structs::{
    CellStats,
    ChromCalls,
};
use crate::error::MethsweepError;
use crate::io::{
    create_gz,
    finish_gz_csv,
};

/// Writes a prepared store directory: the column header up front,
/// per-chromosome call tables as they come, statistics and provenance
/// on [`finish`](StoreWriter::finish).
pub struct StoreWriter {
    dir:     PathBuf,
    n_cells: usize,
}

impl StoreWriter {
    pub fn create<P: AsRef<Path>>(
        dir: P,
        cell_names: &[String],
    ) -> anyhow::Result<Self> {
        if cell_names.is_empty() {
            return Err(MethsweepError::EmptyResult(
                "store creation without any cells".to_string(),
            )
            .into());
        }
        ensure!(
            cell_names.iter().all_unique(),
            "duplicate cell names in store"
        );

        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        fs::write(
            dir.join(COLUMN_HEADER),
            cell_names.join("\n") + "\n",
        )?;
        debug!(
            "Created store {} for {} cells",
            dir.display(),
            cell_names.len()
        );

        Ok(Self {
            dir,
            n_cells: cell_names.len(),
        })
    }

    /// Writes one chromosome table, rows sorted by (position, cell).
    /// Chromosomes without any call produce no file.
    pub fn write_chrom(
        &self,
        calls: &ChromCalls,
    ) -> anyhow::Result<()> {
        ensure!(
            calls.n_cells() == self.n_cells,
            "chromosome {} holds {} cells, store has {}",
            calls.chrom(),
            calls.n_cells(),
            self.n_cells
        );
        if calls.is_empty() {
            debug!("Chromosome {} has no calls, skipping", calls.chrom());
            return Ok(());
        }

        let mut rows = (0..calls.n_cells())
            .flat_map(|cell| {
                calls
                    .cell(cell)
                    .iter()
                    .map(move |call| (call.position(), cell, call))
            })
            .collect_vec();
        rows.sort_by_key(|(position, cell, _)| (*position, *cell));

        let path = self.dir.join(chrom_file_name(calls.chrom()));
        let mut writer = csv::Writer::from_writer(create_gz(&path)?);
        for (position, cell, call) in rows {
            writer.serialize((cell, position, call.n_meth(), call.n_total()))?;
        }
        finish_gz_csv(writer)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Writes the per-cell statistics table and the provenance log,
    /// completing the store.
    pub fn finish(
        self,
        stats: &[CellStats],
        run_info: &RunInfo,
    ) -> anyhow::Result<()> {
        ensure!(
            stats.len() == self.n_cells,
            "{} statistics rows for {} cells",
            stats.len(),
            self.n_cells
        );

        let mut writer = csv::Writer::from_path(self.dir.join(CELL_STATS))?;
        for cell in stats {
            writer.serialize(cell)?;
        }
        writer.flush()?;

        fs::write(self.dir.join(RUN_INFO), run_info.to_string())?;
        Ok(())
    }
}

/// Writes one smoothed track as plain `position,fraction` rows under
/// the store's `smoothed/` subdirectory.
pub fn write_smoothed_track(
    data_dir: &Path,
    chrom: &str,
    positions: &[PosType],
    fractions: &[DensityType],
) -> anyhow::Result<()> {
    ensure!(
        positions.len() == fractions.len(),
        "{} positions against {} smoothed values",
        positions.len(),
        fractions.len()
    );

    let smoothed_dir = data_dir.join(SMOOTHED_DIR);
    fs::create_dir_all(&smoothed_dir)
        .with_context(|| format!("creating {}", smoothed_dir.display()))?;

    let path = smoothed_dir.join(format!("{}.csv", chrom));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    for (position, fraction) in positions.iter().zip(fractions) {
        writer.serialize((position, fraction))?;
    }
    writer.flush()?;
    Ok(())
}
