//! Cell quality filtering and store rewriting.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::Context;
use hashbrown::HashSet;
use itertools::Itertools;
use log::{
    debug,
    info,
    warn,
};

use crate::data_structs::typedef::DensityType;
use crate::data_structs::{
    CellStats,
    ChromCalls,
};
use crate::error::MethsweepError;
use crate::io::store::{
    StoreReader,
    StoreWriter,
};

/// Which cells of a store survive filtering. Numeric thresholds are
/// strict: a cell sitting exactly on the threshold is discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Keep cells with strictly more observed sites.
    MinSites(u64),
    /// Keep cells whose global methylation percentage strictly exceeds
    /// the threshold.
    MinMeth(DensityType),
    /// Keep exactly the named cells.
    Keep(HashSet<String>),
    /// Keep every cell except the named ones.
    Discard(HashSet<String>),
}

impl fmt::Display for FilterPredicate {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MinSites(threshold) => {
                write!(f, "total_sites > {}", threshold)
            },
            Self::MinMeth(threshold) => {
                write!(f, "meth_percent > {}", threshold)
            },
            Self::Keep(names) => write!(f, "keep {} named cells", names.len()),
            Self::Discard(names) => {
                write!(f, "discard {} named cells", names.len())
            },
        }
    }
}

/// Indices of the retained cells, in original store order.
///
/// A keep list naming an unknown cell is an error; a discard list
/// naming one is ignored with a warning, since discarding what is not
/// there is already satisfied.
pub fn select_cells(
    stats: &[CellStats],
    predicate: &FilterPredicate,
) -> Result<Vec<usize>, MethsweepError> {
    let known: HashSet<&str> =
        stats.iter().map(CellStats::cell_name).collect();
    if let FilterPredicate::Keep(names) = predicate {
        for name in names {
            if !known.contains(name.as_str()) {
                return Err(MethsweepError::UnknownCell(name.clone()));
            }
        }
    }
    if let FilterPredicate::Discard(names) = predicate {
        for name in names {
            if !known.contains(name.as_str()) {
                warn!("Cell {} not in store, nothing to discard", name);
            }
        }
    }

    let retained = stats
        .iter()
        .enumerate()
        .filter(|(_, cell)| {
            match predicate {
                FilterPredicate::MinSites(threshold) => {
                    cell.total_sites() > *threshold
                },
                FilterPredicate::MinMeth(threshold) => {
                    cell.meth_percent() > *threshold
                },
                FilterPredicate::Keep(names) => {
                    names.contains(cell.cell_name())
                },
                FilterPredicate::Discard(names) => {
                    !names.contains(cell.cell_name())
                },
            }
        })
        .map(|(idx, _)| idx)
        .collect_vec();

    if retained.is_empty() {
        return Err(MethsweepError::EmptyResult(format!(
            "filter ({}) retains no cells",
            predicate
        )));
    }
    Ok(retained)
}

#[derive(Debug, Clone, Copy)]
pub struct FilterSummary {
    pub retained:  usize,
    pub discarded: usize,
}

/// Rewrites a store with only the cells the predicate retains,
/// reindexed and with their statistics recomputed. `out_dir` may equal
/// `data_dir` for an in-place rewrite: the new store is staged in a
/// scratch directory next to the target and swapped in only after the
/// source is fully read. Smoothed tracks are pooled over all cells and
/// are not carried into the filtered store.
pub fn filter_data_dir(
    data_dir: &Path,
    out_dir: &Path,
    predicate: &FilterPredicate,
) -> anyhow::Result<FilterSummary> {
    let reader = StoreReader::open(data_dir)?;
    let stats = reader.cell_stats()?;
    let mut run_info = reader.run_info()?;

    let retained = select_cells(&stats, predicate)?;
    let kept_names = retained
        .iter()
        .map(|&idx| reader.cell_names()[idx].clone())
        .collect_vec();
    info!(
        "Filter ({}) retains {} of {} cells",
        predicate,
        retained.len(),
        stats.len()
    );

    let parent = out_dir.parent().filter(|p| !p.as_os_str().is_empty());
    let staging = match parent {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            tempfile::tempdir_in(parent)
        },
        None => tempfile::tempdir(),
    }
    .context("creating staging directory")?;

    let writer = StoreWriter::create(staging.path(), &kept_names)?;
    let mut new_stats = kept_names
        .iter()
        .map(|name| CellStats::new(name.as_str()))
        .collect_vec();

    for calls in reader.iter_chroms()? {
        let calls = calls?;
        let mut subset = ChromCalls::new(calls.chrom(), retained.len());
        for (new_idx, &old_idx) in retained.iter().enumerate() {
            for call in calls.cell(old_idx) {
                new_stats[new_idx].observe(call);
                subset.push(new_idx, *call);
            }
        }
        writer.write_chrom(&subset)?;
        debug!(
            "Chromosome {}: kept {} calls",
            subset.chrom(),
            subset.n_calls()
        );
    }

    run_info.record("filter", [(
        "predicate".to_string(),
        predicate.to_string(),
    )]);
    writer.finish(&new_stats, &run_info)?;

    // The source is fully read at this point, so an in-place target can
    // be swapped. The old store moves aside before the new one moves
    // in, so an interruption between the renames leaves a complete
    // store under one of the two names.
    let staged = staging.keep();
    let displaced = staged.with_extension("old");
    let had_target = out_dir.exists();
    if had_target {
        fs::rename(out_dir, &displaced).with_context(|| {
            format!("moving {} aside", out_dir.display())
        })?;
    }
    fs::rename(&staged, out_dir).with_context(|| {
        format!("moving {} to {}", staged.display(), out_dir.display())
    })?;
    if had_target {
        fs::remove_dir_all(&displaced)
            .with_context(|| format!("removing {}", displaced.display()))?;
    }

    Ok(FilterSummary {
        retained:  retained.len(),
        discarded: stats.len() - retained.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structs::typedef::PosType;
    use crate::data_structs::MethylationCall;

    fn stats(
        name: &str,
        sites: u64,
        methylated: u64,
    ) -> CellStats {
        let mut cell = CellStats::new(name);
        for i in 0..sites {
            let n_meth = u16::from(i < methylated);
            let call =
                MethylationCall::new(i as PosType + 1, n_meth, 1).unwrap();
            cell.observe(&call);
        }
        cell
    }

    fn ab() -> Vec<CellStats> {
        // a sits exactly at 50%, b above it.
        vec![stats("a", 6, 3), stats("b", 5, 3)]
    }

    #[test]
    fn min_meth_threshold_is_strict() {
        let retained =
            select_cells(&ab(), &FilterPredicate::MinMeth(50.0)).unwrap();
        assert_eq!(retained, vec![1]);

        let result = select_cells(&ab(), &FilterPredicate::MinMeth(100.0));
        assert!(matches!(result, Err(MethsweepError::EmptyResult(_))));
    }

    #[test]
    fn min_sites_threshold_is_strict() {
        let retained =
            select_cells(&ab(), &FilterPredicate::MinSites(5)).unwrap();
        assert_eq!(retained, vec![0]);

        let result = select_cells(&ab(), &FilterPredicate::MinSites(6));
        assert!(matches!(result, Err(MethsweepError::EmptyResult(_))));
    }

    #[test]
    fn keep_list_selects_named_cells() {
        let names = HashSet::from(["a".to_string()]);
        let retained =
            select_cells(&ab(), &FilterPredicate::Keep(names)).unwrap();
        assert_eq!(retained, vec![0]);
    }

    #[test]
    fn keep_list_with_unknown_cell_fails() {
        let names = HashSet::from(["a".to_string(), "z".to_string()]);
        let result = select_cells(&ab(), &FilterPredicate::Keep(names));
        assert!(matches!(result, Err(MethsweepError::UnknownCell(name)) if name == "z"));
    }

    #[test]
    fn discard_list_drops_named_cells_only() {
        let names = HashSet::from(["a".to_string()]);
        let retained =
            select_cells(&ab(), &FilterPredicate::Discard(names)).unwrap();
        assert_eq!(retained, vec![1]);

        // Discarding an unknown name is a no-op.
        let names = HashSet::from(["z".to_string()]);
        let retained =
            select_cells(&ab(), &FilterPredicate::Discard(names)).unwrap();
        assert_eq!(retained, vec![0, 1]);
    }

    #[test]
    fn selection_preserves_store_order() {
        let all: HashSet<String> =
            ["b", "a"].iter().map(|s| s.to_string()).collect();
        let retained =
            select_cells(&ab(), &FilterPredicate::Keep(all)).unwrap();
        assert_eq!(retained, vec![0, 1]);
    }

    #[test]
    fn predicate_display_names_the_rule() {
        assert_eq!(FilterPredicate::MinSites(5).to_string(), "total_sites > 5");
        assert_eq!(
            FilterPredicate::MinMeth(50.0).to_string(),
            "meth_percent > 50"
        );
    }
}
