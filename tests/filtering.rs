mod common;

use hashbrown::HashSet;
use methsweep::prelude::*;
use rstest::{
    fixture,
    rstest,
};
use tempfile::TempDir;

use crate::common::write_tiny_store;

#[fixture]
fn store() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_tiny_store(dir.path()).unwrap();
    dir
}

#[rstest]
fn min_meth_keeps_the_more_methylated_cell(
    store: TempDir
) -> anyhow::Result<()> {
    let out = TempDir::new()?;
    let target = out.path().join("filtered");
    let summary = filter_data_dir(
        store.path(),
        &target,
        &FilterPredicate::MinMeth(50.0),
    )?;
    assert_eq!((summary.retained, summary.discarded), (1, 1));

    // Cell a sits exactly on 50% and is dropped; b is reindexed to
    // column 0 with its statistics recomputed from the kept calls.
    let reader = StoreReader::open(&target)?;
    assert_eq!(reader.cell_names(), ["b".to_string()]);

    let stats = reader.cell_stats()?;
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].cell_name(), "b");
    assert_eq!(stats[0].total_sites(), 5);
    assert_eq!(stats[0].methylated_sites(), 3);

    let chr1 = reader.read_chrom("1")?;
    assert_eq!(chr1.n_cells(), 1);
    let calls = chr1.cell(0);
    assert_eq!(calls.len(), 2);
    assert_eq!(
        (calls[0].position(), calls[0].n_meth(), calls[0].n_total()),
        (42, 1, 1)
    );

    // The provenance log keeps the prepare section and appends one for
    // the filter run.
    let info = reader.run_info()?.to_string();
    assert!(info.contains("methsweep prepare version"));
    assert!(info.contains("methsweep filter version"));
    assert!(info.contains("meth_percent > 50"));
    Ok(())
}

#[rstest]
fn exact_threshold_is_excluded(store: TempDir) -> anyhow::Result<()> {
    // Cell b's methylation is exactly 60%, so a strict threshold at 60
    // retains nothing and the target is never created.
    let out = TempDir::new()?;
    let target = out.path().join("filtered");
    let err = filter_data_dir(
        store.path(),
        &target,
        &FilterPredicate::MinMeth(60.0),
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MethsweepError>(),
        Some(MethsweepError::EmptyResult(_))
    ));
    assert!(!target.exists());
    Ok(())
}

#[rstest]
fn min_sites_drops_shallow_cells(store: TempDir) -> anyhow::Result<()> {
    let out = TempDir::new()?;
    let target = out.path().join("deep");
    filter_data_dir(store.path(), &target, &FilterPredicate::MinSites(5))?;
    assert_eq!(
        StoreReader::open(&target)?.cell_names(),
        ["a".to_string()]
    );
    Ok(())
}

#[rstest]
fn name_lists_select_cells(store: TempDir) -> anyhow::Result<()> {
    let out = TempDir::new()?;

    let keep = out.path().join("keep");
    let names = HashSet::from(["a".to_string()]);
    filter_data_dir(store.path(), &keep, &FilterPredicate::Keep(names))?;
    assert_eq!(StoreReader::open(&keep)?.cell_names(), ["a".to_string()]);

    let discard = out.path().join("discard");
    let names = HashSet::from(["a".to_string()]);
    filter_data_dir(store.path(), &discard, &FilterPredicate::Discard(names))?;
    assert_eq!(StoreReader::open(&discard)?.cell_names(), ["b".to_string()]);
    Ok(())
}

#[rstest]
fn unknown_keep_name_fails_without_writing(
    store: TempDir
) -> anyhow::Result<()> {
    let out = TempDir::new()?;
    let target = out.path().join("filtered");
    let names = HashSet::from(["z".to_string()]);
    let err =
        filter_data_dir(store.path(), &target, &FilterPredicate::Keep(names))
            .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MethsweepError>(),
        Some(MethsweepError::UnknownCell(name)) if name == "z"
    ));
    assert!(!target.exists());
    Ok(())
}

#[rstest]
fn in_place_rewrite_replaces_the_source(store: TempDir) -> anyhow::Result<()> {
    // Smoothed tracks are pooled over all cells, so the rewrite must
    // not carry them along.
    let smoother = Smoother::new(2.0, KernelType::Triangular)?;
    smooth_data_dir(store.path(), &smoother)?;
    assert!(store.path().join("smoothed").exists());

    let summary = filter_data_dir(
        store.path(),
        store.path(),
        &FilterPredicate::MinSites(1),
    )?;
    assert_eq!(summary.retained, 2);

    let reader = StoreReader::open(store.path())?;
    assert_eq!(
        reader.cell_names(),
        ["a".to_string(), "b".to_string()]
    );
    assert!(!store.path().join("smoothed").exists());

    let stats = reader.cell_stats()?;
    assert_eq!(stats[0].total_sites(), 6);
    assert_eq!(stats[1].total_sites(), 5);

    let info = reader.run_info()?.to_string();
    assert!(info.contains("methsweep filter version"));
    Ok(())
}

#[rstest]
fn rewrite_leaves_no_displaced_directory_behind() -> anyhow::Result<()> {
    // The swap stages the new store and moves the old one aside; after
    // a successful run only the final store may remain.
    let root = TempDir::new()?;
    let dir = root.path().join("store");
    write_tiny_store(&dir)?;

    filter_data_dir(&dir, &dir, &FilterPredicate::MinSites(1))?;
    let entries = std::fs::read_dir(root.path())?
        .map(|entry| Ok(entry?.file_name()))
        .collect::<anyhow::Result<Vec<_>>>()?;
    assert_eq!(entries, vec![std::ffi::OsString::from("store")]);

    let reader = StoreReader::open(&dir)?;
    assert_eq!(reader.cell_names().len(), 2);
    assert_eq!(reader.chromosomes()?.len(), 2);
    Ok(())
}

#[rstest]
fn repeated_filtering_is_stable(store: TempDir) -> anyhow::Result<()> {
    let out = TempDir::new()?;
    let once = out.path().join("once");
    filter_data_dir(store.path(), &once, &FilterPredicate::MinMeth(50.0))?;
    let twice = out.path().join("twice");
    filter_data_dir(&once, &twice, &FilterPredicate::MinMeth(50.0))?;

    let first = StoreReader::open(&once)?;
    let second = StoreReader::open(&twice)?;
    assert_eq!(first.cell_names(), second.cell_names());
    assert_eq!(first.cell_stats()?, second.cell_stats()?);

    let mut chroms = second.chromosomes()?;
    chroms.sort();
    assert_eq!(chroms, ["1".to_string(), "2".to_string()]);
    for chrom in ["1", "2"] {
        let lhs = first.read_chrom(chrom)?;
        let rhs = second.read_chrom(chrom)?;
        assert_eq!(lhs.cell(0), rhs.cell(0));
    }
    Ok(())
}
