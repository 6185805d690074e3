use std::fs;
use std::path::Path;
use std::process::{
    Command,
    Output,
};

use methsweep::prelude::*;
use rstest::{
    fixture,
    rstest,
};
use tempfile::TempDir;

/// Two-cell store matching the library test fixture: cell `a` sits at
/// exactly 50% methylation, cell `b` at 60%.
fn write_store(dir: &Path) -> anyhow::Result<()> {
    let cell_names = vec!["a".to_string(), "b".to_string()];
    let mut stats = [CellStats::new("a"), CellStats::new("b")];

    let mut chr1 = ChromCalls::new("1", 2);
    fill(&mut chr1, &mut stats[0], 0, &[(42, 0, 1), (50, 1, 1), (52, 0, 1)])?;
    fill(&mut chr1, &mut stats[1], 1, &[(42, 1, 1), (52, 0, 1)])?;
    let mut chr2 = ChromCalls::new("2", 2);
    for cell in 0..2 {
        fill(&mut chr2, &mut stats[cell], cell, &[
            (1000, 0, 1),
            (1234, 1, 1),
            (1235, 1, 1),
        ])?;
    }

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
    stats: &mut CellStats,
    cell: usize,
    calls: &[(PosType, CountType, CountType)],
) -> anyhow::Result<()> {
    for &(position, n_meth, n_total) in calls {
        let call = MethylationCall::new(position, n_meth, n_total)?;
        stats.observe(&call);
        chrom.push(cell, call);
    }
    Ok(())
}

#[fixture]
fn store() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_store(dir.path()).unwrap();
    dir
}

fn methsweep(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_methsweep"))
        .args(args)
        .output()
        .expect("running the methsweep binary")
}

fn column_header(dir: &Path) -> String {
    fs::read_to_string(dir.join("column_header.txt")).unwrap()
}

#[rstest]
fn min_meth_keeps_only_the_more_methylated_cell(store: TempDir) {
    let out = TempDir::new().unwrap();
    let target = out.path().join("filtered");

    let output = methsweep(&[
        "filter",
        "--min-meth",
        "50",
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Cell a sits exactly on the strict threshold and is dropped.
    assert_eq!(column_header(&target), "b\n");
    let stats = fs::read_to_string(target.join("cell_stats.csv")).unwrap();
    assert!(stats.lines().nth(1).unwrap().starts_with("b,"));

    let info = fs::read_to_string(target.join("run_info.txt")).unwrap();
    assert!(info.contains("methsweep prepare version"));
    assert!(info.contains("methsweep filter version"));
}

#[rstest]
fn empty_result_exits_one_without_writing(store: TempDir) {
    let out = TempDir::new().unwrap();
    let target = out.path().join("filtered");

    let output = methsweep(&[
        "filter",
        "--min-meth",
        "100",
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!target.exists());
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty result"));
}

#[rstest]
fn keep_list_tolerates_blank_lines(store: TempDir) {
    let out = TempDir::new().unwrap();
    let names = out.path().join("names.txt");
    fs::write(&names, "a\n\n\n").unwrap();
    let target = out.path().join("filtered");

    let output = methsweep(&[
        "filter",
        "--cell-names",
        names.to_str().unwrap(),
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(column_header(&target), "a\n");
}

#[rstest]
fn discard_list_tolerates_duplicates_and_blanks(store: TempDir) {
    let out = TempDir::new().unwrap();
    let names = out.path().join("names.txt");
    fs::write(&names, "a\n\na\na\n").unwrap();
    let target = out.path().join("filtered");

    let output = methsweep(&[
        "filter",
        "--cell-names",
        names.to_str().unwrap(),
        "--discard",
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(column_header(&target), "b\n");
}

#[rstest]
fn conflicting_predicates_are_rejected(store: TempDir) {
    let out = TempDir::new().unwrap();
    let target = out.path().join("filtered");

    let output = methsweep(&[
        "filter",
        "--min-meth",
        "50",
        "--min-sites",
        "5",
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("exactly one filter predicate"));
}

#[rstest]
fn progress_flag_is_scoped_to_prepare(store: TempDir) {
    let out = TempDir::new().unwrap();
    let target = out.path().join("filtered");

    // Only prepare has a per-item parse loop worth a progress bar; the
    // flag is a usage error elsewhere.
    let output = methsweep(&[
        "filter",
        "--progress",
        "--min-sites",
        "1",
        store.path().to_str().unwrap(),
        target.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!target.exists());
}
