use std::fs;
use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use clap::Args;
use console::style;
use hashbrown::HashSet;
use methsweep::prelude::*;

use crate::utils::UtilsArgs;

#[derive(Args, Debug, Clone)]
pub(crate) struct FilterArgs {
    #[arg(value_parser, required = true, help = "Prepared data directory.")]
    data_dir: PathBuf,

    #[arg(
        value_parser,
        required = true,
        help = "Output data directory. May equal the input directory for an \
                in-place rewrite."
    )]
    output: PathBuf,

    #[arg(
        long,
        help_heading = "PREDICATES",
        help = "Keep cells with strictly more observed sites than this."
    )]
    min_sites: Option<u64>,

    #[arg(
        long,
        help_heading = "PREDICATES",
        help = "Keep cells whose global methylation percentage strictly \
                exceeds this."
    )]
    min_meth: Option<f64>,

    #[arg(
        long,
        help_heading = "PREDICATES",
        help = "File with one cell name per line; keep exactly those cells."
    )]
    cell_names: Option<PathBuf>,

    #[arg(
        long,
        requires = "cell_names",
        default_value_t = false,
        help_heading = "PREDICATES",
        help = "Invert the cell name list: discard the named cells instead."
    )]
    discard: bool,
}

/// One cell name per line. Blank lines and repeated names are
/// tolerated, since hand-edited lists tend to carry both.
fn read_cell_names(path: &Path) -> anyhow::Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

impl FilterArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let predicate = match (self.min_sites, self.min_meth, &self.cell_names)
        {
            (Some(threshold), None, None) => {
                FilterPredicate::MinSites(threshold)
            },
            (None, Some(threshold), None) => {
                FilterPredicate::MinMeth(threshold)
            },
            (None, None, Some(path)) => {
                let names = read_cell_names(path)?;
                if self.discard {
                    FilterPredicate::Discard(names)
                }
                else {
                    FilterPredicate::Keep(names)
                }
            },
            _ => return Err(MethsweepError::InvalidPredicate.into()),
        };

        let summary =
            filter_data_dir(&self.data_dir, &self.output, &predicate)?;

        println!(
            "{}",
            style(format!(
                "Retained {} cells, discarded {}.",
                summary.retained, summary.discarded
            ))
            .green()
            .bold()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_lists_skip_blank_lines() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("names.txt");
        fs::write(&path, "a\n\n  \n").unwrap();

        let names = read_cell_names(&path).unwrap();
        assert_eq!(names, HashSet::from(["a".to_string()]));
    }

    #[test]
    fn name_lists_collapse_duplicates_and_trim() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("names.txt");
        fs::write(&path, "a\n b \na\n\nb\n").unwrap();

        let names = read_cell_names(&path).unwrap();
        assert_eq!(names.len(), 2);
        assert!(names.contains("a"));
        assert!(names.contains("b"));
    }

    #[test]
    fn missing_name_list_is_an_error() {
        assert!(read_cell_names(Path::new("/no/such/list")).is_err());
    }
}
