use std::path::PathBuf;
use std::process::exit;

use anyhow::{
    anyhow,
    Context,
};
use clap::Args;
use console::style;
use dialoguer::Confirm;
use hashbrown::HashMap;
use indicatif::ProgressBar;
use itertools::Itertools;
use log::{
    debug,
    warn,
};
use methsweep::prelude::*;
use methsweep::utils::THREAD_POOL;
use rayon::prelude::*;

use crate::utils::{
    expand_wildcards,
    init_pbar,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct PrepareArgs {
    #[arg(
        value_parser,
        num_args=1..,
        required = true,
        help = "Paths to per-cell coverage files (tab-separated: chrom, start, \
                end, fraction, count methylated, count unmethylated; may be \
                gzipped). One file per cell."
    )]
    cell_files: Vec<String>,

    #[arg(
        short = 'o',
        long,
        required = true,
        help = "Output data directory."
    )]
    output: PathBuf,

    #[arg(
        short,
        long,
        required = false,
        default_value_t = false,
        help = "Overwrite an existing data directory without confirmation."
    )]
    force: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Display a progress bar while parsing the input files."
    )]
    progress: bool,
}

impl PrepareArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let paths = expand_wildcards(self.cell_files.clone());
        if paths.is_empty() {
            return Err(anyhow!("No input files match the given patterns"));
        }
        for path in paths.iter() {
            if !path.is_file() {
                eprintln!("Path {} is not a file.", style(path.display()).red());
                exit(-1);
            }
        }

        if self.output.exists() && !self.force {
            let prompt = format!(
                "Data directory {} already exists. Overwrite?",
                self.output.display()
            );
            let confirmed = Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .unwrap_or(false);

            if !confirmed {
                println!("{}", style("Process aborted by the user.").red());
                return Err(anyhow!("User aborted the process."));
            }
        }
        if self.output.exists() {
            std::fs::remove_dir_all(&self.output).with_context(|| {
                format!("clearing {}", self.output.display())
            })?;
        }

        let progress_bar = if self.progress {
            init_pbar(paths.len()).expect("Failed to initialize progress bar")
        }
        else {
            ProgressBar::hidden()
        };

        debug!(
            "Parsing {} files over {} threads",
            paths.len(),
            methsweep::utils::n_threads()
        );
        let coverages = THREAD_POOL.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let coverage = CellCoverage::read(path)
                        .with_context(|| format!("reading {}", path.display()));
                    progress_bar.inc(1);
                    coverage
                })
                .collect::<anyhow::Result<Vec<_>>>()
        })?;
        progress_bar.finish_and_clear();

        let n_cells = coverages.len();
        let cell_names = coverages
            .iter()
            .map(|coverage| coverage.cell_name().to_string())
            .collect_vec();

        let mut chroms: HashMap<String, ChromCalls> = HashMap::new();
        let mut stats = Vec::with_capacity(n_cells);
        for (cell_idx, coverage) in coverages.into_iter().enumerate() {
            let (_, track, cell_stats) = coverage.into_parts();
            stats.push(cell_stats);
            for (chrom, calls) in track.into_inner() {
                let entry = chroms
                    .entry_ref(chrom.as_str())
                    .or_insert_with(|| ChromCalls::new(chrom.as_str(), n_cells));
                for call in calls {
                    entry.push(cell_idx, call);
                }
            }
        }
        if chroms.is_empty() {
            warn!("No methylation calls in any input file");
        }

        let writer = StoreWriter::create(&self.output, &cell_names)?;
        let n_chroms = chroms.len();
        for (_, calls) in chroms
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
        {
            writer.write_chrom(&calls)?;
        }

        let run_info = RunInfo::new("prepare", [
            ("input_files".to_string(), n_cells.to_string()),
            (
                "data_dir".to_string(),
                self.output.display().to_string(),
            ),
        ]);
        writer.finish(&stats, &run_info)?;

        println!(
            "{}",
            style(format!(
                "Prepared {} cells over {} chromosomes in {}.",
                n_cells,
                n_chroms,
                self.output.display()
            ))
            .green()
            .bold()
        );
        Ok(())
    }
}
