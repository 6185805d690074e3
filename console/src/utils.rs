use std::fs::File;
use std::io::{
    stdin,
    stdout,
    Read,
    Write,
};
use std::path::{
    Path,
    PathBuf,
};

use anyhow::Context;
use clap::Args;
use glob::glob;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct UtilsArgs {
    #[arg(
        long,
        default_value_t = 0,
        help_heading = "GLOBAL ARGS",
        help = "Number of threads to use (0 defaults to all available cores)."
    )]
    pub threads: usize,

    #[arg(
        long,
        default_value_t = false,
        help_heading = "GLOBAL ARGS",
        help = "Verbose output."
    )]
    pub verbose: bool,
}

impl UtilsArgs {
    pub fn setup(&self) -> anyhow::Result<()> {
        if self.threads != 0 {
            std::env::set_var(
                "METHSWEEP_NUM_THREADS",
                self.threads.to_string(),
            );
        }
        let level = if self.verbose {
            log::LevelFilter::Debug
        }
        else {
            log::LevelFilter::Info
        };
        pretty_env_logger::formatted_builder()
            .filter_level(level)
            .parse_default_env()
            .try_init()?;
        Ok(())
    }
}

pub fn init_pbar(total: usize) -> anyhow::Result<ProgressBar> {
    let progress_bar = ProgressBar::new(total as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}, ETA: {eta}] [{bar:40.cyan/blue}] {pos:>5.green}/{len:5} {msg}")?
            .progress_chars("#>-"),
    );
    progress_bar.set_message("Processing...");
    Ok(progress_bar)
}

pub(crate) fn expand_wildcards(paths: Vec<String>) -> Vec<PathBuf> {
    let mut expanded_paths = Vec::new();

    for path in paths {
        if path.contains('*') || path.contains('?') {
            // Expand wildcard using glob
            match glob(&path) {
                Ok(matches) => {
                    for entry in matches.filter_map(Result::ok) {
                        expanded_paths.push(entry);
                    }
                },
                Err(e) => {
                    eprintln!("Error processing wildcard '{}': {}", path, e)
                },
            }
        }
        else {
            // If not a wildcard, push the path as-is
            expanded_paths.push(PathBuf::from(path));
        }
    }

    expanded_paths
}

/// `-` selects standard input.
pub(crate) fn input_reader(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path == Path::new("-") {
        return Ok(Box::new(stdin().lock()));
    }
    let file = File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    Ok(Box::new(file))
}

/// `-` selects standard output.
pub(crate) fn output_writer(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(stdout().lock()));
    }
    let file = File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    Ok(Box::new(file))
}
