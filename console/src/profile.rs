use std::path::PathBuf;

use clap::{
    Args,
    ValueEnum,
};
use console::style;
use methsweep::data_structs::typedef::PosType;
use methsweep::io::bed::{
    read_anchors,
    DEFAULT_STRAND_COLUMN,
};
use methsweep::prelude::*;
use methsweep::tools::profile::DEFAULT_WIDTH;

use crate::utils::{
    input_reader,
    output_writer,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct ProfileArgs {
    #[arg(
        value_parser,
        required = true,
        help = "BED file of anchor regions; the midpoint of each region is \
                the anchor ('-' reads from standard input)."
    )]
    anchors: PathBuf,

    #[arg(value_parser, required = true, help = "Prepared data directory.")]
    data_dir: PathBuf,

    #[arg(
        value_parser,
        required = true,
        help = "Output CSV path ('-' writes to standard output)."
    )]
    output: PathBuf,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_WIDTH,
        help = "Half-width of the window around each anchor in basepairs."
    )]
    width: PosType,

    #[arg(
        long,
        default_value_t = DEFAULT_STRAND_COLUMN,
        help = "1-based BED column holding the strand. Offsets of anchors on \
                the minus strand are mirrored."
    )]
    strand_column: usize,

    #[clap(
        long,
        value_enum,
        default_value_t = CiChoice::AgrestiCoull,
        help = "Binomial confidence interval method."
    )]
    ci_method: CiChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum CiChoice {
    AgrestiCoull,
    Wilson,
}

impl From<CiChoice> for CiMethod {
    fn from(choice: CiChoice) -> Self {
        match choice {
            CiChoice::AgrestiCoull => CiMethod::AgrestiCoull,
            CiChoice::Wilson => CiMethod::Wilson,
        }
    }
}

impl ProfileArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let store = StoreReader::open(&self.data_dir)?;
        let anchors =
            read_anchors(input_reader(&self.anchors)?, self.strand_column)?;

        let config = ProfileConfig::default()
            .with_width(self.width)
            .with_ci_method(self.ci_method.into());
        let table = ProfileTable::build(&store, &anchors, &config)?;
        table.write_csv(output_writer(&self.output)?)?;

        // The table may be going to stdout, so the summary goes to stderr.
        eprintln!(
            "{}",
            style(format!(
                "Profiled {} anchors into {} rows.",
                anchors.len(),
                table.rows().len()
            ))
            .green()
            .bold()
        );
        Ok(())
    }
}
