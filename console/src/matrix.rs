use std::path::PathBuf;

use clap::Args;
use console::style;
use methsweep::io::bed::read_intervals;
use methsweep::prelude::*;
use methsweep::tools::matrix::DEFAULT_PSEUDOCOUNT;

use crate::utils::{
    input_reader,
    UtilsArgs,
};

#[derive(Args, Debug, Clone)]
pub(crate) struct MatrixArgs {
    #[arg(
        value_parser,
        required = true,
        help = "BED file of regions to aggregate ('-' reads from standard \
                input)."
    )]
    regions: PathBuf,

    #[arg(value_parser, required = true, help = "Prepared data directory.")]
    data_dir: PathBuf,

    #[arg(
        value_parser,
        required = true,
        help = "Output directory for the matrix files."
    )]
    output: PathBuf,

    #[arg(
        long,
        default_value_t = false,
        help = "Write one sparse triplet matrix instead of the dense tables."
    )]
    sparse: bool,

    #[arg(
        long,
        default_value_t = false,
        help = "Reject overlapping regions instead of counting shared sites \
                into every region covering them."
    )]
    disjoint: bool,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_PSEUDOCOUNT,
        help = "Virtual reads damping shrunken residuals toward zero at low \
                coverage."
    )]
    pseudocount: f64,
}

impl MatrixArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let store = StoreReader::open(&self.data_dir)?;
        let intervals = read_intervals(input_reader(&self.regions)?)?;

        let policy = if self.disjoint {
            OverlapPolicy::Disjoint
        }
        else {
            OverlapPolicy::Allow
        };
        let config = MatrixConfig::default()
            .with_pseudocount(self.pseudocount)
            .with_overlap_policy(policy);

        let matrix = RegionMatrixSet::build(&store, &intervals, &config)?;
        if self.sparse {
            matrix.write_sparse(&self.output)?;
        }
        else {
            matrix.write_dense(&self.output)?;
        }

        println!(
            "{}",
            style(format!(
                "Aggregated {} cells over {} regions in {}.",
                matrix.n_cells(),
                matrix.n_intervals(),
                self.output.display()
            ))
            .green()
            .bold()
        );
        Ok(())
    }
}
