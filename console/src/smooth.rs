use std::path::PathBuf;

use clap::{
    Args,
    ValueEnum,
};
use console::style;
use methsweep::prelude::*;
use methsweep::tools::smooth::DEFAULT_BANDWIDTH;

use crate::utils::UtilsArgs;

#[derive(Args, Debug, Clone)]
pub(crate) struct SmoothArgs {
    #[arg(value_parser, required = true, help = "Prepared data directory.")]
    data_dir: PathBuf,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_BANDWIDTH,
        help = "Kernel bandwidth in basepairs. Sites within this distance of a \
                position contribute to its smoothed value."
    )]
    bandwidth: f64,

    #[clap(
        short,
        long,
        value_enum,
        default_value_t = KernelChoice::Triangular,
        help = "Distance weighting kernel."
    )]
    kernel: KernelChoice,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum KernelChoice {
    Triangular,
    Epanechnikov,
}

impl From<KernelChoice> for KernelType {
    fn from(choice: KernelChoice) -> Self {
        match choice {
            KernelChoice::Triangular => KernelType::Triangular,
            KernelChoice::Epanechnikov => KernelType::Epanechnikov,
        }
    }
}

impl SmoothArgs {
    pub fn run(
        &self,
        _utils: &UtilsArgs,
    ) -> anyhow::Result<()> {
        let smoother = Smoother::new(self.bandwidth, self.kernel.into())?;
        let summary = smooth_data_dir(&self.data_dir, &smoother)?;

        println!(
            "{}",
            style(format!(
                "Smoothed {} sites on {} chromosomes.",
                summary.sites, summary.chromosomes
            ))
            .green()
            .bold()
        );
        Ok(())
    }
}
