mod filter;
mod matrix;
mod prepare;
mod profile;
mod smooth;
pub mod utils;

use clap::{
    Parser,
    Subcommand,
};
use filter::FilterArgs;
use matrix::MatrixArgs;
use prepare::PrepareArgs;
use profile::ProfileArgs;
use smooth::SmoothArgs;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    Prepare {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  PrepareArgs,
    },

    Smooth {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  SmoothArgs,
    },

    Matrix {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  MatrixArgs,
    },

    Profile {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  ProfileArgs,
    },

    Filter {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  FilterArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Prepare { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Smooth { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Matrix { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Profile { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Filter { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}
