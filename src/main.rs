use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::debug;
use std::process::ExitCode;

mod argparser;
mod bin_depth;
mod compare_bins;
mod data_load;
mod depth_stream;
mod oracle;
mod validate_regions;

use argparser::{Args, Commands};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();
    debug!("{:?}", args);

    match args.command {
        Commands::Bin(bin_args) => {
            bin_depth::bin_depth(bin_args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate(validate_args) => validate_regions::validate_regions(validate_args),
        Commands::Compare(compare_args) => {
            compare_bins::compare_bins(compare_args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
