use clap::{Parser, Subcommand};

use crate::{bin_depth::BinArgs, compare_bins::CompareArgs, validate_regions::ValidateArgs};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        global = true,
        help = "Log debug messages. RUST_LOG takes precedence."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate a per-base depth stream into fixed-width bins.
    Bin(BinArgs),

    /// Recompute each region's depth with samtools and stop at the first mismatch.
    Validate(ValidateArgs),

    /// Compare two whole-genome bin tables after median scaling. Takes the
    /// samtools-derived truth first, then the candidate.
    Compare(CompareArgs),
}
