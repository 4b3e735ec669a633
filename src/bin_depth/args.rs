use clap::Parser;
use depthcore::DEFAULT_BIN_WIDTH;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct BinArgs {
    #[arg(
        short,
        long,
        required = true,
        help = "Chromosome to bin. Reading stops at the first row of any other chromosome."
    )]
    pub chrom: String,

    #[arg(
        short,
        long,
        default_value = "-",
        help = "Per-base depth table (chrom, pos, depth), e.g. from 'samtools depth'. Use '-' for stdin."
    )]
    pub input: PathBuf,

    #[arg(
        short,
        long,
        default_value_t = DEFAULT_BIN_WIDTH,
        help = "Aggregation width. Bin means are the depth sum divided by this width."
    )]
    pub width: u64,

    #[arg(
        long,
        help = "Width of the reported bins. Must divide --width. Defaults to --width."
    )]
    pub report_width: Option<u64>,

    #[arg(
        long,
        conflicts_with = "fai",
        help = "Chromosome length. Output is zero-filled up to it and stops there."
    )]
    pub ceiling: Option<u64>,

    #[arg(long, help = "Fasta index (.fai) to look up the chromosome length in.")]
    pub fai: Option<PathBuf>,
}
