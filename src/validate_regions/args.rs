use clap::Parser;
use depthcore::DepthNormalization;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[arg(help = "Candidate coverage estimate: chrom, start, end, mean depth per row.")]
    pub candidate: PathBuf,

    #[arg(help = "Alignment (BAM/CRAM) samtools recomputes the depth from.")]
    pub alignment: PathBuf,

    #[arg(
        long,
        help = "Divide by the number of covered positions instead of the region length."
    )]
    pub sparse: bool,

    #[arg(
        short = 'Q',
        long,
        default_value_t = 1,
        help = "Minimum mapping quality passed to samtools depth."
    )]
    pub min_mapq: u8,

    #[arg(short, long, help = "Reference fasta for CRAM input.")]
    pub reference: Option<PathBuf>,

    #[arg(
        long,
        env = "DEPTHQC_SAMTOOLS",
        default_value = "samtools",
        help = "samtools executable."
    )]
    pub samtools: PathBuf,
}

impl ValidateArgs {
    pub fn normalization(&self) -> DepthNormalization {
        DepthNormalization::from_fill_zero(!self.sparse)
    }
}
