use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct CompareArgs {
    #[arg(help = "Ground-truth bins (chrom, start, end, depth), e.g. binned samtools depth. Given first.")]
    pub truth: PathBuf,

    #[arg(help = "Candidate bins covering the same positions, e.g. from a coverage index. Given second.")]
    pub candidate: PathBuf,

    #[arg(long, help = "Print the summary as JSON.")]
    pub json: bool,
}
