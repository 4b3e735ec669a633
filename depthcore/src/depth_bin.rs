use serde::Serialize;
use std::fmt::Display;

/// One row of a per-base depth stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRecord {
    pub position: u64,
    pub depth: f64,
}

impl DepthRecord {
    pub fn new(position: u64, depth: f64) -> Self {
        Self { position, depth }
    }
}

/// A fixed-width genomic interval carrying one aggregated mean depth.
///
/// Rendered as `chrom\tstart\tend\tdepth` with the depth at two decimals,
/// which is the format downstream plotting reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub mean_depth: f64,
}

impl Bin {
    pub fn new(chrom: &str, start: u64, end: u64, mean_depth: f64) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end,
            mean_depth,
        }
    }

    pub fn width(&self) -> u64 {
        self.end - self.start
    }
}

impl Display for Bin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{:.2}",
            self.chrom, self.start, self.end, self.mean_depth
        )
    }
}
