use serde::Serialize;
use std::fmt::Display;

/// A 0-based, half-open genomic interval.
///
/// `Display` renders the 1-based inclusive form used by `samtools -r`,
/// e.g. `chr1:1-16384` for `chr1 0 16384`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(chrom: &str, start: u64, end: u64) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end,
        }
    }

    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start + 1, self.end)
    }
}

/// One `chrom start end value` row of a bed-like coverage file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub value: f64,
}

impl RegionRecord {
    pub fn new(chrom: &str, start: u64, end: u64, value: f64) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end,
            value,
        }
    }

    pub fn region(&self) -> Region {
        Region::new(&self.chrom, self.start, self.end)
    }
}

impl Display for RegionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.value
        )
    }
}
