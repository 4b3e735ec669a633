use csv::{ReaderBuilder, StringRecord};
use std::{fmt::Display, io::Read};

use crate::{DepthError, Region, Result};

/// How a region's per-base depths are reduced to one mean.
///
/// The two modes use different denominators and are kept apart on purpose:
/// - `Windowed`: every position of the region counts, missing ones as zero,
///   so the sum is divided by the region length (`fillZero = true`).
/// - `Sparse`: only the positions the counting tool reported count, so the
///   sum is divided by the number of reported rows (`fillZero = false`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthNormalization {
    #[default]
    Windowed,
    Sparse,
}

impl DepthNormalization {
    pub fn from_fill_zero(fill_zero: bool) -> Self {
        if fill_zero {
            DepthNormalization::Windowed
        } else {
            DepthNormalization::Sparse
        }
    }

    pub fn fill_zero(self) -> bool {
        matches!(self, DepthNormalization::Windowed)
    }
}

impl Display for DepthNormalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let txt = match self {
            DepthNormalization::Windowed => "windowed",
            DepthNormalization::Sparse => "sparse",
        };
        write!(f, "{}", txt)
    }
}

/// Ground-truth source for the mean depth of a region.
///
/// Production code shells out to a per-base depth counter; tests plug in a
/// canned implementation.
pub trait RegionDepthOracle {
    /// Recompute the mean depth over `region` under `mode`.
    fn query_mean_depth(&mut self, region: &Region, mode: DepthNormalization) -> Result<f64>;

    /// Human-readable description of the query, printed when a region fails.
    fn describe(&self, region: &Region, _mode: DepthNormalization) -> String {
        region.to_string()
    }
}

/// Reduce `chrom  pos  depth [depth...]` rows into one mean for `region`.
///
/// Only the first depth column is summed. No rows means a mean of zero in
/// both modes.
pub fn reduce_depth_output<R: Read>(
    output: R,
    region: &Region,
    mode: DepthNormalization,
) -> Result<f64> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(output);
    let mut record = StringRecord::new();

    let mut total = 0.0;
    let mut rows: u64 = 0;
    while rdr.read_record(&mut record)? {
        rows += 1;
        let depth_str = record.get(2).ok_or_else(|| DepthError::OracleOutput {
            region: region.to_string(),
            message: format!("expected 3 columns at row {}, found {}", rows, record.len()),
        })?;
        let depth: f64 = depth_str
            .trim()
            .parse()
            .map_err(|_| DepthError::OracleOutput {
                region: region.to_string(),
                message: format!("invalid depth '{}' at row {}", depth_str, rows),
            })?;
        total += depth;
    }

    if rows == 0 {
        return Ok(0.0);
    }

    let mean = match mode {
        DepthNormalization::Windowed if region.is_empty() => 0.0,
        DepthNormalization::Windowed => total / region.len() as f64,
        DepthNormalization::Sparse => total / rows as f64,
    };
    Ok(mean)
}
