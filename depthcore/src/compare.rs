//! Tolerance checks of a candidate coverage estimate against ground truth.
//!
//! Two policies with different failure semantics:
//! - [`validate_regions`] recomputes every region through an oracle and stops
//!   at the first region out of tolerance.
//! - [`compare_paired`] scores two whole-genome bin tables and always reports
//!   the full summary.

use log::debug;
use serde::Serialize;
use std::fmt::Display;

use crate::{
    scale::{median, scale_by_median},
    DepthError, DepthNormalization, Region, RegionDepthOracle, RegionRecord, Result,
};

/// Largest accepted |expected - recomputed| in region mode.
pub const REGION_TOLERANCE: f64 = 0.5;

/// Scaled differences above this count as out of tolerance in paired mode.
pub const PAIRED_TOLERANCE: f64 = 0.5;

/// Scaled differences below this count as tight agreement in paired mode.
pub const TIGHT_TOLERANCE: f64 = 0.25;

const DROPOUT_CANDIDATE_MAX: f64 = 0.05;
const DROPOUT_TRUTH_MIN: f64 = 20.0;

/// The first region whose recomputed depth disagrees with its estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ToleranceFailure {
    /// Position of the region in the candidate file.
    pub index: usize,
    pub region: Region,
    pub expected: f64,
    pub recomputed: f64,
    /// How the ground truth was recomputed, e.g. the exact command line.
    pub descriptor: String,
}

impl ToleranceFailure {
    pub fn difference(&self) -> f64 {
        (self.expected - self.recomputed).abs()
    }
}

impl Display for ToleranceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ERROR\n{:?} {:?}\n{}",
            self.recomputed, self.expected, self.descriptor
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegionVerdict {
    Pass { checked: usize },
    Fail(ToleranceFailure),
}

impl RegionVerdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, RegionVerdict::Pass { .. })
    }
}

/// Recompute each region's depth with `oracle` and compare it to the
/// candidate value, in file order.
///
/// Returns at the first region where the two differ by more than
/// [`REGION_TOLERANCE`]; later regions are never queried. Oracle failures
/// propagate immediately.
pub fn validate_regions<'a, I, O>(
    records: I,
    oracle: &mut O,
    mode: DepthNormalization,
) -> Result<RegionVerdict>
where
    I: IntoIterator<Item = &'a RegionRecord>,
    O: RegionDepthOracle + ?Sized,
{
    let mut checked = 0;

    for (index, record) in records.into_iter().enumerate() {
        let region = record.region();
        let recomputed = oracle.query_mean_depth(&region, mode)?;
        checked += 1;

        debug!(
            "{}: expected {:.2}, recomputed {:.2} ({})",
            region, record.value, recomputed, mode
        );

        if (record.value - recomputed).abs() > REGION_TOLERANCE {
            let descriptor = oracle.describe(&region, mode);
            return Ok(RegionVerdict::Fail(ToleranceFailure {
                index,
                region,
                expected: record.value,
                recomputed,
                descriptor,
            }));
        }
    }

    Ok(RegionVerdict::Pass { checked })
}

/// Agreement between two median-scaled depth tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedSummary {
    /// Bins with |scaled difference| > [`PAIRED_TOLERANCE`].
    pub out_of_tolerance: usize,
    /// Bins compared after truncating to the shorter table.
    pub total: usize,
    pub percent_out_of_tolerance: f64,
    /// Share of bins with |scaled difference| < [`TIGHT_TOLERANCE`].
    pub fraction_within_tight: f64,
    pub truth_median: f64,
    pub candidate_median: f64,
    /// Bins where the candidate is near zero while the truth is deeply covered.
    pub dropouts: Vec<usize>,
}

impl Display for PairedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "out: {} total: {} {:.2}\nwithin {}: {:.4}",
            self.out_of_tolerance,
            self.total,
            self.percent_out_of_tolerance,
            TIGHT_TOLERANCE,
            self.fraction_within_tight
        )
    }
}

/// Score `candidate` against `truth` bin by bin.
///
/// Both tables are truncated to the shorter length and must share their start
/// column from then on, otherwise [`DepthError::Alignment`] is returned. Each
/// value column is divided by its own median before differencing, so the
/// result does not depend on either sample's absolute depth.
pub fn compare_paired(truth: &[RegionRecord], candidate: &[RegionRecord]) -> Result<PairedSummary> {
    let n = truth.len().min(candidate.len());
    let (truth, candidate) = (&truth[..n], &candidate[..n]);

    for (index, (t, c)) in truth.iter().zip(candidate).enumerate() {
        if t.start != c.start {
            return Err(DepthError::Alignment {
                index,
                truth_start: t.start,
                candidate_start: c.start,
            });
        }
    }

    let truth_values: Vec<f64> = truth.iter().map(|r| r.value).collect();
    let candidate_values: Vec<f64> = candidate.iter().map(|r| r.value).collect();

    let (Some(truth_median), Some(candidate_median)) =
        (median(&truth_values), median(&candidate_values))
    else {
        return Ok(PairedSummary {
            out_of_tolerance: 0,
            total: 0,
            percent_out_of_tolerance: 0.0,
            fraction_within_tight: 0.0,
            truth_median: 0.0,
            candidate_median: 0.0,
            dropouts: Vec::new(),
        });
    };

    let truth_scaled = scale_by_median(&truth_values, truth_median);
    let candidate_scaled = scale_by_median(&candidate_values, candidate_median);

    let mut out_of_tolerance = 0;
    let mut within_tight = 0;
    for (c, t) in candidate_scaled.iter().zip(&truth_scaled) {
        let diff = (c - t).abs();
        if diff > PAIRED_TOLERANCE {
            out_of_tolerance += 1;
        }
        if diff < TIGHT_TOLERANCE {
            within_tight += 1;
        }
    }

    let dropouts = (0..n)
        .filter(|&i| {
            candidate_values[i] < DROPOUT_CANDIDATE_MAX && truth_values[i] > DROPOUT_TRUTH_MIN
        })
        .collect();

    Ok(PairedSummary {
        out_of_tolerance,
        total: n,
        percent_out_of_tolerance: 100.0 * out_of_tolerance as f64 / n as f64,
        fraction_within_tight: within_tight as f64 / n as f64,
        truth_median,
        candidate_median,
        dropouts,
    })
}
