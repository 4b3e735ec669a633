/// Median of `values`; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };
    Some(median)
}

/// Divide every value by `median`, putting two depth series on the same scale
/// regardless of how deeply each sample was sequenced.
///
/// A zero median produces non-finite values, as plain float division does.
pub fn scale_by_median(values: &[f64], median: f64) -> Vec<f64> {
    values.iter().map(|v| v / median).collect()
}
