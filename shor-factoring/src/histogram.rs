//! Filtering of raw measurement histograms.

use std::collections::HashMap;

/// Observed bit patterns mapped to their counts over one sampling call.
pub type Histogram = HashMap<String, u64>;

/// True when a measured pattern has no set bit.
fn is_zero_pattern(pattern: &str) -> bool {
    pattern.chars().all(|c| c == '0')
}

/// Keep the informative entries of a measurement histogram.
///
/// All-zero patterns are dropped outright (phase 0 carries no period
/// information). Among the rest, an entry survives when it ties the maximum
/// count or strictly exceeds `threshold`, so the most-probable pattern is
/// kept even when every count sits below the nominal threshold, and
/// near-ties above the threshold come along with it.
///
/// The returned order is unspecified beyond containing the maximum. An
/// empty vector means there was no usable signal at all; the caller treats
/// that as "order not found".
pub fn filter_histogram(counts: &Histogram, threshold: u64) -> Vec<(String, u64)> {
    let max_count = counts
        .iter()
        .filter(|(pattern, &count)| count > 0 && !is_zero_pattern(pattern))
        .map(|(_, &count)| count)
        .max();
    let max_count = match max_count {
        Some(max) => max,
        None => return Vec::new(),
    };

    counts
        .iter()
        .filter(|(pattern, &count)| {
            count > 0 && !is_zero_pattern(pattern) && (count >= max_count || count > threshold)
        })
        .map(|(pattern, &count)| (pattern.clone(), count))
        .collect()
}
