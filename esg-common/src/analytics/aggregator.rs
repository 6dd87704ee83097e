// esg-common/src/analytics/aggregator.rs
// Scalar KPIs and year-ordered series over one tick's records

use serde::{Deserialize, Serialize};

use super::variation::VariedRecord;

pub const DEFAULT_ROLLING_WINDOW: usize = 5;
pub const DEFAULT_LATEST_YEAR: i32 = 2022;

/// One point of a derived series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<T> {
    pub year: i32,
    pub value: T,
}

/// Mean of the base values. Absent for an empty set.
pub fn average(records: &[VariedRecord]) -> Option<f64> {
    if records.is_empty() {
        return None;
    }
    let sum: f64 = records.iter().map(|r| r.record.value).sum();
    Some(sum / records.len() as f64)
}

/// Sum of the depletion values. Zero for an empty set.
pub fn total(records: &[VariedRecord]) -> f64 {
    records.iter().map(|r| r.depletion).sum()
}

/// Base value of the first record for `year`, if any.
pub fn latest_year_value(records: &[VariedRecord], year: i32) -> Option<f64> {
    records
        .iter()
        .find(|r| r.record.year == year)
        .map(|r| r.record.value)
}

/// (year, base value) pairs sorted by year. The sort is stable, so records
/// sharing a year keep their reshape order.
pub fn by_year(records: &[VariedRecord]) -> Vec<(i32, f64)> {
    let mut pairs: Vec<(i32, f64)> = records.iter().map(|r| (r.record.year, r.record.value)).collect();
    pairs.sort_by_key(|(year, _)| *year);
    pairs
}

/// Trailing mean over `window` values; the first `window - 1` slots are
/// absent. A zero window yields no means at all.
pub fn rolling_mean_values(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window == 0 || i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().sum();
            Some(sum / window as f64)
        })
        .collect()
}

pub fn cumulative_sum_values(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

pub fn rolling_mean(records: &[VariedRecord], window: usize) -> Vec<SeriesPoint<Option<f64>>> {
    let pairs = by_year(records);
    let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    pairs
        .iter()
        .zip(rolling_mean_values(&values, window))
        .map(|((year, _), value)| SeriesPoint { year: *year, value })
        .collect()
}

pub fn cumulative_sum(records: &[VariedRecord]) -> Vec<SeriesPoint<f64>> {
    let pairs = by_year(records);
    let values: Vec<f64> = pairs.iter().map(|(_, v)| *v).collect();
    pairs
        .iter()
        .zip(cumulative_sum_values(&values))
        .map(|((year, _), value)| SeriesPoint { year: *year, value })
        .collect()
}
