use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown for an absent KPI.
pub const NOT_AVAILABLE: &str = "N/A";

/// Reference level the average and total tiles are compared against.
pub const DELTA_BASELINE: f64 = 10.0;

/// Latest-year values above this trend up, everything else down.
pub const LATEST_YEAR_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestYear {
    pub year: i32,
    pub value: Option<f64>,
}

/// Scalar KPIs for one tick. `None` is the absent marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    pub average: Option<f64>,
    pub total: Option<f64>,
    pub latest_year: LatestYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn sign(self) -> char {
        match self {
            Trend::Up => '+',
            Trend::Down => '-',
        }
    }

    /// Colour name the rendering side uses for this trend.
    pub fn colour(self) -> &'static str {
        match self {
            Trend::Up => "green",
            Trend::Down => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestYearDelta {
    pub magnitude: f64,
    pub trend: Trend,
}

impl fmt::Display for LatestYearDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.trend.sign(), self.magnitude)
    }
}

/// Tile deltas derived from a [`KpiSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpiDeltas {
    pub average: Option<f64>,
    pub total: Option<i64>,
    pub latest_year: Option<LatestYearDelta>,
}

impl KpiDeltas {
    pub fn from_kpis(kpis: &KpiSet) -> Self {
        Self {
            average: kpis.average.map(|avg| round_to(avg - DELTA_BASELINE, 2)),
            total: kpis.total.and_then(total_delta),
            latest_year: kpis.latest_year.value.map(latest_year_delta),
        }
    }
}

/// `None` when the truncated difference does not fit an `i64`.
fn total_delta(total: f64) -> Option<i64> {
    let delta = total.trunc() - DELTA_BASELINE;
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if delta.is_finite() && delta >= i64::MIN as f64 && delta < i64::MAX as f64 {
        Some(delta as i64)
    } else {
        None
    }
}

fn latest_year_delta(latest: f64) -> LatestYearDelta {
    let trend = if latest > LATEST_YEAR_THRESHOLD {
        Trend::Up
    } else {
        Trend::Down
    };
    LatestYearDelta {
        magnitude: (latest / 100.0).round_ties_even() * 100.0,
        trend,
    }
}

/// Round half to even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Two-decimal text for a tile, or [`NOT_AVAILABLE`].
pub fn display(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kpis(average: Option<f64>, total: Option<f64>, latest: Option<f64>) -> KpiSet {
        KpiSet {
            average,
            total,
            latest_year: LatestYear {
                year: 2022,
                value: latest,
            },
        }
    }

    #[test]
    fn test_deltas() {
        let deltas = KpiDeltas::from_kpis(&kpis(Some(12.346), Some(99.9), Some(1250.0)));
        assert_eq!(deltas.average, Some(2.35));
        assert_eq!(deltas.total, Some(89));
        let latest = deltas.latest_year.unwrap();
        assert_eq!(latest.magnitude, 1200.0);
        assert_eq!(latest.trend, Trend::Up);
        assert_eq!(latest.to_string(), "+1200");
    }

    #[test]
    fn test_latest_year_below_threshold_trends_down() {
        let deltas = KpiDeltas::from_kpis(&kpis(None, Some(0.0), Some(30.0)));
        let latest = deltas.latest_year.unwrap();
        assert_eq!(latest.trend, Trend::Down);
        assert_eq!(latest.trend.colour(), "red");
        assert_eq!(latest.magnitude, 0.0);
    }

    #[test]
    fn test_half_hundreds_round_to_even() {
        assert_eq!(latest_year_delta(250.0).magnitude, 200.0);
        assert_eq!(latest_year_delta(350.0).magnitude, 400.0);
    }

    #[test]
    fn test_total_delta_outside_i64_is_absent() {
        let deltas = KpiDeltas::from_kpis(&kpis(Some(-1.0e19), Some(-1.0e19), None));
        assert_eq!(deltas.total, None);
        assert!(deltas.average.is_some());

        let high = KpiDeltas::from_kpis(&kpis(None, Some(1.0e19), None));
        assert_eq!(high.total, None);

        let large = KpiDeltas::from_kpis(&kpis(None, Some(-1.0e15), None));
        assert_eq!(large.total, Some(-1_000_000_000_000_010));
    }

    #[test]
    fn test_average_delta_rounds_half_to_even() {
        assert_eq!(round_to(0.125, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        let deltas = KpiDeltas::from_kpis(&kpis(Some(10.125), None, None));
        assert_eq!(deltas.average, Some(0.12));
    }

    #[test]
    fn test_absent_kpis_have_absent_deltas() {
        let deltas = KpiDeltas::from_kpis(&kpis(None, None, None));
        assert_eq!(deltas.average, None);
        assert_eq!(deltas.total, None);
        assert_eq!(deltas.latest_year, None);
        assert_eq!(display(None), "N/A");
        assert_eq!(display(Some(1.239)), "1.24");
    }
}
