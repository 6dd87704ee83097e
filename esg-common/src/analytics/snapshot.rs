// esg-common/src/analytics/snapshot.rs
// Whole-tick snapshot assembly: vary -> aggregate -> seal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use super::aggregator::{
    average, cumulative_sum, latest_year_value, rolling_mean, total, SeriesPoint,
    DEFAULT_LATEST_YEAR, DEFAULT_ROLLING_WINDOW,
};
use super::kpi::{KpiDeltas, KpiSet, LatestYear};
use super::variation::{vary, VariationSource, VariedRecord};
use crate::data::types::{Record, Selection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiField {
    Average,
    Total,
    RollingMean,
    CumulativeSum,
}

impl fmt::Display for KpiField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KpiField::Average => "average",
            KpiField::Total => "total",
            KpiField::RollingMean => "rolling mean",
            KpiField::CumulativeSum => "cumulative sum",
        };
        f.write_str(name)
    }
}

/// A fault confined to one tick. The affected field is published absent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickFailure {
    #[error("Non-finite result for {0}")]
    NonFinite(KpiField),

    #[error("Delta for {0} out of range")]
    DeltaOutOfRange(KpiField),
}

/// Everything the rendering side needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub published_at: DateTime<Utc>,
    pub selection: Selection,
    pub records: Vec<VariedRecord>,
    pub kpis: KpiSet,
    pub deltas: KpiDeltas,
    pub rolling_mean: Vec<SeriesPoint<Option<f64>>>,
    /// Absent when the running total overflowed this tick.
    pub cumulative_sum: Option<Vec<SeriesPoint<f64>>>,
    pub failures: Vec<TickFailure>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Builds a [`Snapshot`] in one call; nothing is published half-done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotBuilder {
    pub rolling_window: usize,
    pub latest_year: i32,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            latest_year: DEFAULT_LATEST_YEAR,
        }
    }
}

impl SnapshotBuilder {
    pub fn new(rolling_window: usize, latest_year: i32) -> Self {
        Self {
            rolling_window,
            latest_year,
        }
    }

    pub fn build(
        &self,
        tick: u64,
        selection: &Selection,
        records: &[Record],
        source: &mut dyn VariationSource,
    ) -> Snapshot {
        let varied = vary(records, source);
        let mut failures = Vec::new();

        let kpis = KpiSet {
            average: checked(KpiField::Average, average(&varied), &mut failures),
            total: checked(KpiField::Total, Some(total(&varied)), &mut failures),
            latest_year: LatestYear {
                year: self.latest_year,
                value: latest_year_value(&varied, self.latest_year),
            },
        };

        let mut rolling = rolling_mean(&varied, self.rolling_window);
        if rolling.iter().any(|p| p.value.is_some_and(|v| !v.is_finite())) {
            failures.push(TickFailure::NonFinite(KpiField::RollingMean));
            for point in rolling.iter_mut() {
                point.value = point.value.filter(|v| v.is_finite());
            }
        }

        let cumulative = cumulative_sum(&varied);
        let cumulative = if cumulative.iter().all(|p| p.value.is_finite()) {
            Some(cumulative)
        } else {
            failures.push(TickFailure::NonFinite(KpiField::CumulativeSum));
            None
        };

        let deltas = KpiDeltas::from_kpis(&kpis);
        if kpis.total.is_some() && deltas.total.is_none() {
            failures.push(TickFailure::DeltaOutOfRange(KpiField::Total));
        }

        for failure in &failures {
            warn!("Tick {} ({}): {}", tick, selection, failure);
        }
        debug!("Tick {} built: {} records", tick, varied.len());

        Snapshot {
            tick,
            published_at: Utc::now(),
            selection: selection.clone(),
            deltas,
            kpis,
            records: varied,
            rolling_mean: rolling,
            cumulative_sum: cumulative,
            failures,
        }
    }
}

fn checked(field: KpiField, value: Option<f64>, failures: &mut Vec<TickFailure>) -> Option<f64> {
    match value {
        Some(v) if !v.is_finite() => {
            failures.push(TickFailure::NonFinite(field));
            None
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::variation::{Draw, FixedVariation};

    fn record(year: i32, value: f64) -> Record {
        Record {
            entity: "Wakanda".to_string(),
            metric: "m".to_string(),
            metric_code: "M".to_string(),
            year,
            value,
        }
    }

    #[test]
    fn test_wakanda_snapshot() {
        let records = vec![record(2020, 10.0), record(2022, 30.0)];
        let mut source = FixedVariation::new(vec![
            Draw { offset: 1, multiplier: 2 },
            Draw { offset: 3, multiplier: 4 },
        ]);
        let snap = SnapshotBuilder::default().build(1, &Selection::legacy("Wakanda"), &records, &mut source);

        assert_eq!(snap.tick, 1);
        assert_eq!(snap.kpis.average, Some(20.0));
        assert_eq!(snap.kpis.total, Some(10.0 * 2.0 + 30.0 * 4.0));
        assert_eq!(snap.kpis.latest_year.value, Some(30.0));
        assert_eq!(snap.deltas.average, Some(10.0));
        assert_eq!(snap.rolling_mean.len(), 2);
        assert!(snap.rolling_mean.iter().all(|p| p.value.is_none()));
        let cum = snap.cumulative_sum.unwrap();
        assert_eq!(cum.last().unwrap().value, 40.0);
        assert!(snap.failures.is_empty());
    }

    #[test]
    fn test_missing_latest_year_is_absent() {
        let records = vec![record(2020, 10.0)];
        let builder = SnapshotBuilder::new(5, 2021);
        let snap = builder.build(1, &Selection::legacy("Wakanda"), &records, &mut FixedVariation::constant(0, 1));
        assert_eq!(snap.kpis.latest_year, LatestYear { year: 2021, value: None });
        assert_eq!(snap.deltas.latest_year, None);
        assert!(!snap.is_degraded());
    }

    #[test]
    fn test_empty_selection_snapshot() {
        let snap = SnapshotBuilder::default().build(
            3,
            &Selection::legacy("Atlantis"),
            &[],
            &mut FixedVariation::constant(0, 1),
        );
        assert!(snap.is_empty());
        assert_eq!(snap.kpis.average, None);
        assert_eq!(snap.kpis.total, Some(0.0));
        assert_eq!(snap.kpis.latest_year.value, None);
        assert!(snap.rolling_mean.is_empty());
        assert_eq!(snap.cumulative_sum, Some(Vec::new()));
        assert!(!snap.is_degraded());
    }

    #[test]
    fn test_overflow_degrades_only_affected_fields() {
        let records = vec![record(2021, f64::MAX), record(2022, f64::MAX)];
        let builder = SnapshotBuilder::new(2, 2022);
        let snap = builder.build(9, &Selection::legacy("Wakanda"), &records, &mut FixedVariation::constant(0, 4));

        assert_eq!(snap.kpis.total, None);
        assert_eq!(snap.kpis.average, None);
        assert_eq!(snap.kpis.latest_year.value, Some(f64::MAX));
        assert_eq!(snap.cumulative_sum, None);
        assert!(snap.rolling_mean.iter().all(|p| p.value.is_none()));
        assert!(snap.failures.contains(&TickFailure::NonFinite(KpiField::Total)));
        assert!(snap.failures.contains(&TickFailure::NonFinite(KpiField::Average)));
        assert!(snap.failures.contains(&TickFailure::NonFinite(KpiField::RollingMean)));
        assert!(snap.failures.contains(&TickFailure::NonFinite(KpiField::CumulativeSum)));
        assert_eq!(snap.records.len(), 2);
    }

    #[test]
    fn test_huge_negative_total_keeps_ticking() {
        let records = vec![record(2022, -1.0e19)];
        let snap = SnapshotBuilder::default().build(1, &Selection::legacy("Wakanda"), &records, &mut FixedVariation::constant(0, 1));

        assert_eq!(snap.kpis.total, Some(-1.0e19));
        assert_eq!(snap.deltas.total, None);
        assert_eq!(snap.kpis.latest_year.value, Some(-1.0e19));
        assert_eq!(snap.failures, vec![TickFailure::DeltaOutOfRange(KpiField::Total)]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let records = vec![record(2022, 1.0)];
        let snap = SnapshotBuilder::default().build(1, &Selection::legacy("Wakanda"), &records, &mut FixedVariation::constant(0, 1));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["tick"], 1);
        assert_eq!(json["records"][0]["Country Name"], "Wakanda");
        assert_eq!(json["kpis"]["latest_year"]["value"], 1.0);
    }
}
