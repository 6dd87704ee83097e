pub mod aggregator;
pub mod export;
pub mod kpi;
pub mod snapshot;
pub mod variation;

pub use aggregator::{SeriesPoint, DEFAULT_LATEST_YEAR, DEFAULT_ROLLING_WINDOW};
pub use kpi::{KpiDeltas, KpiSet, LatestYear, Trend, NOT_AVAILABLE};
pub use snapshot::{KpiField, Snapshot, SnapshotBuilder, TickFailure};
pub use variation::{Draw, FixedVariation, RngVariation, VariationSource, VariedRecord};
