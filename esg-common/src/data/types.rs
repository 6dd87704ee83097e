use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

// =================================================================
// Error Types
// =================================================================

/// Fatal dataset errors. Anything raised here halts startup.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open dataset '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("No parseable year columns in '{0}'")]
    NoYearColumns(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

// =================================================================
// Table Rows
// =================================================================

/// One entity/metric row of the wide table.
///
/// `cells` is aligned with the dataset's year columns and keeps the raw
/// text; numeric parsing happens in the reshaper so bad cells can be skipped
/// instead of failing the load.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub entity: String,
    pub entity_code: String,
    pub metric: String,
    pub metric_code: String,
    pub cells: Vec<String>,
}

impl RawRow {
    pub fn matches_entity(&self, key: &str) -> bool {
        self.entity == key || self.entity_code == key
    }

    pub fn matches_metric(&self, key: &str) -> bool {
        self.metric == key || self.metric_code == key
    }
}

/// Long-form record: one (entity, metric, year, value) observation.
///
/// Field names on the wire follow the column labels of the source table so
/// exported files line up with the CSV the dashboard was fed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Country Name")]
    pub entity: String,
    #[serde(rename = "Indicator Name")]
    pub metric: String,
    #[serde(rename = "Indicator Code")]
    pub metric_code: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Value")]
    pub value: f64,
}

// =================================================================
// Selection
// =================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MetricMode {
    /// Entity only; every metric row of the entity is kept.
    #[default]
    Legacy,
    /// Entity and a single indicator.
    PerMetric,
}

/// The user's current choice of entity and (optionally) metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub entity: String,
    pub metric: Option<String>,
}

impl Selection {
    pub fn legacy(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            metric: None,
        }
    }

    pub fn per_metric(entity: impl Into<String>, metric: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            metric: Some(metric.into()),
        }
    }

    pub fn mode(&self) -> MetricMode {
        match self.metric {
            Some(_) => MetricMode::PerMetric,
            None => MetricMode::Legacy,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.metric {
            Some(metric) => write!(f, "{} / {}", self.entity, metric),
            None => write!(f, "{} / *", self.entity),
        }
    }
}
