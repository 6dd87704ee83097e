// esg-core/src/config.rs
// ESG Dashboard - Configuration Engine
// Defaults -> dashboard.toml -> ESG__* environment

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use esg_common::data::{ColumnLayout, Selection};

use crate::live::scheduler::{SchedulerConfig, TickBudget};
use crate::render::theme::Category;

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetSettings {
    pub path: String,
    pub year_column_offset: usize,
    pub entity_column: String,
    pub entity_code_column: String,
    pub metric_column: String,
    pub metric_code_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SchedulerSettings {
    pub ticks: u64,
    pub unbounded: bool,
    pub delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregationSettings {
    pub rolling_window: usize,
    pub latest_year: i32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderSettings {
    pub table_rows: usize,
}

/// One dashboard panel: a category with its own selection.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PanelSettings {
    pub category: Category,
    pub entity: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub dataset: DatasetSettings,
    pub scheduler: SchedulerSettings,
    pub aggregation: AggregationSettings,
    pub render: RenderSettings,
    #[serde(default)]
    pub panels: Vec<PanelSettings>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(Some("dashboard"))
    }

    /// Build settings from defaults, an optional config file (any format the
    /// `config` crate recognises by extension) and `ESG__` env overrides.
    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("dataset.path", "data/filtered_ESGdataset_complete1.csv")?
            .set_default("dataset.year_column_offset", 4)?
            .set_default("dataset.entity_column", "Country Name")?
            .set_default("dataset.entity_code_column", "Country Code")?
            .set_default("dataset.metric_column", "Indicator Name")?
            .set_default("dataset.metric_code_column", "Indicator Code")?
            .set_default("scheduler.ticks", 200)?
            .set_default("scheduler.unbounded", false)?
            .set_default("scheduler.delay_ms", 1000)?
            .set_default("aggregation.rolling_window", 5)?
            .set_default("aggregation.latest_year", 2022)?
            .set_default("render.table_rows", 10)?;

        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("ESG").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.path.trim().is_empty() {
            return Err(ConfigError::Message("dataset.path must not be empty".to_string()));
        }
        if self.aggregation.rolling_window == 0 {
            return Err(ConfigError::Message(
                "aggregation.rolling_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn column_layout(&self) -> ColumnLayout {
        ColumnLayout {
            entity: self.dataset.entity_column.clone(),
            entity_code: self.dataset.entity_code_column.clone(),
            metric: self.dataset.metric_column.clone(),
            metric_code: self.dataset.metric_code_column.clone(),
            year_offset: self.dataset.year_column_offset,
        }
    }

    pub fn tick_budget(&self) -> TickBudget {
        if self.scheduler.unbounded {
            TickBudget::Unbounded
        } else {
            TickBudget::Bounded(self.scheduler.ticks)
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            budget: self.tick_budget(),
            delay: Duration::from_millis(self.scheduler.delay_ms),
            rolling_window: self.aggregation.rolling_window,
            latest_year: self.aggregation.latest_year,
        }
    }
}

impl PanelSettings {
    /// Resolve against the table's entity list when no entity is configured.
    pub fn selection(&self, default_entity: Option<&str>) -> Option<Selection> {
        let entity = self.entity.as_deref().or(default_entity)?;
        Some(Selection {
            entity: entity.to_string(),
            metric: self.metric.clone(),
        })
    }
}
