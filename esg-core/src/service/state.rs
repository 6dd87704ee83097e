use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use esg_common::analytics::VariationSource;
use esg_common::data::{Dataset, Selection};

use crate::config::{PanelSettings, Settings};
use crate::live::{SessionHandle, SessionRegistry};
use crate::render::{Category, Renderer};
use crate::service::errors::ServiceError;

/// A panel resolved against the loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelPlan {
    pub category: Category,
    pub selection: Selection,
}

/// Dropdown contents for a viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOptions {
    pub entities: Vec<String>,
    pub metrics: Vec<String>,
}

/// Process-wide state: the immutable table plus the live sessions over it.
pub struct AppState {
    pub settings: Settings,
    pub dataset: Arc<Dataset>,
    pub registry: SessionRegistry,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self, ServiceError> {
        info!("Initializing ESG dashboard state...");

        let dataset = Dataset::load_with_layout(&settings.dataset.path, &settings.column_layout())?;
        info!(
            "Dataset loaded: {} rows, {} year columns",
            dataset.rows().len(),
            dataset.year_columns().len()
        );

        Ok(Self::with_dataset(settings, dataset))
    }

    pub fn with_dataset(settings: Settings, dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);
        let registry = SessionRegistry::new(dataset.clone(), settings.scheduler_config());
        Self {
            settings,
            dataset,
            registry,
        }
    }

    /// Configured panels, or one legacy panel when none are configured.
    /// Panels without an entity start on the first entity in the table.
    pub fn panel_plans(&self) -> Result<Vec<PanelPlan>, ServiceError> {
        let default_entity = self.dataset.entities().first().copied();
        if default_entity.is_none() {
            warn!("Dataset {} has no entities", self.dataset.source());
        }

        let legacy = [PanelSettings {
            category: Category::Legacy,
            entity: None,
            metric: None,
        }];
        let panels = if self.settings.panels.is_empty() {
            &legacy[..]
        } else {
            &self.settings.panels[..]
        };

        panels
            .iter()
            .map(|panel| {
                let selection = panel
                    .selection(default_entity)
                    .ok_or_else(|| ServiceError::NoSelection(panel.category.to_string()))?;
                Ok(PanelPlan {
                    category: panel.category,
                    selection,
                })
            })
            .collect()
    }

    pub fn options(&self, entity: Option<&str>) -> SelectionOptions {
        let metrics = match entity {
            Some(entity) => self.dataset.metrics_for(entity),
            None => self.dataset.metrics(),
        };
        SelectionOptions {
            entities: self.dataset.entities().into_iter().map(String::from).collect(),
            metrics: metrics.into_iter().map(String::from).collect(),
        }
    }

    pub fn open_panel<V>(&self, plan: &PanelPlan, renderer: Box<dyn Renderer>, variation: V) -> SessionHandle
    where
        V: VariationSource + 'static,
    {
        self.registry
            .open(plan.category, plan.selection.clone(), renderer, variation)
    }
}
