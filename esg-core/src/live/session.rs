// esg-core/src/live/session.rs
// One spawned scheduler per viewer/panel, tracked by id

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use esg_common::analytics::VariationSource;
use esg_common::data::{Dataset, Selection};

use super::scheduler::{SchedulerConfig, SchedulerControl, SchedulerHandle, SchedulerState, TickScheduler};
use crate::render::theme::Category;
use crate::render::traits::Renderer;

pub type SessionId = u64;

struct SessionEntry {
    category: Category,
    control: SchedulerHandle,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub id: SessionId,
    pub category: Category,
    pub selection: Selection,
    pub state: SchedulerState,
    pub ticks: u64,
}

pub struct SessionHandle {
    pub id: SessionId,
    pub task: JoinHandle<SessionReport>,
}

/// Live sessions over one shared, read-only dataset. Cloning shares the
/// registry.
#[derive(Clone)]
pub struct SessionRegistry {
    dataset: Arc<Dataset>,
    config: SchedulerConfig,
    sessions: Arc<DashMap<SessionId, SessionEntry>>,
    next_id: Arc<AtomicU64>,
}

impl SessionRegistry {
    pub fn new(dataset: Arc<Dataset>, config: SchedulerConfig) -> Self {
        Self {
            dataset,
            config,
            sessions: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Start a scheduler on its own task. The session deregisters itself
    /// once its loop ends.
    pub fn open<V>(
        &self,
        category: Category,
        selection: Selection,
        mut renderer: Box<dyn Renderer>,
        variation: V,
    ) -> SessionHandle
    where
        V: VariationSource + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (control, mut rx) = SchedulerControl::channel(selection.clone());
        let mut scheduler = TickScheduler::new(self.dataset.clone(), self.config.clone(), variation, selection);

        self.sessions.insert(id, SessionEntry { category, control });
        info!(
            "Session {} opened: {} {:?} [{}] -> {}",
            id,
            category,
            scheduler.selection().mode(),
            scheduler.selection(),
            renderer.name()
        );

        let sessions = self.sessions.clone();
        let task = tokio::spawn(async move {
            let state = scheduler.run(renderer.as_mut(), &mut rx).await;
            sessions.remove(&id);
            info!("Session {} ended {:?} after {} ticks", id, state, scheduler.ticks());
            SessionReport {
                id,
                category,
                selection: scheduler.selection().clone(),
                state,
                ticks: scheduler.ticks(),
            }
        });

        SessionHandle { id, task }
    }

    /// Change one session's selection; others are untouched.
    pub fn select(&self, id: SessionId, selection: Selection) -> bool {
        match self.sessions.get(&id) {
            Some(entry) => {
                debug!("Session {} ({}) selecting {}", id, entry.category, selection);
                entry.control.select(selection)
            }
            None => false,
        }
    }

    pub fn close(&self, id: SessionId) -> bool {
        match self.sessions.get(&id) {
            Some(entry) => {
                entry.control.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every live session. Returns how many were signalled.
    pub fn close_all(&self) -> usize {
        let mut count = 0;
        for entry in self.sessions.iter() {
            entry.control.cancel();
            count += 1;
        }
        info!("Cancelling {} sessions", count);
        count
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self.sessions.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}
