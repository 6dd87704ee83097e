// esg-core/src/live/scheduler.rs
// Cancellable fixed-cadence tick loop: vary -> aggregate -> publish -> wait

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use esg_common::analytics::{SnapshotBuilder, VariationSource, DEFAULT_LATEST_YEAR, DEFAULT_ROLLING_WINDOW};
use esg_common::data::{filter_selection, reshape, Dataset, Record, Selection};

use crate::render::traits::Renderer;

const DEFAULT_TICKS: u64 = 200;
const DEFAULT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickBudget {
    Bounded(u64),
    Unbounded,
}

impl TickBudget {
    /// Whether another tick may run after `ticks` have run.
    pub fn allows(&self, ticks: u64) -> bool {
        match self {
            TickBudget::Bounded(max) => ticks < *max,
            TickBudget::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub budget: TickBudget,
    pub delay: Duration,
    pub rolling_window: usize,
    pub latest_year: i32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            budget: TickBudget::Bounded(DEFAULT_TICKS),
            delay: DEFAULT_DELAY,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            latest_year: DEFAULT_LATEST_YEAR,
        }
    }
}

// =================================================================
// Control channels
// =================================================================

/// Owner side: change the selection or cancel the loop.
pub struct SchedulerHandle {
    selection_tx: watch::Sender<Selection>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SchedulerHandle {
    /// Returns false when the loop has already finished.
    pub fn select(&self, selection: Selection) -> bool {
        self.selection_tx.send(selection).is_ok()
    }

    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Loop side of [`SchedulerHandle`].
///
/// A dropped handle counts as a cancellation: nobody is left to watch.
pub struct SchedulerControl {
    selection_rx: watch::Receiver<Selection>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl SchedulerControl {
    pub fn channel(initial: Selection) -> (SchedulerHandle, SchedulerControl) {
        let (selection_tx, selection_rx) = watch::channel(initial);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        (
            SchedulerHandle {
                selection_tx,
                shutdown_tx,
            },
            SchedulerControl {
                selection_rx,
                shutdown_rx,
            },
        )
    }

    fn cancel_requested(&mut self) -> bool {
        !matches!(self.shutdown_rx.try_recv(), Err(TryRecvError::Empty))
    }

    fn selection_update(&mut self) -> Option<Selection> {
        match self.selection_rx.has_changed() {
            Ok(true) => Some(self.selection_rx.borrow_and_update().clone()),
            _ => None,
        }
    }

    /// Sleep for `delay`; true if cancelled while waiting.
    async fn wait(&mut self, delay: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown_rx.recv() => true,
            _ = tokio::time::sleep(delay) => false,
        }
    }
}

// =================================================================
// Scheduler
// =================================================================

pub struct TickScheduler<V: VariationSource> {
    dataset: Arc<Dataset>,
    config: SchedulerConfig,
    builder: SnapshotBuilder,
    variation: V,
    state: SchedulerState,
    selection: Selection,
    records: Vec<Record>,
    skipped: usize,
    ticks: u64,
}

impl<V: VariationSource> TickScheduler<V> {
    pub fn new(dataset: Arc<Dataset>, config: SchedulerConfig, variation: V, selection: Selection) -> Self {
        let builder = SnapshotBuilder::new(config.rolling_window, config.latest_year);
        let mut scheduler = Self {
            dataset,
            config,
            builder,
            variation,
            state: SchedulerState::Idle,
            selection: selection.clone(),
            records: Vec::new(),
            skipped: 0,
            ticks: 0,
        };
        scheduler.select(selection);
        scheduler
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Long-form records of the active selection.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Cells dropped while reshaping the active selection.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Re-run filter and reshape. Only called between ticks.
    pub fn select(&mut self, selection: Selection) {
        let set = filter_selection(&self.dataset, &selection);
        let reshaped = reshape(&set, self.dataset.year_columns());

        info!(
            "Selection {}: {} rows, {} records, {} cells skipped",
            selection,
            set.len(),
            reshaped.records.len(),
            reshaped.skipped
        );
        if set.is_empty() {
            warn!("Selection {} matches no rows; KPIs will be absent", selection);
        }

        self.selection = selection;
        self.records = reshaped.records;
        self.skipped = reshaped.skipped;
    }

    fn transition(&mut self, next: SchedulerState) {
        info!("Scheduler [{}]: {:?} -> {:?}", self.selection, self.state, next);
        self.state = next;
    }

    /// Drive ticks until the budget is spent or the loop is cancelled.
    /// Returns the terminal state.
    pub async fn run(&mut self, renderer: &mut dyn Renderer, control: &mut SchedulerControl) -> SchedulerState {
        if self.state != SchedulerState::Idle {
            warn!("Scheduler already ran (state {:?})", self.state);
            return self.state;
        }
        self.transition(SchedulerState::Running);

        loop {
            if !self.config.budget.allows(self.ticks) {
                self.transition(SchedulerState::Stopped);
                break;
            }
            if control.cancel_requested() {
                self.transition(SchedulerState::Cancelled);
                break;
            }
            if let Some(selection) = control.selection_update() {
                self.select(selection);
            }

            let tick = self.ticks + 1;
            let snapshot = self
                .builder
                .build(tick, &self.selection, &self.records, &mut self.variation);
            self.ticks = tick;

            match renderer.publish(snapshot).await {
                Ok(()) => debug!("Tick {} published via {}", tick, renderer.name()),
                Err(e) if e.is_terminal() => {
                    warn!("Tick {}: {} closed ({}), stopping", tick, renderer.name(), e);
                    self.transition(SchedulerState::Cancelled);
                    break;
                }
                Err(e) => warn!("Tick {}: publish via {} failed: {}", tick, renderer.name(), e),
            }

            if !self.config.budget.allows(self.ticks) {
                continue;
            }
            if control.wait(self.config.delay).await {
                self.transition(SchedulerState::Cancelled);
                break;
            }
        }

        info!("Scheduler [{}] finished after {} ticks", self.selection, self.ticks);
        self.state
    }
}
