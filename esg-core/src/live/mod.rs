// esg-core/src/live/mod.rs

pub mod scheduler;
pub mod session;

pub use scheduler::{SchedulerConfig, SchedulerControl, SchedulerHandle, SchedulerState, TickBudget, TickScheduler};
pub use session::{SessionHandle, SessionId, SessionRegistry, SessionReport};
