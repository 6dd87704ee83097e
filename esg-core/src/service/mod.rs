pub mod errors;
pub mod state;

pub use errors::ServiceError;
pub use state::{AppState, PanelPlan, SelectionOptions};
