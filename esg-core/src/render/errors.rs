// render/errors.rs

use thiserror::Error;

/// Error types for publishing a snapshot
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot consumer has gone away")]
    ChannelClosed,
}

impl RenderError {
    /// Whether the session should stop rather than try the next tick.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderError::ChannelClosed)
    }
}
