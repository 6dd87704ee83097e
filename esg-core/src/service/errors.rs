use config::ConfigError;
use esg_common::data::LoadError;
use thiserror::Error;

/// Service layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No selection for {0} panel: dataset has no entities")]
    NoSelection(String),

    #[error("Task error: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Task(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_aborted_session_task_is_task_error() {
        let task = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        });
        task.abort();
        let err = ServiceError::from(task.await.unwrap_err());
        assert!(matches!(err, ServiceError::Task(ref msg) if msg.contains("cancelled")));
    }
}
