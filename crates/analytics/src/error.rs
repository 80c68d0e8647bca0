use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to write the analytics log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize the analytics log: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace the analytics log file: {0}")]
    Persist(#[from] tempfile::PersistError),
}
