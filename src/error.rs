use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArisanError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Cannot {action} a payment that is {status}")]
    InvalidTransition { action: &'static str, status: String },
    #[error("Group is full ({0} members)")]
    GroupFull(u32),
    #[error("Group is already completed")]
    GroupCompleted,
    #[error("Round {round} still has {unresolved} unpaid payment(s)")]
    RoundNotSettled { round: u32, unresolved: usize },
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, ArisanError>;
