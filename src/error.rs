use thiserror::Error;

/// Operational errors raised by the engine's own bookkeeping.
///
/// These are distinct from the faults the engine *records*: a caller reports
/// arbitrary `std::error::Error` values, while `FaultlineError` covers the
/// engine's persistence, configuration, and lookup paths.
#[derive(Error, Debug)]
pub enum FaultlineError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Error record not found: {error_id}")]
    RecordNotFound { error_id: String },

    #[error("Persistence operation '{operation}' failed")]
    Persistence {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Recovery action '{action}' failed: {details}")]
    RecoveryActionFailed { action: String, details: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

pub type FaultlineResult<T> = std::result::Result<T, FaultlineError>;
