//! Error types for the reset engine.

/// Top-level error type for the recurring-task reset engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Missing or malformed process configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Task store query or transport failure. Fatal to the run.
    #[error("store error: {0}")]
    Store(String),

    /// A fetched record is missing a required field or has the wrong shape.
    #[error("invalid record {page_id}: field '{field}' missing or malformed")]
    InvalidRecord {
        /// Store-side id of the offending record.
        page_id: String,
        /// Name of the field that could not be extracted.
        field: String,
    },

    /// A reset update was rejected by the store. The task keeps its
    /// Done/overdue state and is retried on the next run.
    #[error("transition failed for {page_id}: {reason}")]
    Transition {
        /// Store-side id of the task whose update failed.
        page_id: String,
        /// Store/transport failure description.
        reason: String,
    },

    /// Notification delivery failure.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EngineError>;
