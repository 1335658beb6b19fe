//! Error taxonomy for the reconciliation core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// Caller-submitted record fails a pre-condition (bad field values or a
    /// forecast referencing a nonexistent location). Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Unique-constraint collision, e.g. duplicate (name, country).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store-level failures propagate unchanged; no retry at this layer.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
