//! Error types for timer operations

use thiserror::Error;

use crate::state::timer::{TimerKey, TimerStatus};

/// Errors surfaced by timer operations and the backing store.
///
/// Every failure leaves stored timer state untouched; no operation
/// performs a partial transition or retries internally.
#[derive(Error, Debug)]
pub enum TimerError {
    /// Rejected request input.
    #[error("invalid duration: {0} minutes (must be a positive number)")]
    InvalidDuration(f64),

    /// No timer stored under the given identity.
    #[error("no timer for server {server}, event {event}")]
    NotFound { server: u32, event: String },

    /// The transition does not apply to the timer's current status.
    #[error("timer is {actual}, expected {expected}")]
    InvalidState {
        expected: TimerStatus,
        actual: TimerStatus,
    },

    /// Persistence layer failure.
    #[error("store failure: {0}")]
    Store(String),
}

impl TimerError {
    /// Build a `NotFound` for the given identity.
    pub fn not_found(key: &TimerKey) -> Self {
        TimerError::NotFound {
            server: key.server,
            event: key.event.clone(),
        }
    }

    /// Stable machine-readable kind for API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            TimerError::InvalidDuration(_) => "validation",
            TimerError::NotFound { .. } => "not_found",
            TimerError::InvalidState { .. } => "invalid_state",
            TimerError::Store(_) => "store_failure",
        }
    }
}

impl From<std::io::Error> for TimerError {
    fn from(e: std::io::Error) -> Self {
        TimerError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for TimerError {
    fn from(e: serde_json::Error) -> Self {
        TimerError::Store(e.to_string())
    }
}
