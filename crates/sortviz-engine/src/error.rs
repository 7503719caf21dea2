//! Error types for the sorting engine.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running or configuring the engine.
///
/// Out-of-range configuration is never an error: sizes and speeds are
/// clamped into their supported ranges instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Bogo sort gave up after exhausting its shuffle budget
    #[error("run took too long: gave up after {attempts} shuffle attempts")]
    RunTooLong { attempts: u32 },

    /// A recording outgrew its step budget
    #[error("recording exceeded {limit} steps")]
    RecordingTooLong { limit: usize },

    /// Config store error
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Message shown to the user when this error interrupts a run.
    pub fn user_message(&self) -> String {
        match self {
            Error::RunTooLong { .. } => {
                "Bogo sort is taking too long! Try a smaller array size.".to_string()
            }
            Error::RecordingTooLong { .. } => {
                "This run is too long to record. Try a smaller array size.".to_string()
            }
            other => other.to_string(),
        }
    }
}
