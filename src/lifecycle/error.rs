//! Lifecycle-specific error types

use super::StartupPhase;
use thiserror::Error;

/// A run listener raised an error while handling a phase
#[derive(Debug, Error)]
#[error("Run listener {listener} failed during {phase}: {source}")]
pub struct ListenerError {
    /// Name of the listener that failed
    pub listener: String,
    /// The phase being broadcast
    pub phase: StartupPhase,
    /// What the listener raised
    #[source]
    pub source: anyhow::Error,
}

impl ListenerError {
    pub fn new(listener: impl Into<String>, phase: StartupPhase, source: anyhow::Error) -> Self {
        Self {
            listener: listener.into(),
            phase,
            source,
        }
    }
}

/// A specialized Result type for broadcasts
pub type Result<T> = std::result::Result<T, ListenerError>;
