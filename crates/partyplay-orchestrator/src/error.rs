//! Error types for the orchestrator layer.

/// Errors a host can see when talking to an orchestrator.
///
/// Playback failures never show up here; they surface as session flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrchestratorError {
    /// The orchestrator task has stopped (shut down, or every handle was
    /// dropped and it exited).
    #[error("autoplay orchestrator is unavailable")]
    Unavailable,
}
