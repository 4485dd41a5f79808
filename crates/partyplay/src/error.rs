//! Unified error type for Partyplay.

use partyplay_orchestrator::OrchestratorError;
use partyplay_types::TypesError;

/// Top-level error that wraps the crate-specific errors a host can see.
///
/// Playback failures are not among them; they surface as snapshot flags.
#[derive(Debug, thiserror::Error)]
pub enum PartyplayError {
    /// A bad video id or player state code.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// The orchestrator has stopped.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// A global tracing subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}
