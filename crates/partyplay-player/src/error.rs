/// Errors reported by a playback capability.
///
/// These never reach the host: the orchestrator contains them and turns
/// them into flags. They exist so implementations can say *why* a start
/// failed and so the failure shows up usefully in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The platform refused to start playback without a user gesture.
    #[error("playback blocked by platform: {0}")]
    Blocked(String),

    /// The player has not finished initializing.
    #[error("player not ready")]
    NotReady,

    /// The player was torn down while a start was in flight.
    #[error("player closed")]
    Closed,

    /// Any other failure reported by the provider.
    #[error("playback failed: {0}")]
    Failed(String),
}
