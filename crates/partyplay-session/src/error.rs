//! Failure taxonomy for autoplay.

use partyplay_player::PlaybackError;
use partyplay_types::VideoId;

/// Everything that can go wrong while trying to play a video.
///
/// None of these reach the host. Each is logged where it happens and
/// surfaced only through the session's flags:
///
/// | Fault | Surfaced as |
/// |---|---|
/// | `PlaybackStartRejected` | `manual_play_required` |
/// | `PlaybackStartThrew` | `delayed_autoplay_visible`, one retry |
/// | `EmbedRestricted` | `embed_blocked`, redirect |
/// | `ManualStartFailed` | nothing; the manual prompt stays |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutoplayFault {
    /// The platform refused an unattended start.
    #[error("autoplay rejected: {0}")]
    PlaybackStartRejected(#[source] PlaybackError),

    /// The start request failed synchronously.
    #[error("playback start threw: {0}")]
    PlaybackStartThrew(#[source] PlaybackError),

    /// The provider refuses to embed this video.
    #[error("embedding refused for video {0}")]
    EmbedRestricted(VideoId),

    /// A start backed by a user gesture still failed.
    #[error("manual start failed: {0}")]
    ManualStartFailed(#[source] PlaybackError),
}
