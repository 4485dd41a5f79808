//! Core types shared by the player, session, and orchestrator layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TypesError;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The provider's identifier for a video (e.g. `dQw4w9WgXcQ`).
///
/// Opaque to the autoplay logic: it is only compared for equality (a session
/// is invalid once the current identity differs) and spliced into the
/// provider's watch URL when redirecting.
///
/// `#[serde(try_from = "String")]` runs the same validation as
/// [`VideoId::parse`] when a document is deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Validates and wraps a provider identifier.
    ///
    /// # Errors
    /// Returns [`TypesError::InvalidVideoId`] for empty strings or strings
    /// containing anything other than `A-Z a-z 0-9 - _`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let raw = raw.into();
        let valid = !raw.is_empty()
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if valid {
            Ok(Self(raw))
        } else {
            Err(TypesError::InvalidVideoId(raw))
        }
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VideoId {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// What the embedded player reports when asked for its current state.
///
/// The provider encodes these as integers; [`PlayerState::from_code`] and
/// [`PlayerState::code`] convert between the two.
///
/// ```text
/// -1 Unstarted   0 Ended   1 Playing   2 Paused   3 Buffering   5 Cued
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    #[default]
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    /// Converts a provider state code.
    ///
    /// # Errors
    /// Returns [`TypesError::UnknownPlayerState`] for codes outside the
    /// documented set (note that 4 is unused by the provider).
    pub fn from_code(code: i32) -> Result<Self, TypesError> {
        match code {
            -1 => Ok(Self::Unstarted),
            0 => Ok(Self::Ended),
            1 => Ok(Self::Playing),
            2 => Ok(Self::Paused),
            3 => Ok(Self::Buffering),
            5 => Ok(Self::Cued),
            other => Err(TypesError::UnknownPlayerState(other)),
        }
    }

    /// The provider's integer code for this state.
    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }

    /// Only `Playing` counts as "already playing" when the player is ready.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "Unstarted"),
            Self::Ended => write!(f, "Ended"),
            Self::Playing => write!(f, "Playing"),
            Self::Paused => write!(f, "Paused"),
            Self::Buffering => write!(f, "Buffering"),
            Self::Cued => write!(f, "Cued"),
        }
    }
}

// ---------------------------------------------------------------------------
// Flags exposed to the presentation layer
// ---------------------------------------------------------------------------

/// The read-only flags a host renders from.
///
/// - `manual_play_required`: show a "Play" control; the platform refused an
///   unattended start.
/// - `embed_blocked`: the provider refused to embed; show the redirect
///   prompt instead of the player.
/// - `delayed_autoplay_visible`: a fallback retry is scheduled.
/// - `auto_redirected`: the user was already sent to the provider once for
///   this video.
/// - `window_focused`: last known foreground state of the host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoplayFlags {
    pub manual_play_required: bool,
    pub embed_blocked: bool,
    pub delayed_autoplay_visible: bool,
    pub auto_redirected: bool,
    pub window_focused: bool,
}

// ---------------------------------------------------------------------------
// Notice
// ---------------------------------------------------------------------------

/// A one-line status message the host can show next to the player.
///
/// `Display` renders the user-facing text. Delays are carried in
/// milliseconds and rendered as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Embed refused; the redirect timer is running.
    AutoRedirecting { delay_ms: u64 },
    /// Embed refused while the window is in the background.
    AutoRedirectPaused,
    /// A synchronous start failure is being retried after a delay.
    AutoplayDelayed { delay_ms: u64 },
    /// The platform blocked autoplay; a user gesture is needed.
    AutoplayBlocked,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutoRedirecting { delay_ms } => {
                write!(f, "Auto-redirecting in {} seconds...", Seconds(*delay_ms))
            }
            Self::AutoRedirectPaused => {
                write!(f, "Auto-redirect paused - return to app to continue")
            }
            Self::AutoplayDelayed { delay_ms } => {
                write!(f, "Autoplaying in {} seconds...", Seconds(*delay_ms))
            }
            Self::AutoplayBlocked => write!(f, "Autoplay blocked by browser"),
        }
    }
}

/// Milliseconds rendered as whole seconds when exact, else one decimal.
struct Seconds(u64);

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            write!(f, "{}", self.0 / 1000)
        } else {
            write!(f, "{:.1}", self.0 as f64 / 1000.0)
        }
    }
}
