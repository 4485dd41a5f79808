//! Capability abstractions for Partyplay.
//!
//! The autoplay core never talks to the embedded player, the window, or the
//! host application directly. It consumes three narrow capabilities:
//!
//! - [`Playback`]: start playback, query the current state
//! - [`FocusSignal`]: foreground/background notifications for the window
//! - [`Host`]: advance to the next item, open the provider's own page
//!
//! # Feature Flags
//!
//! - `scripted`: [`ScriptedPlayback`] and [`RecordingHost`], in-memory
//!   implementations for tests and demos

mod error;
mod focus;
#[cfg(feature = "scripted")]
mod scripted;

pub use error::PlaybackError;
pub use focus::{FocusChange, FocusSignal, FocusSubscription};
#[cfg(feature = "scripted")]
pub use scripted::{HostCall, RecordingHost, ScriptedPlayback, ScriptedStart};

use futures_util::future::BoxFuture;
use partyplay_types::{PlayerState, VideoId};
use url::Url;

/// A start whose outcome arrives later.
///
/// Resolves to `Ok(())` once playback actually begins, or to the reason
/// the platform refused.
pub type PendingStart = BoxFuture<'static, Result<(), PlaybackError>>;

/// What a successful call to [`Playback::start`] handed back.
pub enum StartOutcome {
    /// The player accepted the request and gave nothing to wait on.
    Started,
    /// The player accepted the request; the real outcome arrives later.
    Deferred(PendingStart),
}

impl std::fmt::Debug for StartOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "Started"),
            Self::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// The embedded player, as far as autoplay is concerned.
pub trait Playback: Send + 'static {
    /// Asks the player to start playing.
    ///
    /// `Err` is a synchronous failure (the request could not even be
    /// issued). `Ok(StartOutcome::Deferred(_))` may still reject later.
    fn start(&mut self) -> Result<StartOutcome, PlaybackError>;

    /// The player's current state.
    fn state(&self) -> PlayerState;
}

/// The application hosting the display.
pub trait Host: Send + Sync + 'static {
    /// The current item is finished (or skippable); move on.
    fn advance(&self, video: &VideoId);

    /// Opens the provider's own page in a new browsing context.
    fn open_external(&self, target: &RedirectTarget);
}

/// Where to send the user when the provider refuses to embed a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    /// The video being redirected.
    pub video: VideoId,
    /// The provider's watch page for that video.
    pub url: Url,
    /// Ask the new context to open fullscreen.
    pub fullscreen: bool,
}

impl RedirectTarget {
    /// Builds `watch_url?v=<id>#<fragment>`.
    ///
    /// Any query already on `watch_url` is kept; `v` is appended.
    pub fn for_video(
        watch_url: &Url,
        video: &VideoId,
        fragment: Option<&str>,
        fullscreen: bool,
    ) -> Self {
        let mut url = watch_url.clone();
        url.query_pairs_mut().append_pair("v", video.as_str());
        url.set_fragment(fragment.filter(|f| !f.is_empty()));
        Self {
            video: video.clone(),
            url,
            fullscreen,
        }
    }
}
