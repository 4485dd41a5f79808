//! Autoplay configuration.

use std::time::Duration;

use partyplay_player::RedirectTarget;
use partyplay_types::VideoId;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

/// Delay before retrying a start that failed synchronously.
pub const FALLBACK_DELAY_MS: u64 = 5_000;

/// Delay before redirecting to the provider after an embed error.
pub const AUTO_REDIRECT_DELAY_MS: u64 = 5_000;

const DEFAULT_WATCH_URL: &str = "https://www.youtube.com/watch";
const DEFAULT_REDIRECT_FRAGMENT: &str = "mykaraokeparty";

/// Settings for one orchestrator.
///
/// Every session copies this when it is created, so `autoplay` is fixed for
/// a session's lifetime even if the host builds a new config later.
///
/// `#[serde(default)]` lets a partial document fill in only the fields it
/// cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplayConfig {
    /// Attempt playback without a user gesture.
    pub autoplay: bool,

    /// See [`FALLBACK_DELAY_MS`].
    pub fallback_delay_ms: u64,

    /// See [`AUTO_REDIRECT_DELAY_MS`].
    pub auto_redirect_delay_ms: u64,

    /// The provider's watch page; the video id is appended as `v=<id>`.
    pub watch_url: Url,

    /// Fragment appended to redirect URLs so the provider page can be
    /// recognised as opened by the party display.
    pub redirect_fragment: Option<String>,

    /// Ask the browser to open the provider page fullscreen.
    pub open_fullscreen: bool,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            autoplay: false,
            fallback_delay_ms: FALLBACK_DELAY_MS,
            auto_redirect_delay_ms: AUTO_REDIRECT_DELAY_MS,
            watch_url: Url::parse(DEFAULT_WATCH_URL).expect("default watch URL parses"),
            redirect_fragment: Some(DEFAULT_REDIRECT_FRAGMENT.to_string()),
            open_fullscreen: true,
        }
    }
}

impl AutoplayConfig {
    /// Longest accepted delay for either timer.
    pub const MAX_DELAY_MS: u64 = 60_000;

    /// Default settings with autoplay turned on.
    pub fn enabled() -> Self {
        Self {
            autoplay: true,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Both delays are capped to [`Self::MAX_DELAY_MS`].
    pub fn validated(mut self) -> Self {
        if self.fallback_delay_ms > Self::MAX_DELAY_MS {
            warn!(
                delay_ms = self.fallback_delay_ms,
                max = Self::MAX_DELAY_MS,
                "fallback delay exceeds maximum, clamping"
            );
            self.fallback_delay_ms = Self::MAX_DELAY_MS;
        }
        if self.auto_redirect_delay_ms > Self::MAX_DELAY_MS {
            warn!(
                delay_ms = self.auto_redirect_delay_ms,
                max = Self::MAX_DELAY_MS,
                "auto-redirect delay exceeds maximum, clamping"
            );
            self.auto_redirect_delay_ms = Self::MAX_DELAY_MS;
        }
        self
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn auto_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.auto_redirect_delay_ms)
    }

    /// The provider page for `video`.
    pub fn redirect_target(&self, video: &VideoId) -> RedirectTarget {
        RedirectTarget::for_video(
            &self.watch_url,
            video,
            self.redirect_fragment.as_deref(),
            self.open_fullscreen,
        )
    }
}
