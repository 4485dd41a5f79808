//! `AutoplayBuilder`: configures and spawns an orchestrator.

use std::time::Duration;

use partyplay_orchestrator::{AutoplayHandle, spawn_orchestrator};
use partyplay_player::{FocusSignal, Host, Playback};
use partyplay_session::AutoplayConfig;
use partyplay_types::VideoId;
use url::Url;

use crate::PartyplayError;

/// Command queue length used unless [`AutoplayBuilder::channel_size`] says
/// otherwise.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates a new builder with default settings.
pub fn builder() -> AutoplayBuilder {
    AutoplayBuilder::new()
}

/// Builder for configuring and spawning an autoplay orchestrator.
///
/// # Example
///
/// ```rust,ignore
/// use partyplay::prelude::*;
///
/// let handle: AutoplayHandle<MyPlayer> = partyplay::builder()
///     .autoplay(true)
///     .fallback_delay(Duration::from_secs(3))
///     .focus(window_focus.clone())
///     .spawn("dQw4w9WgXcQ", my_host)?;
/// ```
#[derive(Debug, Clone)]
pub struct AutoplayBuilder {
    config: AutoplayConfig,
    focus: Option<FocusSignal>,
    channel_size: usize,
}

impl AutoplayBuilder {
    pub fn new() -> Self {
        Self {
            config: AutoplayConfig::default(),
            focus: None,
            channel_size: DEFAULT_CHANNEL_SIZE,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: AutoplayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn autoplay(mut self, enabled: bool) -> Self {
        self.config.autoplay = enabled;
        self
    }

    pub fn fallback_delay(mut self, delay: Duration) -> Self {
        self.config.fallback_delay_ms = millis(delay);
        self
    }

    pub fn auto_redirect_delay(mut self, delay: Duration) -> Self {
        self.config.auto_redirect_delay_ms = millis(delay);
        self
    }

    /// The provider watch page used for redirects.
    pub fn watch_url(mut self, url: Url) -> Self {
        self.config.watch_url = url;
        self
    }

    /// Fragment appended to redirect URLs; `None` appends nothing.
    pub fn redirect_fragment(mut self, fragment: Option<&str>) -> Self {
        self.config.redirect_fragment = fragment.map(str::to_string);
        self
    }

    pub fn open_fullscreen(mut self, fullscreen: bool) -> Self {
        self.config.open_fullscreen = fullscreen;
        self
    }

    /// The window focus signal. Without one the orchestrator gets a private
    /// signal that always reports focused.
    pub fn focus(mut self, focus: FocusSignal) -> Self {
        self.focus = Some(focus);
        self
    }

    /// Sets the command channel capacity (minimum 1).
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size.max(1);
        self
    }

    /// The configuration the orchestrator will receive.
    pub fn current_config(&self) -> &AutoplayConfig {
        &self.config
    }

    /// Spawns the orchestrator for `video`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<P: Playback, H: Host>(
        self,
        video: &str,
        host: H,
    ) -> Result<AutoplayHandle<P>, PartyplayError> {
        let video = VideoId::parse(video)?;
        Ok(self.spawn_for(video, host))
    }

    /// Like [`Self::spawn`], for an already parsed id.
    pub fn spawn_for<P: Playback, H: Host>(self, video: VideoId, host: H) -> AutoplayHandle<P> {
        let focus = self.focus.unwrap_or_default();
        tracing::debug!(
            %video,
            autoplay = self.config.autoplay,
            channel_size = self.channel_size,
            "spawning autoplay orchestrator"
        );
        spawn_orchestrator(video, self.config, focus, host, self.channel_size)
    }
}

impl Default for AutoplayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Saturates; the config clamps it later anyway.
fn millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}
