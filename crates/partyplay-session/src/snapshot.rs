//! Read-only view of a session for the presentation layer.

use partyplay_timer::TimerKind;
use partyplay_types::{AutoplayFlags, Notice, VideoId};
use serde::{Deserialize, Serialize};

use crate::AutoplayConfig;

/// Everything a host needs to render the display for the current video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoplaySnapshot {
    pub video: VideoId,
    /// Bumped every time a new session replaces the old one.
    pub generation: u64,
    pub autoplay: bool,
    pub flags: AutoplayFlags,
    /// The player has reported ready at least once for this video.
    pub ready: bool,
    pub playing: bool,
    pub pending_timer: Option<TimerKind>,
    pub notice: Option<Notice>,
}

impl AutoplaySnapshot {
    /// Show the "Play" control.
    pub fn shows_manual_play(&self) -> bool {
        self.flags.manual_play_required && !self.playing
    }

    /// Replace the player with the "open on the provider" prompt.
    pub fn shows_redirect_prompt(&self) -> bool {
        self.flags.embed_blocked
    }
}

/// Picks the status line for the current flags.
///
/// Embed errors take over the whole display, so their notices win. A
/// pending retry outranks the manual prompt.
pub(crate) fn notice_for(
    config: &AutoplayConfig,
    flags: &AutoplayFlags,
    playing: bool,
) -> Option<Notice> {
    if flags.embed_blocked {
        return match (config.autoplay, flags.window_focused) {
            (true, true) if !flags.auto_redirected => Some(Notice::AutoRedirecting {
                delay_ms: config.auto_redirect_delay_ms,
            }),
            (true, false) => Some(Notice::AutoRedirectPaused),
            _ => None,
        };
    }
    if flags.delayed_autoplay_visible {
        return Some(Notice::AutoplayDelayed {
            delay_ms: config.fallback_delay_ms,
        });
    }
    if flags.manual_play_required && !playing {
        return Some(Notice::AutoplayBlocked);
    }
    None
}
