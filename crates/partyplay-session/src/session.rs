//! The autoplay session: one mutable record per displayed video.
//!
//! Every handler runs to completion and leaves the session consistent.
//! Later callbacks (timer fires, deferred start outcomes) read the fields as
//! they are when the callback runs, never a copy captured when it was
//! scheduled; the focus check at redirect time depends on that.
//!
//! ```text
//!            ┌──────── start() Err ───────▶ delayed ──(fallback fires)──▶ retry once
//! ready ─────┼──────── start() Deferred ──▶ rejected? ──▶ manual play required
//!            └──────── start() Started ───▶ (nothing)
//!
//! error ─────▶ embed blocked ──(focused, not redirected)──▶ redirect timer
//!                                                            └─(still focused)─▶ redirect
//! ```

use partyplay_player::{PendingStart, Playback, PlaybackError, StartOutcome};
use partyplay_timer::{TimerKind, TimerMetrics, TimerSlot};
use partyplay_types::{AutoplayFlags, VideoId};
use tracing::{debug, info, trace, warn};

use crate::snapshot::notice_for;
use crate::{
    AutoplayConfig, AutoplayFault, AutoplaySnapshot, Effect, PendingAttempt, Settlement,
    StartPurpose,
};

/// Autoplay state for one video.
///
/// Generic over the player so tests can drive it with a scripted one.
pub struct AutoplaySession<P: Playback> {
    video: VideoId,
    /// Distinguishes this session from earlier ones, including earlier
    /// sessions for the same video.
    generation: u64,
    config: AutoplayConfig,

    manual_play_required: bool,
    delayed_autoplay_visible: bool,
    /// Monotonic within the session.
    embed_blocked: bool,
    auto_redirected: bool,
    window_focused: bool,
    /// Set on focus return; consumed by the next `player_ready`.
    resume_on_ready: bool,

    ready: bool,
    playing: bool,

    player: Option<P>,
    timer: TimerSlot,
}

impl<P: Playback> AutoplaySession<P> {
    /// Creates the session for a newly current video.
    pub fn new(
        video: VideoId,
        generation: u64,
        config: AutoplayConfig,
        window_focused: bool,
    ) -> Self {
        debug!(
            %video,
            generation,
            autoplay = config.autoplay,
            window_focused,
            "autoplay session created"
        );
        Self {
            video,
            generation,
            config,
            manual_play_required: false,
            delayed_autoplay_visible: false,
            embed_blocked: false,
            auto_redirected: false,
            window_focused,
            resume_on_ready: false,
            ready: false,
            playing: false,
            player: None,
            timer: TimerSlot::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Player lifecycle
    // -----------------------------------------------------------------------

    /// The embedded player finished initializing.
    pub fn player_ready(&mut self, player: P, already_playing: bool) -> Vec<Effect> {
        self.auto_redirected = false;
        self.ready = true;
        self.playing = already_playing;
        self.player = Some(player);

        if !self.config.autoplay || already_playing || self.timer.is_armed() {
            debug!(
                video = %self.video,
                autoplay = self.config.autoplay,
                already_playing,
                pending_timer = ?self.timer.pending(),
                "player ready, no autoplay attempt"
            );
            return Vec::new();
        }

        if self.resume_on_ready {
            self.resume_on_ready = false;
            debug!(video = %self.video, "player ready after focus return, resuming");
            return match self.try_start() {
                Some(Ok(StartOutcome::Deferred(pending))) => {
                    vec![self.await_start(StartPurpose::Resume, pending)]
                }
                Some(Err(error)) => {
                    debug!(video = %self.video, %error, "resume start failed, not retrying");
                    Vec::new()
                }
                Some(Ok(StartOutcome::Started)) | None => Vec::new(),
            };
        }

        match self.try_start() {
            Some(Ok(StartOutcome::Started)) | None => Vec::new(),
            Some(Ok(StartOutcome::Deferred(pending))) => {
                vec![self.await_start(StartPurpose::Autoplay, pending)]
            }
            Some(Err(error)) => {
                info!(
                    video = %self.video,
                    error = %AutoplayFault::PlaybackStartThrew(error),
                    delay_ms = self.config.fallback_delay_ms,
                    "autoplay failed, retrying after delay"
                );
                self.delayed_autoplay_visible = true;
                self.arm_timer(TimerKind::Fallback);
                Vec::new()
            }
        }
    }

    /// Playback began, whoever started it.
    pub fn player_play(&mut self) {
        self.playing = true;
        self.cancel_timer();
        self.delayed_autoplay_visible = false;
    }

    pub fn player_pause(&mut self) {
        self.playing = false;
    }

    /// The video played to the end.
    pub fn player_ended(&mut self) -> Vec<Effect> {
        self.playing = false;
        vec![Effect::Advance]
    }

    /// The player reported an unrecoverable embed error.
    pub fn player_error(&mut self) {
        if !self.embed_blocked {
            info!(
                error = %AutoplayFault::EmbedRestricted(self.video.clone()),
                "video cannot be embedded"
            );
        }
        self.embed_blocked = true;

        if !(self.config.autoplay && self.window_focused && !self.auto_redirected) {
            return;
        }
        if self.timer.pending() == Some(TimerKind::AutoRedirect) {
            trace!(video = %self.video, "auto-redirect already pending");
            return;
        }
        self.arm_timer(TimerKind::AutoRedirect);
    }

    // -----------------------------------------------------------------------
    // Window focus
    // -----------------------------------------------------------------------

    pub fn focus_gained(&mut self) -> Vec<Effect> {
        let was_blurred = !self.window_focused;
        self.window_focused = true;
        if !was_blurred {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.embed_blocked {
            // They watched it on the provider's page.
            info!(video = %self.video, "returned from provider, advancing");
            effects.push(Effect::Advance);
        }
        if self.config.autoplay {
            self.cancel_timer();
            // Only a player that is not ready yet benefits: an already-ready,
            // paused player is not restarted until its next ready event.
            self.resume_on_ready = true;
        }
        effects
    }

    pub fn focus_lost(&mut self) {
        self.window_focused = false;
    }

    // -----------------------------------------------------------------------
    // Timers and deferred outcomes
    // -----------------------------------------------------------------------

    /// Waits for the pending timer. Pends forever if none is armed.
    ///
    /// Cancel-safe; pass the result to [`Self::timer_fired`].
    pub async fn next_timer(&mut self) -> TimerKind {
        self.timer.wait_fire().await
    }

    pub fn timer_fired(&mut self, kind: TimerKind) -> Vec<Effect> {
        match kind {
            TimerKind::Fallback => {
                self.delayed_autoplay_visible = false;
                match self.try_start() {
                    Some(Ok(StartOutcome::Deferred(pending))) => {
                        vec![self.await_start(StartPurpose::Fallback, pending)]
                    }
                    Some(Err(error)) => {
                        debug!(video = %self.video, %error, "fallback autoplay failed");
                        Vec::new()
                    }
                    Some(Ok(StartOutcome::Started)) | None => Vec::new(),
                }
            }
            TimerKind::AutoRedirect => {
                if !self.window_focused {
                    debug!(video = %self.video, "window unfocused, auto-redirect skipped");
                    return Vec::new();
                }
                self.auto_redirected = true;
                info!(video = %self.video, "auto-redirecting to provider");
                // Not finished yet: advancing happens when they come back.
                vec![Effect::Redirect(self.config.redirect_target(&self.video))]
            }
        }
    }

    /// Applies the outcome of a deferred start.
    ///
    /// Outcomes issued by an earlier session are ignored.
    pub fn settle(&mut self, settlement: Settlement) {
        let Settlement {
            generation,
            purpose,
            result,
        } = settlement;

        if generation != self.generation {
            trace!(
                video = %self.video,
                stale = generation,
                current = self.generation,
                %purpose,
                "ignoring start outcome from a previous session"
            );
            return;
        }

        match (purpose, result) {
            (StartPurpose::Manual, Ok(())) => {
                self.manual_play_required = false;
            }
            (_, Ok(())) => {
                trace!(video = %self.video, %purpose, "deferred start succeeded");
            }
            (StartPurpose::Autoplay, Err(error)) => {
                info!(
                    video = %self.video,
                    error = %AutoplayFault::PlaybackStartRejected(error),
                    "manual play required"
                );
                self.manual_play_required = true;
            }
            (StartPurpose::Manual, Err(error)) => {
                warn!(
                    video = %self.video,
                    error = %AutoplayFault::ManualStartFailed(error),
                    "manual play failed"
                );
            }
            (StartPurpose::Resume | StartPurpose::Fallback, Err(error)) => {
                debug!(video = %self.video, %purpose, %error, "deferred start failed");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Host actions
    // -----------------------------------------------------------------------

    /// Starts playback from a user gesture.
    pub fn request_manual_play(&mut self) -> Vec<Effect> {
        match self.try_start() {
            None => {
                warn!(video = %self.video, "manual play requested before the player was ready");
                Vec::new()
            }
            Some(Ok(StartOutcome::Started)) => {
                self.manual_play_required = false;
                Vec::new()
            }
            Some(Ok(StartOutcome::Deferred(pending))) => {
                vec![self.await_start(StartPurpose::Manual, pending)]
            }
            Some(Err(error)) => {
                warn!(
                    video = %self.video,
                    error = %AutoplayFault::ManualStartFailed(error),
                    "manual play failed"
                );
                Vec::new()
            }
        }
    }

    /// Opens the provider's page, optionally marking the item finished.
    pub fn request_redirect(&mut self, mark_finished: bool) -> Vec<Effect> {
        let mut effects = vec![Effect::Redirect(self.config.redirect_target(&self.video))];
        if mark_finished {
            effects.push(Effect::Advance);
        }
        effects
    }

    /// Cancels the pending timer, if any. Idempotent.
    pub fn cancel_fallback_timer(&mut self) {
        self.cancel_timer();
        self.delayed_autoplay_visible = false;
    }

    /// Hides the manual-play prompt without starting playback.
    pub fn dismiss_manual_play(&mut self) {
        self.manual_play_required = false;
    }

    pub fn skip(&mut self) -> Vec<Effect> {
        vec![Effect::Advance]
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn video(&self) -> &VideoId {
        &self.video
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &AutoplayConfig {
        &self.config
    }

    pub fn flags(&self) -> AutoplayFlags {
        AutoplayFlags {
            manual_play_required: self.manual_play_required,
            embed_blocked: self.embed_blocked,
            delayed_autoplay_visible: self.delayed_autoplay_visible,
            auto_redirected: self.auto_redirected,
            window_focused: self.window_focused,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the next ready event will resume playback.
    pub fn resume_on_ready(&self) -> bool {
        self.resume_on_ready
    }

    pub fn pending_timer(&self) -> Option<TimerKind> {
        self.timer.pending()
    }

    pub fn timer_metrics(&self) -> &TimerMetrics {
        self.timer.metrics()
    }

    pub fn snapshot(&self) -> AutoplaySnapshot {
        let flags = self.flags();
        AutoplaySnapshot {
            video: self.video.clone(),
            generation: self.generation,
            autoplay: self.config.autoplay,
            notice: notice_for(&self.config, &flags, self.playing),
            flags,
            ready: self.ready,
            playing: self.playing,
            pending_timer: self.timer.pending(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// `None` when no player has reported ready yet.
    fn try_start(&mut self) -> Option<Result<StartOutcome, PlaybackError>> {
        self.player.as_mut().map(|player| player.start())
    }

    fn await_start(&self, purpose: StartPurpose, pending: PendingStart) -> Effect {
        Effect::AwaitStart(PendingAttempt::new(self.generation, purpose, pending))
    }

    /// The only way a timer is armed. Replaces whatever was pending.
    fn arm_timer(&mut self, kind: TimerKind) {
        let delay = match kind {
            TimerKind::Fallback => self.config.fallback_delay(),
            TimerKind::AutoRedirect => self.config.auto_redirect_delay(),
        };
        self.timer.arm(kind, delay);
        if kind != TimerKind::Fallback {
            self.delayed_autoplay_visible = false;
        }
    }

    /// The delayed notice never outlives its fallback timer.
    fn cancel_timer(&mut self) {
        if self.timer.cancel() == Some(TimerKind::Fallback) {
            self.delayed_autoplay_visible = false;
        }
    }
}

impl<P: Playback> Drop for AutoplaySession<P> {
    fn drop(&mut self) {
        debug!(
            video = %self.video,
            generation = self.generation,
            pending_timer = ?self.timer.pending(),
            "autoplay session destroyed"
        );
    }
}
