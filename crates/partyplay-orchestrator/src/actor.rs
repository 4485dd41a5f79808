//! Orchestrator actor: an isolated Tokio task that owns the live session.
//!
//! The outside world talks to it through an mpsc channel. Focus changes,
//! timer fires and deferred start outcomes are further branches of the same
//! `select!` loop, so exactly one handler runs at a time and each one sees
//! the session as the previous handler left it.

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use partyplay_player::{FocusChange, FocusSignal, FocusSubscription, Host, Playback};
use partyplay_session::{AutoplayConfig, AutoplaySession, AutoplaySnapshot, Effect, Settlement};
use partyplay_types::VideoId;
use tokio::sync::{mpsc, oneshot, watch};

use crate::OrchestratorError;

/// Commands sent to the orchestrator through its channel.
pub(crate) enum OrchestratorCommand<P: Playback> {
    PlayerReady { player: P, already_playing: bool },
    PlayerPlay,
    PlayerPause,
    PlayerEnded,
    PlayerError,
    ChangeVideo { video: VideoId },
    ManualPlay,
    Redirect { mark_finished: bool },
    CancelFallbackTimer,
    DismissManualPlay,
    Skip,
    GetSnapshot { reply: oneshot::Sender<AutoplaySnapshot> },
    Shutdown,
}

/// Handle to a running orchestrator.
///
/// Cheap to clone. When the last handle is dropped the orchestrator stops
/// and its session, including any pending timer, goes with it.
pub struct AutoplayHandle<P: Playback> {
    sender: mpsc::Sender<OrchestratorCommand<P>>,
    snapshots: watch::Receiver<AutoplaySnapshot>,
}

impl<P: Playback> Clone for AutoplayHandle<P> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<P: Playback> AutoplayHandle<P> {
    /// The player finished initializing. Asks it whether it is already
    /// playing.
    pub async fn player_ready(&self, player: P) -> Result<(), OrchestratorError> {
        let already_playing = player.state().is_playing();
        self.player_ready_with(player, already_playing).await
    }

    /// Like [`Self::player_ready`], with the playing state supplied by the
    /// caller.
    pub async fn player_ready_with(
        &self,
        player: P,
        already_playing: bool,
    ) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::PlayerReady {
            player,
            already_playing,
        })
        .await
    }

    pub async fn player_play(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::PlayerPlay).await
    }

    pub async fn player_pause(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::PlayerPause).await
    }

    pub async fn player_ended(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::PlayerEnded).await
    }

    /// The player reported an unrecoverable embed error.
    pub async fn player_error(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::PlayerError).await
    }

    /// Replaces the session with a fresh one for `video`.
    pub async fn change_video(&self, video: VideoId) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::ChangeVideo { video }).await
    }

    /// Starts playback on behalf of a user gesture.
    pub async fn request_manual_play(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::ManualPlay).await
    }

    /// Opens the provider's page; with `mark_finished` the host is also
    /// told to advance.
    pub async fn request_redirect(&self, mark_finished: bool) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::Redirect { mark_finished })
            .await
    }

    pub async fn cancel_fallback_timer(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::CancelFallbackTimer).await
    }

    pub async fn dismiss_manual_play(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::DismissManualPlay).await
    }

    pub async fn skip(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::Skip).await
    }

    /// Requests the current snapshot.
    ///
    /// The reply comes after every command sent before it has been handled.
    pub async fn snapshot(&self) -> Result<AutoplaySnapshot, OrchestratorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(OrchestratorCommand::GetSnapshot { reply: reply_tx })
            .await?;
        reply_rx.await.map_err(|_| OrchestratorError::Unavailable)
    }

    /// A receiver that sees a new snapshot whenever one changes.
    pub fn subscribe(&self) -> watch::Receiver<AutoplaySnapshot> {
        self.snapshots.clone()
    }

    /// Tells the orchestrator to stop.
    pub async fn shutdown(&self) -> Result<(), OrchestratorError> {
        self.send(OrchestratorCommand::Shutdown).await
    }

    /// Resolves once the orchestrator has stopped.
    pub async fn stopped(&self) {
        self.sender.closed().await
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send(&self, cmd: OrchestratorCommand<P>) -> Result<(), OrchestratorError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| OrchestratorError::Unavailable)
    }
}

/// The session currently on display, with its own focus subscription.
///
/// Replacing this drops the old session's timer and unsubscribes it from
/// focus in one step.
struct LiveSession<P: Playback> {
    session: AutoplaySession<P>,
    focus: FocusSubscription,
}

/// The internal orchestrator state. Runs inside a Tokio task.
struct OrchestratorActor<P: Playback, H: Host> {
    config: AutoplayConfig,
    host: H,
    focus: FocusSignal,
    /// Generation of the live session.
    generation: u64,
    live: LiveSession<P>,
    /// Deferred starts from this and earlier sessions.
    pending: FuturesUnordered<BoxFuture<'static, Settlement>>,
    receiver: mpsc::Receiver<OrchestratorCommand<P>>,
    snapshots: watch::Sender<AutoplaySnapshot>,
}

impl<P: Playback, H: Host> OrchestratorActor<P, H> {
    /// Runs the actor loop until shutdown or until every handle is gone.
    ///
    /// Branch order matters: a deferred outcome or timer that is already
    /// due is handled before a command that arrived at the same time.
    async fn run(mut self) {
        tracing::info!(
            video = %self.live.session.video(),
            autoplay = self.config.autoplay,
            "autoplay orchestrator started"
        );

        loop {
            tokio::select! {
                biased;

                Some(settlement) = self.pending.next() => {
                    self.live.session.settle(settlement);
                }
                kind = self.live.session.next_timer() => {
                    tracing::debug!(video = %self.live.session.video(), timer = %kind, "timer fired");
                    let effects = self.live.session.timer_fired(kind);
                    self.apply(effects);
                }
                change = self.live.focus.next() => {
                    let effects = match change {
                        FocusChange::Gained => self.live.session.focus_gained(),
                        FocusChange::Lost => {
                            self.live.session.focus_lost();
                            Vec::new()
                        }
                    };
                    self.apply(effects);
                }
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::debug!("all handles dropped");
                        break;
                    };
                    if !self.handle_command(cmd) {
                        break;
                    }
                }
            }
            self.publish();
        }

        tracing::info!(
            video = %self.live.session.video(),
            pending_starts = self.pending.len(),
            "autoplay orchestrator stopped"
        );
    }

    /// Returns `false` when the actor should stop.
    fn handle_command(&mut self, cmd: OrchestratorCommand<P>) -> bool {
        let session = &mut self.live.session;
        let effects = match cmd {
            OrchestratorCommand::PlayerReady {
                player,
                already_playing,
            } => session.player_ready(player, already_playing),
            OrchestratorCommand::PlayerPlay => {
                session.player_play();
                Vec::new()
            }
            OrchestratorCommand::PlayerPause => {
                session.player_pause();
                Vec::new()
            }
            OrchestratorCommand::PlayerEnded => session.player_ended(),
            OrchestratorCommand::PlayerError => {
                session.player_error();
                Vec::new()
            }
            OrchestratorCommand::ChangeVideo { video } => {
                self.change_video(video);
                Vec::new()
            }
            OrchestratorCommand::ManualPlay => session.request_manual_play(),
            OrchestratorCommand::Redirect { mark_finished } => {
                session.request_redirect(mark_finished)
            }
            OrchestratorCommand::CancelFallbackTimer => {
                session.cancel_fallback_timer();
                Vec::new()
            }
            OrchestratorCommand::DismissManualPlay => {
                session.dismiss_manual_play();
                Vec::new()
            }
            OrchestratorCommand::Skip => session.skip(),
            OrchestratorCommand::GetSnapshot { reply } => {
                let _ = reply.send(session.snapshot());
                Vec::new()
            }
            OrchestratorCommand::Shutdown => {
                tracing::info!(video = %session.video(), "orchestrator shutting down");
                return false;
            }
        };
        self.apply(effects);
        true
    }

    fn change_video(&mut self, video: VideoId) {
        self.generation += 1;
        tracing::info!(
            from = %self.live.session.video(),
            to = %video,
            generation = self.generation,
            "video changed"
        );
        // The old session (timer, focus subscription) drops here.
        self.live = LiveSession {
            session: AutoplaySession::new(
                video,
                self.generation,
                self.config.clone(),
                self.focus.is_focused(),
            ),
            focus: self.focus.subscribe(),
        };
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::AwaitStart(attempt) => {
                    tracing::trace!(
                        generation = attempt.generation,
                        purpose = %attempt.purpose,
                        "awaiting deferred start"
                    );
                    self.pending.push(attempt.settle());
                }
                Effect::Advance => {
                    self.host.advance(self.live.session.video());
                }
                Effect::Redirect(target) => {
                    self.host.open_external(&target);
                }
            }
        }
    }

    /// Publishes the live snapshot if it differs from the last one.
    fn publish(&self) {
        let next = self.live.session.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}

/// Spawns an orchestrator for `video` and returns a handle to it.
///
/// `config` is validated first. The orchestrator reads the window state
/// from `focus` and reports to `host`. `channel_size` bounds the command
/// queue; senders wait when it is full.
pub fn spawn_orchestrator<P: Playback, H: Host>(
    video: VideoId,
    config: AutoplayConfig,
    focus: FocusSignal,
    host: H,
    channel_size: usize,
) -> AutoplayHandle<P> {
    let (tx, rx) = mpsc::channel(channel_size);
    let config = config.validated();
    let generation = 1;

    let session = AutoplaySession::new(video, generation, config.clone(), focus.is_focused());
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    let actor = OrchestratorActor {
        live: LiveSession {
            session,
            focus: focus.subscribe(),
        },
        config,
        host,
        focus,
        generation,
        pending: FuturesUnordered::new(),
        receiver: rx,
        snapshots: snapshot_tx,
    };

    tokio::spawn(actor.run());

    AutoplayHandle {
        sender: tx,
        snapshots: snapshot_rx,
    }
}
