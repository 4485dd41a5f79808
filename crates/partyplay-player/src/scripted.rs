//! In-memory capabilities for tests and demos.
//!
//! [`ScriptedPlayback`] answers each `start()` with the next entry of a
//! script; [`RecordingHost`] remembers every advance and redirect. Both are
//! cheap to clone and clones share state, so a test can keep one copy while
//! the orchestrator owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use partyplay_types::{PlayerState, VideoId};
use tokio::sync::oneshot;

use crate::{Host, Playback, PlaybackError, RedirectTarget, StartOutcome};

/// How the scripted player answers one `start()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedStart {
    /// `Ok(Started)`.
    Started,
    /// Synchronous `Err(Failed(..))`.
    Throws(String),
    /// `Ok(Deferred(..))` that resolves successfully.
    Resolves,
    /// `Ok(Deferred(..))` that rejects with `Blocked(..)`.
    Rejects(String),
    /// `Ok(Deferred(..))` that stays pending until
    /// [`ScriptedPlayback::release`] is called.
    Held,
}

#[derive(Default)]
struct PlaybackScript {
    answers: VecDeque<ScriptedStart>,
    held: VecDeque<oneshot::Sender<Result<(), PlaybackError>>>,
    calls: usize,
    state: PlayerState,
}

/// A player whose `start()` answers come from a script.
///
/// Once the script runs out every call answers [`ScriptedStart::Started`].
#[derive(Clone, Default)]
pub struct ScriptedPlayback {
    inner: Arc<Mutex<PlaybackScript>>,
}

impl ScriptedPlayback {
    /// A player that answers with `answers`, in order.
    pub fn new(answers: impl IntoIterator<Item = ScriptedStart>) -> Self {
        let player = Self::default();
        player.lock().answers.extend(answers);
        player
    }

    /// Queues one more answer.
    pub fn push(&self, answer: ScriptedStart) {
        self.lock().answers.push_back(answer);
    }

    /// Sets what [`Playback::state`] reports.
    pub fn set_state(&self, state: PlayerState) {
        self.lock().state = state;
    }

    /// How many times `start()` has been called across all clones.
    pub fn start_calls(&self) -> usize {
        self.lock().calls
    }

    /// Settles the oldest [`ScriptedStart::Held`] start.
    ///
    /// Returns `false` if nothing was held or the waiter is gone.
    pub fn release(&self, result: Result<(), PlaybackError>) -> bool {
        match self.lock().held.pop_front() {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlaybackScript> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Playback for ScriptedPlayback {
    fn start(&mut self) -> Result<StartOutcome, PlaybackError> {
        let mut script = self.lock();
        script.calls += 1;
        let answer = script.answers.pop_front().unwrap_or(ScriptedStart::Started);
        match answer {
            ScriptedStart::Started => Ok(StartOutcome::Started),
            ScriptedStart::Throws(reason) => Err(PlaybackError::Failed(reason)),
            ScriptedStart::Resolves => {
                Ok(StartOutcome::Deferred(Box::pin(async { Ok::<(), PlaybackError>(()) })))
            }
            ScriptedStart::Rejects(reason) => Ok(StartOutcome::Deferred(Box::pin(
                async move { Err::<(), _>(PlaybackError::Blocked(reason)) },
            ))),
            ScriptedStart::Held => {
                let (tx, rx) = oneshot::channel();
                script.held.push_back(tx);
                Ok(StartOutcome::Deferred(Box::pin(async move {
                    rx.await.unwrap_or(Err(PlaybackError::Closed))
                })))
            }
        }
    }

    fn state(&self) -> PlayerState {
        self.lock().state
    }
}

/// One call a [`RecordingHost`] received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Advanced(VideoId),
    Opened(RedirectTarget),
}

/// A host that records calls instead of acting on them.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<HostCall> {
        self.lock().clone()
    }

    /// Videos passed to [`Host::advance`], oldest first.
    pub fn advances(&self) -> Vec<VideoId> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Advanced(video) => Some(video.clone()),
                HostCall::Opened(_) => None,
            })
            .collect()
    }

    /// Targets passed to [`Host::open_external`], oldest first.
    pub fn redirects(&self) -> Vec<RedirectTarget> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                HostCall::Opened(target) => Some(target.clone()),
                HostCall::Advanced(_) => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HostCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Host for RecordingHost {
    fn advance(&self, video: &VideoId) {
        self.lock().push(HostCall::Advanced(video.clone()));
    }

    fn open_external(&self, target: &RedirectTarget) {
        self.lock().push(HostCall::Opened(target.clone()));
    }
}
