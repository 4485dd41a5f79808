//! What a session asks its owner to do.

use std::fmt;

use futures_util::future::BoxFuture;
use partyplay_player::{PendingStart, PlaybackError, RedirectTarget};

/// Why a start was attempted. Decides what a deferred failure means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPurpose {
    /// First unattended attempt after the player became ready.
    Autoplay,
    /// Best-effort attempt when the player becomes ready after focus returned.
    Resume,
    /// The single retry after a synchronous failure.
    Fallback,
    /// Attempt backed by a user gesture.
    Manual,
}

impl fmt::Display for StartPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autoplay => write!(f, "autoplay"),
            Self::Resume => write!(f, "resume"),
            Self::Fallback => write!(f, "fallback"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A start whose outcome has not arrived yet, tagged with the session that
/// issued it.
pub struct PendingAttempt {
    pub generation: u64,
    pub purpose: StartPurpose,
    pending: PendingStart,
}

impl PendingAttempt {
    pub fn new(generation: u64, purpose: StartPurpose, pending: PendingStart) -> Self {
        Self {
            generation,
            purpose,
            pending,
        }
    }

    /// Waits for the outcome and packages it for [`AutoplaySession::settle`].
    ///
    /// [`AutoplaySession::settle`]: crate::AutoplaySession::settle
    pub fn settle(self) -> BoxFuture<'static, Settlement> {
        let Self {
            generation,
            purpose,
            pending,
        } = self;
        Box::pin(async move {
            Settlement {
                generation,
                purpose,
                result: pending.await,
            }
        })
    }
}

impl fmt::Debug for PendingAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAttempt")
            .field("generation", &self.generation)
            .field("purpose", &self.purpose)
            .finish_non_exhaustive()
    }
}

/// The outcome of a [`PendingAttempt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub generation: u64,
    pub purpose: StartPurpose,
    pub result: Result<(), PlaybackError>,
}

/// Side effects the session cannot perform itself.
#[derive(Debug)]
pub enum Effect {
    /// Await this start and feed the [`Settlement`] back.
    AwaitStart(PendingAttempt),
    /// Tell the host the current item is finished.
    Advance,
    /// Open the provider's page.
    Redirect(RedirectTarget),
}
