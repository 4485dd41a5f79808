//! Single-slot timer for Partyplay autoplay sessions.
//!
//! An autoplay session waits on at most one thing at a time: either the
//! fallback retry after a synchronous start failure, or the auto-redirect
//! after an embed error. [`TimerSlot`] makes that a structural property
//! instead of a call-site convention: there is one slot, one way to arm it,
//! and arming always replaces whatever was there.
//!
//! # Integration
//!
//! The slot sits inside the orchestrator's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         kind = slot.wait_fire() => {
//!             session.timer_fired(kind);
//!         }
//!     }
//! }
//! ```
//!
//! [`TimerSlot::wait_fire`] is cancel-safe: if another branch wins, the
//! deadline stays armed and the next call waits for the same instant.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// TimerKind
// ---------------------------------------------------------------------------

/// What a pending timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Retry a playback start that failed synchronously.
    Fallback,
    /// Send the user to the provider after an embed error.
    AutoRedirect,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fallback => write!(f, "fallback"),
            Self::AutoRedirect => write!(f, "auto-redirect"),
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Lifetime counters for one slot.
///
/// Every armed timer ends exactly one way (fired, cancelled, superseded) or
/// is still pending, so `armed - fired - cancelled - superseded` is always
/// 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerMetrics {
    pub armed: u64,
    pub fired: u64,
    pub cancelled: u64,
    /// Timers replaced by a later `arm` before they fired.
    pub superseded: u64,
}

impl TimerMetrics {
    /// Timers armed but not yet resolved.
    pub fn outstanding(&self) -> u64 {
        self.armed - self.fired - self.cancelled - self.superseded
    }
}

// ---------------------------------------------------------------------------
// TimerSlot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct ArmedTimer {
    kind: TimerKind,
    deadline: Instant,
}

/// Holds at most one pending timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<ArmedTimer>,
    metrics: TimerMetrics,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer of `kind` that fires after `delay`.
    ///
    /// Any timer already in the slot is superseded and returned.
    pub fn arm(&mut self, kind: TimerKind, delay: Duration) -> Option<TimerKind> {
        let deadline = Instant::now() + delay;
        let previous = self.armed.replace(ArmedTimer { kind, deadline });
        self.metrics.armed += 1;

        let superseded = previous.map(|p| p.kind);
        if let Some(old) = superseded {
            self.metrics.superseded += 1;
            debug!(timer = %kind, superseded = %old, "timer armed over pending timer");
        } else {
            debug!(timer = %kind, delay_ms = delay.as_millis() as u64, "timer armed");
        }
        superseded
    }

    /// Cancels whatever is pending. Idempotent.
    pub fn cancel(&mut self) -> Option<TimerKind> {
        let kind = self.armed.take().map(|t| t.kind)?;
        self.metrics.cancelled += 1;
        debug!(timer = %kind, "timer cancelled");
        Some(kind)
    }

    /// Cancels the pending timer only if it is of `kind`.
    pub fn cancel_kind(&mut self, kind: TimerKind) -> bool {
        if self.pending() == Some(kind) {
            self.cancel();
            true
        } else {
            false
        }
    }

    /// The kind of the pending timer, if any.
    pub fn pending(&self) -> Option<TimerKind> {
        self.armed.map(|t| t.kind)
    }

    /// Whether a timer is pending.
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Time left before the pending timer fires.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .map(|t| t.deadline.saturating_duration_since(Instant::now()))
    }

    /// Waits for the pending timer and returns its kind.
    ///
    /// With nothing armed this future pends forever; `select!` keeps
    /// servicing its other branches.
    pub async fn wait_fire(&mut self) -> TimerKind {
        let Some(ArmedTimer { kind, deadline }) = self.armed else {
            return std::future::pending().await;
        };

        time::sleep_until(deadline).await;

        self.armed = None;
        self.metrics.fired += 1;
        trace!(timer = %kind, "timer fired");
        kind
    }

    /// Snapshot of the lifetime counters.
    pub fn metrics(&self) -> &TimerMetrics {
        &self.metrics
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(kind) = self.pending() {
            trace!(timer = %kind, "timer dropped with its slot");
        }
    }
}
