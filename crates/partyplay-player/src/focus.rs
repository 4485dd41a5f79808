//! Foreground/background signal for the host window.
//!
//! There is one window, so there is one [`FocusSignal`] per process. Each
//! autoplay session holds its own [`FocusSubscription`] for as long as the
//! session lives; dropping the subscription is the unsubscribe. A session
//! that has been replaced can therefore never react to a focus change.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Buffered changes per subscriber before it is considered lagging.
const CHANNEL_CAPACITY: usize = 32;

/// A single focus notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gained,
    Lost,
}

impl FocusChange {
    fn from_focused(focused: bool) -> Self {
        if focused { Self::Gained } else { Self::Lost }
    }
}

struct FocusInner {
    focused: AtomicBool,
    tx: broadcast::Sender<FocusChange>,
}

/// Process-wide focus signal. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct FocusSignal {
    inner: Arc<FocusInner>,
}

impl FocusSignal {
    /// Creates a signal with the given initial state.
    pub fn new(initially_focused: bool) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(FocusInner {
                focused: AtomicBool::new(initially_focused),
                tx,
            }),
        }
    }

    /// Last known foreground state.
    pub fn is_focused(&self) -> bool {
        self.inner.focused.load(Ordering::SeqCst)
    }

    /// The window came to the foreground.
    pub fn gained(&self) {
        self.set_focused(true);
    }

    /// The window went to the background.
    pub fn lost(&self) {
        self.set_focused(false);
    }

    /// Records the new state and notifies every live subscription.
    ///
    /// Repeated notifications of the same state are still delivered; edge
    /// detection belongs to the subscriber.
    pub fn set_focused(&self, focused: bool) {
        self.inner.focused.store(focused, Ordering::SeqCst);
        let change = FocusChange::from_focused(focused);
        // No subscribers is fine: nothing is mounted.
        let receivers = self.inner.tx.send(change).unwrap_or(0);
        debug!(?change, receivers, "focus changed");
    }

    /// Subscribes to future changes.
    pub fn subscribe(&self) -> FocusSubscription {
        FocusSubscription {
            rx: self.inner.tx.subscribe(),
            signal: self.clone(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.tx.receiver_count()
    }
}

impl Default for FocusSignal {
    /// Windows start in the foreground.
    fn default() -> Self {
        Self::new(true)
    }
}

impl std::fmt::Debug for FocusSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSignal")
            .field("focused", &self.is_focused())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// One session's view of the focus signal.
pub struct FocusSubscription {
    rx: broadcast::Receiver<FocusChange>,
    signal: FocusSignal,
}

impl FocusSubscription {
    /// Waits for the next change.
    ///
    /// If this subscriber fell behind, the missed changes are collapsed
    /// into the signal's current state.
    pub async fn next(&mut self) -> FocusChange {
        match self.rx.recv().await {
            Ok(change) => change,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "focus subscription lagged, resyncing");
                FocusChange::from_focused(self.signal.is_focused())
            }
            // The subscription's own signal clone keeps the sender alive.
            Err(broadcast::error::RecvError::Closed) => std::future::pending().await,
        }
    }

    /// Current state of the underlying signal.
    pub fn is_focused(&self) -> bool {
        self.signal.is_focused()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_focused() {
        let signal = FocusSignal::default();
        assert!(signal.is_focused());
    }

    #[test]
    fn test_set_without_subscribers_does_not_panic() {
        let signal = FocusSignal::new(true);
        signal.lost();
        assert!(!signal.is_focused());
        signal.gained();
        assert!(signal.is_focused());
    }

    #[tokio::test]
    async fn test_subscription_sees_changes_in_order() {
        let signal = FocusSignal::new(true);
        let mut sub = signal.subscribe();

        signal.lost();
        signal.gained();
        signal.gained();

        assert_eq!(sub.next().await, FocusChange::Lost);
        assert_eq!(sub.next().await, FocusChange::Gained);
        assert_eq!(sub.next().await, FocusChange::Gained);
        assert!(sub.is_focused());
    }

    #[tokio::test]
    async fn test_dropping_subscription_unsubscribes() {
        let signal = FocusSignal::new(true);
        let sub = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 1);
        drop(sub);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_lagged_subscription_resyncs_to_current_state() {
        let signal = FocusSignal::new(true);
        let mut sub = signal.subscribe();

        for _ in 0..(CHANNEL_CAPACITY + 5) {
            signal.gained();
        }
        signal.lost();

        assert_eq!(sub.next().await, FocusChange::Lost);
    }
}
