//! Autoplay session state machine for Partyplay.
//!
//! One [`AutoplaySession`] exists per displayed video. It decides, for each
//! lifecycle event, whether to attempt playback, ask for a manual start,
//! show the delayed-autoplay notice, or send the user to the provider, and
//! it owns the single timer those decisions need.
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (above)  ← feeds events, runs effects, awaits deferred starts
//!     ↕
//! Session (this crate)  ← flags, timer, decisions; no I/O of its own
//!     ↕
//! Player + Timer (below)  ← Playback capability, TimerSlot
//! ```
//!
//! The session never blocks and never calls the host. Anything that must
//! happen outside it is returned as an [`Effect`].

mod config;
mod effect;
mod error;
mod session;
mod snapshot;

pub use config::{AUTO_REDIRECT_DELAY_MS, AutoplayConfig, FALLBACK_DELAY_MS};
pub use effect::{Effect, PendingAttempt, Settlement, StartPurpose};
pub use error::AutoplayFault;
pub use session::AutoplaySession;
pub use snapshot::AutoplaySnapshot;
