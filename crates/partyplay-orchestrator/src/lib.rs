//! The autoplay orchestrator for Partyplay.
//!
//! One orchestrator runs per mounted display as an isolated Tokio task that
//! owns the live [`AutoplaySession`](partyplay_session::AutoplaySession).
//! Host commands, focus changes, timer fires and deferred start outcomes
//! all funnel into the same task, so handlers never overlap.
//!
//! # Key types
//!
//! - [`AutoplayHandle`]: send commands to a running orchestrator
//! - [`spawn_orchestrator`]: start one
//! - [`OrchestratorError`]: the orchestrator has stopped

mod actor;
mod error;

pub use actor::{AutoplayHandle, spawn_orchestrator};
pub use error::OrchestratorError;
