//! # Partyplay
//!
//! Autoplay orchestration for embedded videos on a party display.
//!
//! A host implements [`Playback`](partyplay_player::Playback) for its
//! embedded player and [`Host`](partyplay_player::Host) for "next item" and
//! "open the provider page", then spawns one orchestrator per display. The
//! orchestrator decides when to start playback, when to retry, when to ask
//! for a user gesture and when to give up on the embed and redirect.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use partyplay::prelude::*;
//!
//! partyplay::telemetry::init()?;
//! let focus = FocusSignal::default();
//! let handle: AutoplayHandle<MyPlayer> = partyplay::builder()
//!     .autoplay(true)
//!     .focus(focus.clone())
//!     .spawn("dQw4w9WgXcQ", MyHost)?;
//!
//! // From the player's callbacks:
//! handle.player_ready(player).await?;
//! ```

mod builder;
mod error;
pub mod telemetry;

pub use builder::{AutoplayBuilder, DEFAULT_CHANNEL_SIZE, builder};
pub use error::PartyplayError;

pub use partyplay_orchestrator as orchestrator;
pub use partyplay_player as player;
pub use partyplay_session as session;
pub use partyplay_timer as timer;
pub use partyplay_types as types;
pub use url::Url;

pub mod prelude {
    pub use crate::{AutoplayBuilder, PartyplayError, builder};
    pub use partyplay_orchestrator::{AutoplayHandle, OrchestratorError};
    pub use partyplay_player::{
        FocusChange, FocusSignal, Host, Playback, PlaybackError, RedirectTarget, StartOutcome,
    };
    pub use partyplay_session::{AutoplayConfig, AutoplaySnapshot};
    pub use partyplay_timer::TimerKind;
    pub use partyplay_types::{AutoplayFlags, Notice, PlayerState, VideoId};
}
