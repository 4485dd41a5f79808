//! Shared types for Partyplay.
//!
//! Every layer of the autoplay stack speaks in these types:
//!
//! - **Identity** ([`VideoId`]): which video a session belongs to.
//! - **Player state** ([`PlayerState`]): what the embedded player reports
//!   when queried.
//! - **Flags** ([`AutoplayFlags`], [`Notice`]): what the orchestrator
//!   exposes to the presentation layer.
//! - **Errors** ([`TypesError`]): what can go wrong building them.
//!
//! ```text
//! Player capability (start/query) → Session (flags) → Host (render, advance)
//! ```

mod error;
mod types;

pub use error::TypesError;
pub use types::{AutoplayFlags, Notice, PlayerState, VideoId};
