//! Log output for hosts and demos.
//!
//! Every crate in the workspace logs through `tracing`; nothing is printed
//! until a subscriber is installed.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::PartyplayError;

const DEFAULT_DIRECTIVES: &str = "info";

/// Installs a formatted subscriber filtered by `RUST_LOG`, falling back
/// to `info`.
pub fn init() -> Result<(), PartyplayError> {
    init_with(DEFAULT_DIRECTIVES)
}

/// Like [`init`], with `directives` (e.g. `"partyplay_session=debug"`)
/// used when `RUST_LOG` is unset or invalid.
pub fn init_with(directives: &str) -> Result<(), PartyplayError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()?;
    Ok(())
}
