//! Error types for the shared types layer.

/// Errors that can occur while building shared types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The string is not a usable video identifier.
    ///
    /// Identifiers end up in provider URLs, so only URL-safe characters
    /// (`A-Z`, `a-z`, `0-9`, `-`, `_`) are accepted.
    #[error("invalid video id: {0:?}")]
    InvalidVideoId(String),

    /// The provider reported a player state code we don't know.
    #[error("unknown player state code: {0}")]
    UnknownPlayerState(i32),
}
