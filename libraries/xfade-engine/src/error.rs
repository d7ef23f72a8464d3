//! Error types for the crossfade engine

use thiserror::Error;

/// Crossfade engine errors
#[derive(Debug, Error)]
pub enum CrossfadeError {
    /// The host supplied fewer than the two channels the engine alternates between
    #[error("Crossfade requires two playback channels, found {found}")]
    NotEnoughChannels { found: usize },

    /// The backend does not know the requested clip
    #[error("Unknown clip: {0}")]
    UnknownClip(String),

    /// The engine side of a command handle has been dropped
    #[error("Command channel closed")]
    CommandChannelClosed,
}

/// Result type for crossfade operations
pub type Result<T> = std::result::Result<T, CrossfadeError>;
