//! Error types for voxline-ap
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for voxline-ap
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from the shared selection core (corpus, config, state)
    #[error(transparent)]
    Common(#[from] voxline_common::Error),

    /// Locator could not be fetched (network, HTTP status, missing file)
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Audio decoding errors
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio output device errors
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Output context is not running (never resumed, or suspended)
    #[error("Audio context suspended")]
    ContextSuspended,

    /// Unlock sequence failed; playback stays disabled
    #[error("Could not enable audio: {0}")]
    Unlock(String),
}

/// Convenience Result type using voxline-ap Error
pub type Result<T> = std::result::Result<T, Error>;
