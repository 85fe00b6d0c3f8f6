//! Streaming playback elements
//!
//! A [`PlaybackElement`] is a reusable player that is pointed at a locator and
//! told to play. Play may reject; rejections carry a [`PlaybackError`] that
//! the controller folds into its diagnostic.

use async_trait::async_trait;
use thiserror::Error;

/// Rejection from a playback element
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct PlaybackError {
    /// Short error class, e.g. `SpawnError`
    pub name: String,
    pub message: String,
}

impl PlaybackError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Playable element with an assignable source
#[async_trait]
pub trait PlaybackElement: Send {
    /// Assign the locator to play next
    fn set_source(&mut self, locator: &str);

    fn set_muted(&mut self, muted: bool);

    /// Seek back to the start
    fn reset_position(&mut self) -> Result<(), PlaybackError>;

    /// Start playback of the current source
    async fn play(&mut self) -> Result<(), PlaybackError>;

    /// Stop producing sound; safe to call when idle
    fn pause(&mut self);
}

/// Constructs fresh elements
pub trait ElementFactory: Send + Sync {
    fn create(&self) -> Box<dyn PlaybackElement>;
}
