//! Voice line playback with tiered fallback

pub mod command_element;
pub mod context;
pub mod controller;
pub mod diagnostic;
pub mod element;

pub use command_element::{CommandElement, CommandElementFactory};
pub use context::{ContextOpener, ContextState, CpalContext, DecodeJob, OutputContext};
pub use controller::{PlaybackBackends, PlaybackController};
pub use diagnostic::{PlaybackDiagnostic, PlaybackOutcome};
pub use element::{ElementFactory, PlaybackElement, PlaybackError};
