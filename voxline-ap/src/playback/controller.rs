//! Tiered playback controller
//!
//! Plays a voice line through the first tier that works:
//! 1. decoded buffer on the low-latency output context (only once unlocked)
//! 2. the reusable streaming element
//! 3. a freshly constructed streaming element, which replaces the reusable one
//!
//! When every tier fails the caller receives a [`PlaybackDiagnostic`] instead
//! of an error. Playback requests are not queued; the caller issues one at a
//! time.

use crate::error::{Error, Result};
use crate::fetch::{Fetcher, Locator};
use crate::playback::context::{ContextOpener, ContextState, OutputContext};
use crate::playback::diagnostic::{PlaybackDiagnostic, PlaybackOutcome};
use crate::playback::element::{ElementFactory, PlaybackElement, PlaybackError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use voxline_common::store::{load_audio_enabled, save_audio_enabled};
use voxline_common::StateStore;

/// Unlock tone frequency
pub const UNLOCK_TONE_HZ: f32 = 440.0;

/// Unlock tone gain (near silent)
pub const UNLOCK_TONE_GAIN: f32 = 0.0001;

/// Unlock tone length
pub const UNLOCK_TONE_DURATION: Duration = Duration::from_millis(20);

/// Constructors for the controller's playback resources
pub struct PlaybackBackends {
    /// Opens the output context on first unlock
    pub open_context: ContextOpener,
    /// Builds streaming elements
    pub elements: Arc<dyn ElementFactory>,
    /// Fetches audio bytes for the decoded tier
    pub fetcher: Arc<dyn Fetcher>,
}

/// Playback state for one chat session
pub struct PlaybackController {
    enabled: bool,
    context: Option<Box<dyn OutputContext>>,
    open_context: ContextOpener,
    element: Box<dyn PlaybackElement>,
    elements: Arc<dyn ElementFactory>,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn StateStore>,
}

impl PlaybackController {
    /// Create a controller with the persisted capability flag.
    ///
    /// The output context is not opened until [`PlaybackController::enable`].
    pub fn new(backends: PlaybackBackends, store: Arc<dyn StateStore>) -> Self {
        let enabled = load_audio_enabled(store.as_ref());
        debug!("Playback controller created (audio enabled: {})", enabled);

        Self {
            enabled,
            context: None,
            open_context: backends.open_context,
            element: backends.elements.create(),
            elements: backends.elements,
            fetcher: backends.fetcher,
            store,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_context(&self) -> bool {
        self.context.is_some()
    }

    /// Run the unlock sequence.
    ///
    /// The tone and the element priming are best-effort. Only a failure to
    /// open or resume the output context fails the unlock, in which case audio
    /// stays disabled and the caller may retry.
    pub async fn enable(&mut self) -> Result<()> {
        let opened = self.open_and_resume_context();

        if let Some(context) = self.context.as_mut() {
            if let Err(e) =
                context.emit_tone(UNLOCK_TONE_HZ, UNLOCK_TONE_GAIN, UNLOCK_TONE_DURATION)
            {
                debug!("Unlock tone failed: {}", e);
            }
        }

        self.prime_element().await;

        match opened {
            Ok(()) => {
                self.set_enabled(true);
                info!("Audio enabled");
                Ok(())
            }
            Err(e) => {
                warn!("Audio unlock failed: {}", e);
                Err(Error::Unlock(e.to_string()))
            }
        }
    }

    /// Turn autoplay off. The output context is kept for a later enable.
    pub fn disable(&mut self) {
        self.set_enabled(false);
        info!("Audio disabled");
    }

    /// Play the audio at `locator`. Never fails; total failure is reported
    /// through [`PlaybackOutcome::Failed`].
    pub async fn play(&mut self, locator: &str) -> PlaybackOutcome {
        if locator.trim().is_empty() {
            debug!("No audio locator, skipping playback");
            return PlaybackOutcome::Skipped;
        }

        if self.enabled && self.context.is_some() {
            match self.play_decoded(locator).await {
                Ok(()) => {
                    debug!("Playing decoded buffer for {}", locator);
                    return PlaybackOutcome::Decoded;
                }
                Err(e) => debug!("Decoded playback unavailable, streaming instead: {}", e),
            }
        }

        let primary = match Self::start_element(self.element.as_mut(), locator).await {
            Ok(()) => return PlaybackOutcome::Streamed,
            Err(e) => e,
        };
        debug!("Primary element rejected {}: {}", locator, primary);

        let mut fresh = self.elements.create();
        match Self::start_element(fresh.as_mut(), locator).await {
            Ok(()) => {
                self.element.pause();
                self.element = fresh;
                PlaybackOutcome::StreamedFallback
            }
            Err(secondary) => {
                warn!(
                    "Playback failed for {} (primary: {}, secondary: {})",
                    locator, primary, secondary
                );
                PlaybackOutcome::Failed(PlaybackDiagnostic {
                    primary,
                    secondary,
                    locator: locator.to_string(),
                })
            }
        }
    }

    /// Stop the streaming element. A decoded buffer already playing finishes.
    pub fn stop(&mut self) {
        self.element.pause();
        if let Err(e) = self.element.reset_position() {
            debug!("Ignoring reset error on stop: {}", e);
        }
    }

    fn open_and_resume_context(&mut self) -> Result<()> {
        if self.context.is_none() {
            self.context = Some((self.open_context)()?);
            debug!("Output context opened");
        }

        if let Some(context) = self.context.as_mut() {
            if context.state() != ContextState::Running {
                context.resume()?;
            }
        }
        Ok(())
    }

    async fn prime_element(&mut self) {
        self.element.set_muted(true);
        if let Err(e) = self.element.play().await {
            debug!("Priming play rejected: {}", e);
        }
        self.element.pause();
        self.element.set_muted(false);
    }

    async fn play_decoded(&mut self, locator: &str) -> Result<()> {
        let fetcher = Arc::clone(&self.fetcher);
        let context = self.context.as_mut().ok_or(Error::ContextSuspended)?;

        if context.state() != ContextState::Running {
            context.resume()?;
        }

        let bytes = fetcher.fetch(locator).await?;
        let hint = Locator::parse(locator).ok().and_then(|l| l.extension());

        // Decoding and resampling are CPU-bound; keep them off the runtime thread
        let job = context.decoder();
        let buffer = tokio::task::spawn_blocking(move || job(bytes, hint))
            .await
            .map_err(|e| Error::Decode(format!("Decode task failed: {}", e)))??;

        context.start_one_shot(buffer)
    }

    async fn start_element(
        element: &mut dyn PlaybackElement,
        locator: &str,
    ) -> std::result::Result<(), PlaybackError> {
        element.pause();
        if let Err(e) = element.reset_position() {
            debug!("Ignoring reset error: {}", e);
        }
        element.set_source(locator);
        element.play().await
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if let Err(e) = save_audio_enabled(self.store.as_ref(), enabled) {
            warn!("Failed to persist audio setting: {}", e);
        }
    }
}
