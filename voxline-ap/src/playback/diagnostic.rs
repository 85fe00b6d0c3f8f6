//! Playback outcomes and the user-facing failure report

use crate::playback::element::PlaybackError;
use std::fmt;

/// Both streaming rejections plus the locator to open by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackDiagnostic {
    pub primary: PlaybackError,
    pub secondary: PlaybackError,
    pub locator: String,
}

impl fmt::Display for PlaybackDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Audio failed to play.")?;
        writeln!(f, "Error 1: {}", self.primary)?;
        writeln!(f, "Error 2: {}", self.secondary)?;
        writeln!(
            f,
            "Enable audio once, then try again. Also try the direct link below:"
        )?;
        write!(f, "{}", self.locator)
    }
}

/// Which tier produced audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Decoded buffer on the output context
    Decoded,
    /// Reusable streaming element
    Streamed,
    /// Freshly constructed element, now the reusable one
    StreamedFallback,
    /// Nothing to play
    Skipped,
    Failed(PlaybackDiagnostic),
}

impl PlaybackOutcome {
    pub fn is_audible(&self) -> bool {
        matches!(
            self,
            PlaybackOutcome::Decoded | PlaybackOutcome::Streamed | PlaybackOutcome::StreamedFallback
        )
    }

    pub fn diagnostic(&self) -> Option<&PlaybackDiagnostic> {
        match self {
            PlaybackOutcome::Failed(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_text() {
        let diagnostic = PlaybackDiagnostic {
            primary: PlaybackError::new("SpawnError", "ffplay: not found"),
            secondary: PlaybackError::new("PlayerExited", "ffplay exited with 1"),
            locator: "https://cdn.example/a.mp3".to_string(),
        };

        assert_eq!(
            diagnostic.to_string(),
            "Audio failed to play.\n\
             Error 1: SpawnError: ffplay: not found\n\
             Error 2: PlayerExited: ffplay exited with 1\n\
             Enable audio once, then try again. Also try the direct link below:\n\
             https://cdn.example/a.mp3"
        );
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(PlaybackOutcome::Decoded.is_audible());
        assert!(!PlaybackOutcome::Skipped.is_audible());
        assert!(PlaybackOutcome::Streamed.diagnostic().is_none());
    }
}
