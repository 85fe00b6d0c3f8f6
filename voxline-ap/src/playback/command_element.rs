//! Streaming element backed by an external player process
//!
//! Each play spawns the configured player (ffplay by default) with the
//! locator substituted into its arguments. A play is accepted once the player
//! has survived the settle window or exited cleanly within it.

use crate::playback::element::{ElementFactory, PlaybackElement, PlaybackError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, warn};
use voxline_common::config::{PlaybackConfig, LOCATOR_PLACEHOLDER};

/// Player process element
pub struct CommandElement {
    program: String,
    args: Vec<String>,
    settle: Duration,
    source: Option<String>,
    muted: bool,
    child: Option<Child>,
}

impl CommandElement {
    pub fn new(program: impl Into<String>, args: Vec<String>, settle: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            settle,
            source: None,
            muted: false,
            child: None,
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(
            config.player.clone(),
            config.player_args.clone(),
            Duration::from_millis(config.settle_ms),
        )
    }

    /// True while a spawned player is still attached
    pub fn is_active(&self) -> bool {
        self.child.is_some()
    }

    /// Substitute `locator` for the placeholder, or append it if no argument
    /// carries one.
    pub fn expand_args(args: &[String], locator: &str) -> Vec<String> {
        if args.iter().any(|a| a.contains(LOCATOR_PLACEHOLDER)) {
            args.iter()
                .map(|a| a.replace(LOCATOR_PLACEHOLDER, locator))
                .collect()
        } else {
            let mut expanded = args.to_vec();
            expanded.push(locator.to_string());
            expanded
        }
    }
}

#[async_trait]
impl PlaybackElement for CommandElement {
    fn set_source(&mut self, locator: &str) {
        self.source = Some(locator.to_string());
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn reset_position(&mut self) -> Result<(), PlaybackError> {
        // Every spawn starts from the beginning
        Ok(())
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        let locator = self
            .source
            .clone()
            .ok_or_else(|| PlaybackError::new("NotSupportedError", "No source assigned"))?;

        // A muted player process produces nothing; priming only checks the source
        if self.muted {
            debug!("Muted play of {} skipped", locator);
            return Ok(());
        }

        self.pause();

        let args = Self::expand_args(&self.args, &locator);
        debug!("Spawning {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::new("SpawnError", format!("{}: {}", self.program, e)))?;

        match timeout(self.settle, child.wait()).await {
            Err(_) => {
                // Still running after the settle window
                self.child = Some(child);
                Ok(())
            }
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(PlaybackError::new(
                "PlayerExited",
                format!("{} exited with {}", self.program, status),
            )),
            Ok(Err(e)) => Err(PlaybackError::new("WaitError", e.to_string())),
        }
    }

    fn pause(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                warn!("Failed to stop player process: {}", e);
            }
        }
    }
}

/// Builds [`CommandElement`]s from the playback configuration
#[derive(Debug, Clone)]
pub struct CommandElementFactory {
    config: PlaybackConfig,
}

impl CommandElementFactory {
    pub fn new(config: PlaybackConfig) -> Self {
        Self { config }
    }
}

impl ElementFactory for CommandElementFactory {
    fn create(&self) -> Box<dyn PlaybackElement> {
        Box::new(CommandElement::from_config(&self.config))
    }
}
