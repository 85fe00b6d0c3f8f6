//! Playback controller driven through real player processes

use std::sync::Arc;
use std::time::Duration;
use voxline_ap::error::Error;
use voxline_ap::fetch::LocatorFetcher;
use voxline_ap::playback::{
    CommandElementFactory, ContextOpener, PlaybackBackends, PlaybackController, PlaybackOutcome,
};
use voxline_common::config::PlaybackConfig;
use voxline_common::store::AUDIO_ENABLED_KEY;
use voxline_common::{MemoryStore, StateStore};

const LINE: &str = "https://cdn.example/lines/cm_cold.mp3";

fn player(program: &str, args: &[&str]) -> PlaybackConfig {
    PlaybackConfig {
        player: program.to_string(),
        player_args: args.iter().map(|s| s.to_string()).collect(),
        settle_ms: 200,
        ..PlaybackConfig::default()
    }
}

/// Opener standing in for a machine without an output device
fn no_device() -> ContextOpener {
    Box::new(|| Err(Error::AudioOutput("No default output device found".to_string())))
}

fn controller(config: PlaybackConfig, store: Arc<MemoryStore>) -> PlaybackController {
    let backends = PlaybackBackends {
        open_context: no_device(),
        elements: Arc::new(CommandElementFactory::new(config)),
        fetcher: Arc::new(LocatorFetcher::new(Duration::from_secs(1)).unwrap()),
    };
    PlaybackController::new(backends, store)
}

#[tokio::test]
async fn test_missing_player_reports_both_errors() {
    let mut controller = controller(
        player("voxline-missing-player", &["{locator}"]),
        Arc::new(MemoryStore::new()),
    );

    let outcome = controller.play(LINE).await;

    let diagnostic = outcome.diagnostic().expect("both tiers should fail");
    assert_eq!(diagnostic.primary.name, "SpawnError");
    assert_eq!(diagnostic.secondary.name, "SpawnError");
    let text = diagnostic.to_string();
    assert!(text.starts_with("Audio failed to play.\nError 1: SpawnError"));
    assert!(text.ends_with(LINE));
}

#[cfg(unix)]
#[tokio::test]
async fn test_player_streams_line() {
    let mut controller = controller(
        player("sh", &["-c", "exit 0", "{locator}"]),
        Arc::new(MemoryStore::new()),
    );

    assert_eq!(controller.play(LINE).await, PlaybackOutcome::Streamed);
    controller.stop();
}

#[cfg(unix)]
#[tokio::test]
async fn test_stop_kills_running_player() {
    let mut controller = controller(
        player("sh", &["-c", "sleep 10", "{locator}"]),
        Arc::new(MemoryStore::new()),
    );

    assert_eq!(controller.play(LINE).await, PlaybackOutcome::Streamed);
    controller.stop();
    controller.stop();
}

#[tokio::test]
async fn test_unlock_without_device_stays_disabled() {
    let store = Arc::new(MemoryStore::new());
    let mut controller = controller(player("voxline-missing-player", &[]), Arc::clone(&store));

    let result = controller.enable().await;

    assert!(matches!(result, Err(Error::Unlock(_))));
    assert!(!controller.is_enabled());
    assert!(!controller.has_context());
    assert_eq!(store.get(AUDIO_ENABLED_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_empty_audio_ref_is_skipped() {
    let mut controller = controller(
        player("voxline-missing-player", &[]),
        Arc::new(MemoryStore::new()),
    );
    assert_eq!(controller.play("").await, PlaybackOutcome::Skipped);
}
