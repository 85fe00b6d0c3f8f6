//! Voxline Audio Player (voxline-ap) - Main entry point
//!
//! Terminal chat loop: every line typed gets a recorded voice line back.
//! Replies auto-play once audio has been enabled with `/enable`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use voxline_ap::chat::{format_reply, ChatCommand, HELP_TEXT};
use voxline_ap::corpus_loader::CorpusLoader;
use voxline_ap::fetch::{Fetcher, LocatorFetcher};
use voxline_ap::playback::{
    CommandElementFactory, CpalContext, PlaybackBackends, PlaybackController, PlaybackOutcome,
};
use voxline_common::config::{self, TomlConfig};
use voxline_common::{JsonFileStore, RecencyLedger, Selector, StateStore};

/// Persisted state file under the data directory
const STATE_FILE: &str = "state.json";

/// Corpus cache directory under the data directory
const CACHE_DIR: &str = "cache";

/// Command-line arguments for voxline-ap
#[derive(Parser, Debug)]
#[command(name = "voxline-ap")]
#[command(about = "Chat with a corpus of recorded voice lines")]
#[command(version)]
struct Args {
    /// Config file (default: <config_dir>/voxline/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Corpus locator: URL, file:// URL or path
    #[arg(long)]
    corpus: Option<String>,

    /// Directory for persisted state and the corpus cache
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, env = "VOXLINE_LOG")]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config =
        TomlConfig::discover(args.config.as_deref()).context("Failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| toml_config.logging.level.clone());

    // Logs go to stderr; stdout is the chat transcript
    tracing_subscriber::registry()
        .with(env_filter(&level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_dir = config::resolve_data_dir(args.data_dir.as_deref(), &toml_config);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    info!("Data directory: {}", data_dir.display());

    let corpus_locator = config::resolve_corpus(args.corpus.as_deref(), &toml_config)?;

    let store: Arc<dyn StateStore> = Arc::new(JsonFileStore::open(data_dir.join(STATE_FILE)));
    let fetcher: Arc<dyn Fetcher> = Arc::new(LocatorFetcher::new(Duration::from_millis(
        toml_config.playback.fetch_timeout_ms,
    ))?);

    let index = CorpusLoader::new(fetcher.as_ref(), data_dir.join(CACHE_DIR))
        .load(&corpus_locator)
        .await
        .with_context(|| format!("Failed to load corpus from {}", corpus_locator))?;
    let line_count = index.len();
    info!("Corpus ready: {} voice lines", line_count);

    let mut selector = Selector::new(index, RecencyLedger::load(Arc::clone(&store)));

    let backends = PlaybackBackends {
        open_context: CpalContext::opener(toml_config.playback.device.clone()),
        elements: Arc::new(CommandElementFactory::new(toml_config.playback.clone())),
        fetcher,
    };
    let mut controller = PlaybackController::new(backends, store);

    println!("Loaded {} voice lines. Say something.", line_count);
    if !controller.is_enabled() {
        println!("Tip: type /enable once. After that, replies should auto-play.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_audio: Option<String> = None;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        };
        let Some(line) = line else {
            debug!("End of input");
            break;
        };

        match ChatCommand::parse(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Say(query) => {
                let entry = match selector.choose_reply(&query) {
                    Ok(entry) => entry.clone(),
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                println!("{}", format_reply(&entry));
                last_audio = entry.audio_ref;

                if controller.is_enabled() {
                    if let Some(locator) = &last_audio {
                        report(controller.play(locator).await);
                    }
                }
            }
            ChatCommand::Enable => match controller.enable().await {
                Ok(()) => println!("Audio enabled. Replies should auto-play now."),
                Err(e) => println!("{}. Try again.", e),
            },
            ChatCommand::Disable => {
                controller.disable();
                println!("Audio disabled.");
            }
            ChatCommand::Replay => match &last_audio {
                Some(locator) => report(controller.play(locator).await),
                None => println!("Nothing to play yet."),
            },
            ChatCommand::Stop => controller.stop(),
            ChatCommand::Clear => {
                selector.clear_history();
                last_audio = None;
                println!("Cleared. Say something.");
            }
            ChatCommand::Help => println!("{}", HELP_TEXT),
            ChatCommand::Quit => break,
            ChatCommand::Unknown(command) => {
                println!("Unknown command /{}. Type /help for commands.", command)
            }
        }
    }

    controller.stop();
    info!("Session ended");
    Ok(())
}

/// Filter from RUST_LOG, else from `level`. A bare level applies to the
/// voxline crates only.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if level.contains('=') {
            EnvFilter::new(level)
        } else {
            EnvFilter::new(format!("voxline_ap={0},voxline_common={0}", level))
        }
    })
}

fn report(outcome: PlaybackOutcome) {
    match outcome {
        PlaybackOutcome::Failed(diagnostic) => println!("{}", diagnostic),
        outcome => debug!("Playback outcome: {:?}", outcome),
    }
}
