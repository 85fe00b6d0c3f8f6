//! Terminal chat transcript: input commands and reply rendering

use voxline_common::CorpusEntry;

/// Tags shown under a reply
pub const MAX_SHOWN_TAGS: usize = 8;

pub const HELP_TEXT: &str = "\
Type anything to get a reply. Commands:
  /enable   enable audio (replies auto-play afterwards)
  /disable  turn autoplay off
  /play     replay the last reply's audio
  /stop     stop the current audio
  /clear    forget recently served replies
  /help     show this help
  /quit     exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Say(String),
    Enable,
    Disable,
    Stop,
    Replay,
    Clear,
    Help,
    Quit,
    Unknown(String),
    Empty,
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ChatCommand::Empty;
        }

        let Some(command) = line.strip_prefix('/') else {
            return ChatCommand::Say(line.to_string());
        };

        match command.trim().to_ascii_lowercase().as_str() {
            "enable" => ChatCommand::Enable,
            "disable" => ChatCommand::Disable,
            "stop" => ChatCommand::Stop,
            "play" => ChatCommand::Replay,
            "clear" => ChatCommand::Clear,
            "help" | "?" => ChatCommand::Help,
            "quit" | "exit" => ChatCommand::Quit,
            other => ChatCommand::Unknown(other.to_string()),
        }
    }
}

/// Render a reply as `[Speaker] text`, with up to [`MAX_SHOWN_TAGS`] tags on
/// the following line.
pub fn format_reply(entry: &CorpusEntry) -> String {
    let mut out = format!("[{}] {}", entry.display_label(), entry.text);
    if !entry.tags.is_empty() {
        let tags: Vec<String> = entry
            .tags
            .iter()
            .take(MAX_SHOWN_TAGS)
            .map(|t| format!("#{}", t))
            .collect();
        out.push_str("\n    ");
        out.push_str(&tags.join(" "));
    }
    out
}
