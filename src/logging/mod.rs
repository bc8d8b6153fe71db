//! Diagnostic logging setup and chat transcripts.
//!
//! When transcripts are enabled, received chat messages are appended to daily
//! log files organized by channel or query partner. Files are named
//! `<target>_<date>.log` and stored in the configured log directory (default:
//! `~/.local/share/ircsend/logs/`).

use crate::config::LoggingConfig;
use chrono::Local;
use irc::proto::{Command, Message};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over `level`.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Writes chat messages to per-channel/query daily log files.
///
/// File handles are cached per file name for the lifetime of the logger.
pub struct ChatLogger {
    log_dir: PathBuf,
    file_handles: HashMap<String, File>,
}

impl ChatLogger {
    /// `None` when transcripts are disabled.
    pub fn from_config(config: &LoggingConfig) -> Option<Self> {
        config.transcripts.then(|| Self::new(expand_home(&config.log_dir)))
    }

    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            file_handles: HashMap::new(),
        }
    }

    /// Append a PRIVMSG to its transcript. Other commands are ignored.
    pub fn log_message(&mut self, message: &Message) -> io::Result<()> {
        let Command::PRIVMSG(target, text) = &message.command else {
            return Ok(());
        };
        let sender = message.source_nickname().unwrap_or("*");
        // Queries are filed under the other party.
        let file_target = if target.starts_with(['#', '&']) {
            target.as_str()
        } else {
            sender
        };

        let timestamp = Local::now().format("%H:%M:%S");
        let line = match action_text(text) {
            Some(action) => format!("[{}] * {} {}", timestamp, sender, action),
            None => format!("[{}] <{}> {}", timestamp, sender, text),
        };

        let date = Local::now().format("%Y-%m-%d");
        let filename = format!("{}_{}.log", sanitize(file_target), date);
        let handle = match self.file_handles.entry(filename) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                fs::create_dir_all(&self.log_dir)?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(self.log_dir.join(entry.key()))?;
                entry.insert(file)
            }
        };
        writeln!(handle, "{}", line)
    }
}

fn action_text(text: &str) -> Option<&str> {
    text.strip_prefix("\x01ACTION ")
        .and_then(|rest| rest.strip_suffix('\x01'))
}

fn sanitize(target: &str) -> String {
    target
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect()
}

fn expand_home(dir: &str) -> PathBuf {
    match dir.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(dir)),
        None => PathBuf::from(dir),
    }
}
