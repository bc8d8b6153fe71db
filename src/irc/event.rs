use irc::proto::{Command, Message};
use std::fmt;

/// Split a `\x01COMMAND arg\x01` body into an upper-cased command and its
/// argument. Returns `None` for ordinary text.
pub fn parse_ctcp(text: &str) -> Option<(String, &str)> {
    let body = text.strip_prefix('\x01')?.strip_suffix('\x01')?;
    let mut parts = body.splitn(2, ' ');
    let command = parts.next()?.to_uppercase();
    if command.is_empty() {
        return None;
    }
    Some((command, parts.next().unwrap_or("")))
}

/// Event kinds handlers can register for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Registration with the server completed.
    Connected,
    /// A chat message (PRIVMSG) arrived.
    Message,
}

#[derive(Debug, Clone)]
pub enum Event {
    Connected { nick: String },
    Message(Message),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected { .. } => EventKind::Connected,
            Event::Message(_) => EventKind::Message,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Connected { nick } => write!(f, "connected as {}", nick),
            Event::Message(message) => {
                let from = message.source_nickname().unwrap_or("*");
                match &message.command {
                    Command::PRIVMSG(target, text) => match parse_ctcp(text) {
                        Some((command, action)) if command == "ACTION" => {
                            write!(f, "[{}] * {} {}", target, from, action)
                        }
                        _ => write!(f, "[{}] <{}> {}", target, from, text),
                    },
                    _ => write!(f, "{}", message.to_string().trim_end()),
                }
            }
        }
    }
}
