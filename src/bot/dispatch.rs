//! Callbacks for the two events the bot reacts to.

use super::action::Action;
use super::relay;
use crate::config::BotConfig;
use crate::irc::client::{Client, ClientError};
use crate::irc::event::Event;
use crate::irc::handler::EventHandler;
use crate::logging::ChatLogger;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info, warn};

/// Decide what to send once registered.
pub fn plan_connected(config: &BotConfig) -> Vec<Action> {
    let mut actions = Vec::new();

    if config.send_raw {
        actions.push(Action::Raw {
            line: config.message.clone(),
        });
    } else {
        let target = config.resolved_target();
        if config.target.is_none() || target.starts_with('#') {
            actions.push(Action::Join {
                channel: target.to_string(),
            });
        }
        actions.push(Action::Privmsg {
            target: target.to_string(),
            text: config.message.clone(),
        });
    }

    if config.interactive {
        actions.push(Action::StartRelay {
            target: config.resolved_target().to_string(),
            raw: config.send_raw,
        });
    } else {
        actions.push(Action::Quit { reason: None });
    }
    actions
}

pub struct ConnectedHandler {
    config: Arc<BotConfig>,
}

impl ConnectedHandler {
    pub fn new(config: Arc<BotConfig>) -> Self {
        Self { config }
    }
}

impl EventHandler for ConnectedHandler {
    fn handle(&self, client: &Client, event: &Event) {
        if let Event::Connected { nick } = event {
            info!(nick = %nick, "Connected");
        }
        for action in plan_connected(&self.config) {
            if let Err(e) = execute(client, &action) {
                error!(error = %e, action = ?action, "Action failed");
            }
        }
    }
}

fn execute(client: &Client, action: &Action) -> Result<(), ClientError> {
    match action {
        Action::Join { channel } => client.send_join(channel),
        Action::Privmsg { target, text } => client.send_privmsg(target, text),
        Action::Raw { line } => client.send_raw(line),
        Action::Quit { reason } => client.send_quit(reason.as_deref()),
        Action::StartRelay { target, raw } => {
            let client = client.clone();
            let target = target.clone();
            let raw = *raw;
            // Never joined: interactive shutdown exits the process.
            let _relay = tokio::spawn(async move {
                let stdin = BufReader::new(tokio::io::stdin());
                relay::relay_lines(stdin, &client, &target, raw).await;
            });
            Ok(())
        }
    }
}

/// Logs every received chat message, and appends it to a transcript when
/// enabled.
pub struct MessageLogger {
    transcripts: Option<Mutex<ChatLogger>>,
}

impl MessageLogger {
    pub fn new(transcripts: Option<ChatLogger>) -> Self {
        Self {
            transcripts: transcripts.map(Mutex::new),
        }
    }
}

impl EventHandler for MessageLogger {
    fn handle(&self, _client: &Client, event: &Event) {
        let Event::Message(message) = event else {
            return;
        };
        info!("{}", event);
        if let Some(logger) = &self.transcripts {
            if let Err(e) = logger.lock().log_message(message) {
                warn!(error = %e, "Failed to write transcript");
            }
        }
    }
}
