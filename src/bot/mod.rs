//! The bot itself: what to do once connected and how to report traffic.

pub mod action;
pub mod dispatch;
pub mod relay;

use crate::config::BotConfig;
use crate::irc::event::EventKind;
use crate::irc::handler::Handlers;
use crate::logging::ChatLogger;
use dispatch::{ConnectedHandler, MessageLogger};
use std::sync::Arc;

/// Register the connected and message callbacks.
pub fn handlers(config: Arc<BotConfig>) -> Handlers {
    let mut handlers = Handlers::new();
    handlers.add(
        EventKind::Message,
        MessageLogger::new(ChatLogger::from_config(&config.logging)),
    );
    handlers.add(EventKind::Connected, ConnectedHandler::new(config));
    handlers
}
