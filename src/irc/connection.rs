//! The session task: drives the irc client's message stream, runs SASL during
//! registration and fans events out to handlers.
//!
//! Keepalive, nickname fallback and CTCP replies are left to the irc client.

use super::client::Client;
use super::event::{parse_ctcp, Event};
use super::handler::Handlers;
use super::sasl::SaslPlain;
use crate::config::SaslCredentials;
use futures::{Stream, StreamExt};
use irc::client::data::Config;
use irc::client::Sender;
use irc::proto::{Command, Message, Response};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Irc(#[from] irc::error::Error),
    #[error("timed out after {0:?} connecting through proxy")]
    Timeout(Duration),
    #[error("server closed the link: {0}")]
    ServerError(String),
    #[error("connection closed by server")]
    Closed,
}

/// Everything needed to open a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub irc: Config,
    pub sasl: Option<SaslCredentials>,
    /// Bound on connection setup; set when connecting through a proxy.
    pub connect_timeout: Option<Duration>,
}

/// Resolves when the connection ends; `Ok` only for a disconnect that
/// followed our own QUIT.
pub type Session = JoinHandle<Result<(), SessionError>>;

/// Where queued commands are handed off for writing.
pub trait Transmit: Send + 'static {
    fn transmit(&self, message: Message) -> irc::error::Result<()>;
}

impl Transmit for Sender {
    fn transmit(&self, message: Message) -> irc::error::Result<()> {
        self.send(message)
    }
}

/// Connect, start registration and spawn the session task.
pub async fn connect(config: SessionConfig, handlers: Handlers) -> Result<Session, SessionError> {
    let nick = config.irc.nickname.clone().unwrap_or_default();

    let pending = irc::client::Client::from_config(config.irc);
    let mut client = match config.connect_timeout {
        Some(limit) => tokio::time::timeout(limit, pending)
            .await
            .map_err(|_| SessionError::Timeout(limit))??,
        None => pending.await?,
    };

    let sasl = config.sasl.map(SaslPlain::new);
    match &sasl {
        Some(negotiation) => {
            for message in negotiation.start(&nick) {
                client.send(message)?;
            }
        }
        None => client.identify()?,
    }

    let sender = client.sender();
    let stream = client.stream()?;
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = Client::new(tx);
    debug!(nick = %nick, sasl = sasl.is_some(), "Registration started");

    Ok(tokio::spawn(run_session(stream, sender, rx, handle, sasl, handlers)))
}

async fn run_session<S, T>(
    mut stream: S,
    transmit: T,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
    client: Client,
    mut sasl: Option<SaslPlain>,
    handlers: Handlers,
) -> Result<(), SessionError>
where
    S: Stream<Item = irc::error::Result<Message>> + Unpin + Send + 'static,
    T: Transmit,
{
    let mut quitting = false;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(_)) | None if quitting => return Ok(()),
                    Some(Err(e)) => return Err(e.into()),
                    None => return Err(SessionError::Closed),
                };
                trace!(line = %message.to_string().trim_end(), "<<");

                if let Command::ERROR(reason) = &message.command {
                    return if quitting {
                        debug!(reason = %reason, "Server acknowledged QUIT");
                        Ok(())
                    } else {
                        Err(SessionError::ServerError(reason.clone()))
                    };
                }

                if let Some(negotiation) = sasl.as_mut() {
                    for reply in negotiation.handle(&message) {
                        transmit.transmit(reply)?;
                    }
                    if negotiation.is_done() {
                        sasl = None;
                    }
                }

                handle_incoming(&message, &client, &handlers);
            }
            Some(message) = outgoing.recv() => {
                if matches!(message.command, Command::QUIT(_)) {
                    quitting = true;
                }
                trace!(line = %message.to_string().trim_end(), ">>");
                transmit.transmit(message)?;
            }
        }
    }
}

/// Turn one server message into handler events.
fn handle_incoming(message: &Message, client: &Client, handlers: &Handlers) {
    match &message.command {
        Command::Response(Response::RPL_WELCOME, args) => {
            let nick = args.first().cloned().unwrap_or_default();
            info!(nick = %nick, "Registered with server");
            handlers.dispatch(client, Event::Connected { nick });
        }
        Command::PRIVMSG(_, text) => match parse_ctcp(text) {
            Some((command, _)) if command != "ACTION" => {
                debug!(
                    from = message.source_nickname().unwrap_or("*"),
                    command = %command,
                    "CTCP query"
                );
            }
            _ => {
                handlers.dispatch(client, Event::Message(message.clone()));
            }
        },
        Command::NOTICE(target, text) => {
            debug!(from = message.source_nickname().unwrap_or("server"), target = %target, "{}", text);
        }
        _ => {}
    }
}
