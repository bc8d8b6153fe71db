//! Command handle for a live session.
//!
//! Commands are queued on an unbounded channel and handed to the irc client in
//! order by the session task, so a [`Client`] can be cloned freely and used
//! from any task.

use irc::proto::error::ProtocolError;
use irc::proto::{Command, Message};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection is closed")]
    Closed,
    #[error("invalid raw line: {0}")]
    InvalidLine(#[from] ProtocolError),
    #[error("raw line has no command")]
    NoCommand,
}

#[derive(Debug, Clone)]
pub struct Client {
    tx: mpsc::UnboundedSender<Message>,
}

impl Client {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    /// A client whose outgoing queue is handed back to the caller.
    #[cfg(test)]
    pub fn test_pair() -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn send<M: Into<Message>>(&self, message: M) -> Result<(), ClientError> {
        self.tx.send(message.into()).map_err(|_| ClientError::Closed)
    }

    pub fn send_join(&self, channel: &str) -> Result<(), ClientError> {
        self.send(Command::JOIN(channel.to_string(), None, None))
    }

    pub fn send_privmsg(&self, target: &str, text: &str) -> Result<(), ClientError> {
        self.send(Command::PRIVMSG(target.to_string(), single_line(text)))
    }

    /// Parse `line` as a protocol message and queue it unchanged.
    pub fn send_raw(&self, line: &str) -> Result<(), ClientError> {
        let message: Message = line.trim_end_matches(['\r', '\n']).parse()?;
        let blank = match &message.command {
            Command::Raw(command, _) => command.trim().is_empty(),
            _ => false,
        };
        if blank || message.to_string().trim().is_empty() {
            return Err(ClientError::NoCommand);
        }
        self.send(message)
    }

    pub fn send_quit(&self, reason: Option<&str>) -> Result<(), ClientError> {
        self.send(Command::QUIT(reason.map(str::to_string)))
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_are_queued_in_order() {
        let (client, mut rx) = Client::test_pair();
        client.send_join("#rust").unwrap();
        client.send_privmsg("#rust", "hello").unwrap();
        client.send_quit(None).unwrap();

        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::JOIN("#rust".into(), None, None)
        );
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "hello".into())
        );
        assert_eq!(rx.try_recv().unwrap().command, Command::QUIT(None));
    }

    #[test]
    fn test_privmsg_cannot_inject_lines() {
        let (client, mut rx) = Client::test_pair();
        client
            .send_privmsg("#rust", "hi\r\nQUIT :pwned")
            .unwrap();
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "hi  QUIT :pwned".into())
        );
    }

    #[test]
    fn test_send_raw() {
        let (client, mut rx) = Client::test_pair();
        client.send_raw("PRIVMSG #rust :raw hello\r\n").unwrap();
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "raw hello".into())
        );

        assert!(matches!(client.send_raw(""), Err(ClientError::InvalidLine(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_raw_rejects_prefix_only_lines() {
        let (client, mut rx) = Client::test_pair();
        for line in [":", ":irc.example.org", ": \r\n"] {
            assert!(client.send_raw(line).is_err(), "accepted {:?}", line);
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_close() {
        let (client, rx) = Client::test_pair();
        drop(rx);
        assert!(matches!(client.send_join("#rust"), Err(ClientError::Closed)));
    }
}
