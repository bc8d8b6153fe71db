//! Stdin relay for interactive mode.

use crate::irc::client::{Client, ClientError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Forward `reader` line by line until end of input. In raw mode each line is
/// sent as a protocol line; otherwise as a PRIVMSG to `target`, skipping
/// empty lines. Per-line failures are logged and skipped. Returns the number
/// of lines sent.
pub async fn relay_lines<R>(reader: R, client: &Client, target: &str, raw: bool) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut sent = 0;
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                break;
            }
        };

        let result = if raw {
            client.send_raw(&line)
        } else if line.is_empty() {
            continue;
        } else {
            client.send_privmsg(target, &line)
        };

        match result {
            Ok(()) => sent += 1,
            Err(ClientError::Closed) => {
                warn!("Connection closed, stopping relay");
                return sent;
            }
            Err(e) => warn!(error = %e, line = %line, "Failed to send line"),
        }
    }
    debug!(sent, "Relay finished");
    info!("Input closed, connection stays open until interrupted");
    sent
}

#[cfg(test)]
mod tests {
    use super::*;
    use irc::proto::Command;

    #[tokio::test]
    async fn test_chat_mode_skips_empty_lines() {
        let (client, mut rx) = Client::test_pair();
        let input: &[u8] = b"hello\n\nworld\n";
        assert_eq!(relay_lines(input, &client, "#rust", false).await, 2);

        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "hello".into())
        );
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "world".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_raw_mode_continues_past_bad_line() {
        let (client, mut rx) = Client::test_pair();
        let input: &[u8] = b"JOIN #rust\r\n\nPRIVMSG #rust :hi\n";
        assert_eq!(relay_lines(input, &client, "ignored", true).await, 2);

        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::JOIN("#rust".into(), None, None)
        );
        assert_eq!(
            rx.try_recv().unwrap().command,
            Command::PRIVMSG("#rust".into(), "hi".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_raw_mode_sends_no_privmsg() {
        let (client, mut rx) = Client::test_pair();
        let input: &[u8] = b"NICK other\n";
        relay_lines(input, &client, "#rust", true).await;
        assert_eq!(rx.try_recv().unwrap().command, Command::NICK("other".into()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stops_when_connection_closed() {
        let (client, rx) = Client::test_pair();
        drop(rx);
        let input: &[u8] = b"one\ntwo\n";
        assert_eq!(relay_lines(input, &client, "#rust", false).await, 0);
    }
}
