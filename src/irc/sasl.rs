//! SASL PLAIN during registration.
//!
//! [`SaslPlain`] is a pure state machine: it is fed every incoming message and
//! answers with the messages to send back. Negotiation always ends with
//! `CAP END`, whether authentication succeeded or not.

use crate::config::SaslCredentials;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use irc::proto::{CapSubCommand, Capability, Command, Message, Response};
use tracing::{info, warn};

/// AUTHENTICATE payloads are split into chunks of this many bytes.
const SASL_CHUNK: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// `CAP REQ :sasl` sent, waiting for ACK/NAK.
    Negotiating,
    /// `AUTHENTICATE PLAIN` sent.
    Authenticating,
    Done,
}

#[derive(Debug)]
pub struct SaslPlain {
    credentials: SaslCredentials,
    state: State,
}

impl SaslPlain {
    pub fn new(credentials: SaslCredentials) -> Self {
        Self {
            credentials,
            state: State::Negotiating,
        }
    }

    /// Opening messages: the capability request, then NICK and USER so the
    /// server holds registration until `CAP END`.
    pub fn start(&self, nick: &str) -> Vec<Message> {
        vec![
            Command::CAP(
                None,
                CapSubCommand::REQ,
                None,
                Some(Capability::Sasl.as_ref().to_string()),
            )
            .into(),
            Command::NICK(nick.to_string()).into(),
            Command::USER(nick.to_string(), "0".to_string(), nick.to_string()).into(),
        ]
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    pub fn handle(&mut self, message: &Message) -> Vec<Message> {
        let mut replies = Vec::new();
        match &message.command {
            Command::CAP(a, sub, b, c) if self.state == State::Negotiating => {
                let mentions_sasl = [a, b, c]
                    .into_iter()
                    .flatten()
                    .any(|field| field.split_whitespace().any(|cap| cap.eq_ignore_ascii_case("sasl")));
                match sub {
                    CapSubCommand::ACK if mentions_sasl => {
                        self.state = State::Authenticating;
                        replies.push(Command::AUTHENTICATE("PLAIN".to_string()).into());
                    }
                    CapSubCommand::NAK => {
                        warn!("Server refused the sasl capability, continuing without SASL");
                        self.finish(&mut replies);
                    }
                    _ => {}
                }
            }
            Command::AUTHENTICATE(data) if self.state == State::Authenticating && data == "+" => {
                replies.extend(
                    plain_payload(&self.credentials)
                        .into_iter()
                        .map(|chunk| Command::AUTHENTICATE(chunk).into()),
                );
            }
            Command::Response(Response::RPL_LOGGEDIN, args) => {
                info!(account = args.get(2).map(String::as_str).unwrap_or(""), "Logged in");
            }
            Command::Response(Response::RPL_SASLSUCCESS, _) if self.state == State::Authenticating => {
                info!("SASL authentication succeeded");
                self.finish(&mut replies);
            }
            Command::Response(
                resp @ (Response::ERR_NICKLOCKED
                | Response::ERR_SASLFAIL
                | Response::ERR_SASLTOOLONG
                | Response::ERR_SASLABORT
                | Response::ERR_SASLALREADY),
                args,
            ) if self.state == State::Authenticating => {
                warn!(
                    code = ?resp,
                    reason = args.last().map(String::as_str).unwrap_or(""),
                    "SASL authentication failed, continuing unauthenticated"
                );
                self.finish(&mut replies);
            }
            _ => {}
        }
        replies
    }

    fn finish(&mut self, replies: &mut Vec<Message>) {
        self.state = State::Done;
        replies.push(Command::CAP(None, CapSubCommand::END, None, None).into());
    }
}

/// `authzid\0authcid\0password`, base64-encoded and split for AUTHENTICATE.
/// A payload that ends on a chunk boundary is terminated with `+`.
fn plain_payload(creds: &SaslCredentials) -> Vec<String> {
    let raw = format!("{0}\0{0}\0{1}", creds.user, creds.pass);
    let encoded = BASE64.encode(raw);
    let mut chunks: Vec<String> = encoded
        .as_bytes()
        .chunks(SASL_CHUNK)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    if encoded.len() % SASL_CHUNK == 0 {
        chunks.push("+".to_string());
    }
    chunks
}
