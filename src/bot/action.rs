/// A protocol-level step the bot takes once it is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Join { channel: String },
    Privmsg { target: String, text: String },
    /// A line sent verbatim, bypassing message construction.
    Raw { line: String },
    Quit { reason: Option<String> },
    /// Spawn the stdin relay against `target`.
    StartRelay { target: String, raw: bool },
}
