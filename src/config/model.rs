//! Configuration data model.
//!
//! [`FileConfig`] mirrors the optional TOML file; every field has a default so
//! a partial file works. [`BotConfig`] is the resolved, immutable view that the
//! rest of the program reads.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::cli::Cli;
use super::{DEFAULT_NICK, DEFAULT_TLS_PORT, PING_INTERVAL, PING_TIMEOUT};

/// Root of the TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ctcp: CtcpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-level defaults. Any of these can be overridden by a flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<bool>,
    pub skip_tls_verify: Option<bool>,
    pub nick: Option<String>,
    pub sasl_user: Option<String>,
    pub sasl_pass: Option<String>,
    pub proxy: Option<String>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub channel: Option<String>,
}

/// CTCP (Client-To-Client Protocol) replies. The irc client answers
/// VERSION, PING, TIME, SOURCE and USERINFO queries on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CtcpConfig {
    /// Reply to CTCP VERSION.
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for CtcpConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
        }
    }
}

/// Diagnostics and transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Append received messages to per-target daily files.
    #[serde(default)]
    pub transcripts: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            transcripts: false,
            log_dir: default_log_dir(),
        }
    }
}

/// SASL PLAIN credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct SaslCredentials {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Paths of a client certificate and its private key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
    pub tls: bool,
    pub skip_tls_verify: bool,
    pub client_cert: Option<ClientCertPaths>,
    pub proxy: Option<String>,
}

/// Fully resolved startup configuration. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub server: ServerSettings,
    /// Used as nickname, username and realname.
    pub nick: String,
    pub sasl: Option<SaslCredentials>,
    pub channel: String,
    /// Explicit message target; `None` means the channel.
    pub target: Option<String>,
    pub message: String,
    pub send_raw: bool,
    pub interactive: bool,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub ctcp: CtcpConfig,
    pub logging: LoggingConfig,
}

impl BotConfig {
    /// Merge flags over the file config over built-in defaults.
    pub fn resolve(cli: Cli, file: FileConfig) -> Result<Self> {
        let srv = file.server;

        let address = non_empty(cli.address)
            .or(non_empty(srv.address))
            .unwrap_or_default();
        if address.is_empty() {
            bail!("No server address given (use --address or set server.address in the config file)");
        }

        let nick = non_empty(cli.nick)
            .or(non_empty(srv.nick))
            .unwrap_or_else(|| DEFAULT_NICK.to_string());

        let sasl_user = cli.sasl_user.or(srv.sasl_user).unwrap_or_default();
        let sasl_pass = cli.sasl_pass.or(srv.sasl_pass).unwrap_or_default();
        let sasl = if !sasl_user.is_empty() && !sasl_pass.is_empty() {
            Some(SaslCredentials {
                user: sasl_user,
                pass: sasl_pass,
            })
        } else {
            None
        };

        let cert = cli.cert.or(srv.cert).filter(|p| !p.as_os_str().is_empty());
        let key = cli.key.or(srv.key).filter(|p| !p.as_os_str().is_empty());
        let client_cert = match (cert, key) {
            (Some(cert), Some(key)) => Some(ClientCertPaths { cert, key }),
            (None, None) => None,
            _ => bail!("--cert and --key must be given together"),
        };

        let mut logging = file.logging;
        if let Some(dir) = non_empty(cli.log_dir) {
            logging.transcripts = true;
            logging.log_dir = dir;
        }

        Ok(Self {
            server: ServerSettings {
                address,
                port: cli.port.or(srv.port).unwrap_or(DEFAULT_TLS_PORT),
                tls: cli.tls.or(srv.tls).unwrap_or(true),
                skip_tls_verify: cli.skip_tls_verify.or(srv.skip_tls_verify).unwrap_or(false),
                client_cert,
                proxy: non_empty(cli.proxy).or(non_empty(srv.proxy)),
            },
            nick,
            sasl,
            channel: non_empty(cli.channel)
                .or(non_empty(srv.channel))
                .unwrap_or_default(),
            target: non_empty(cli.target),
            message: cli.message,
            send_raw: cli.send_raw,
            interactive: cli.interactive,
            ping_interval: PING_INTERVAL,
            ping_timeout: PING_TIMEOUT,
            ctcp: file.ctcp,
            logging,
        })
    }

    /// The explicit target if set, else the channel.
    pub fn resolved_target(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.channel)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn default_version() -> String {
    format!("ircsend {}", env!("CARGO_PKG_VERSION"))
}
fn default_level() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "~/.local/share/ircsend/logs".to_string()
}
