//! Outbound connection settings: the proxy endpoint and the client
//! certificate handed to the irc client.

pub mod proxy;
pub mod tls;

use std::time::Duration;

pub use proxy::{ProxyError, ProxyUrl};

/// Bound on a proxied connect, covering the proxy handshake and, with TLS,
/// the TLS handshake.
pub const PROXY_TIMEOUT: Duration = Duration::from_secs(10);
