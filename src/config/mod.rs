pub mod cli;
pub mod client;
pub mod model;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use cli::{normalize_args, Cli};
pub use client::session_config;
pub use model::{BotConfig, ClientCertPaths, CtcpConfig, FileConfig, LoggingConfig, SaslCredentials};

pub const DEFAULT_TLS_PORT: u16 = 6697;
pub const DEFAULT_NICK: &str = "botnick";
pub const DEFAULT_MESSAGE: &str = "Hello, IRC!";
pub const PING_INTERVAL: Duration = Duration::from_secs(60);
pub const PING_TIMEOUT: Duration = Duration::from_secs(30);

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ircsend")
        .join("config.toml")
}

/// Load the config file. An explicit path must exist; the default path is
/// optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                return Ok(FileConfig::default());
            }
            path
        }
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: FileConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\naddress = \"irc.libera.chat\"\nsasl_user = \"bot\"\n\n[logging]\nlevel = \"debug\""
        )
        .unwrap();

        let config = load_file_config(Some(file.path())).unwrap();
        assert_eq!(config.server.address.as_deref(), Some("irc.libera.chat"));
        assert_eq!(config.server.sasl_user.as_deref(), Some("bot"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.ctcp.version.starts_with("ircsend "));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_file_config(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_unparsable_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\naddress = ").unwrap();
        assert!(load_file_config(Some(file.path())).is_err());
    }
}
