//! Server configuration
//!
//! Layers built-in defaults, an optional `config.toml` and `CCHAT_*`
//! environment variables into one `ServerConfig`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config";
const ENV_PREFIX: &str = "CCHAT";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_CLIENTS: usize = 100;
const DEFAULT_MAX_NICKNAME_LENGTH: usize = 31;
const DEFAULT_BUFFER_SIZE: usize = 2048;
const DEFAULT_OUTBOUND_QUEUE_SIZE: usize = 256;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the listener binds to
    pub bind_address: String,

    /// Listener port, 0 picks an ephemeral port
    pub port: u16,

    /// Registry capacity
    /// Environment: CCHAT_MAX_CLIENTS
    pub max_clients: usize,

    /// Bytes read for the nickname handshake
    pub max_nickname_length: usize,

    /// Bytes read per chat message
    pub buffer_size: usize,

    /// Messages held for a client that is not reading; more are dropped
    pub outbound_queue_size: usize,

    /// Wrap relayed nicknames in ANSI colors
    pub use_colors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            max_clients: DEFAULT_MAX_CLIENTS,
            max_nickname_length: DEFAULT_MAX_NICKNAME_LENGTH,
            buffer_size: DEFAULT_BUFFER_SIZE,
            outbound_queue_size: DEFAULT_OUTBOUND_QUEUE_SIZE,
            use_colors: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from ./config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from `path` (extension optional, file optional)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("max_clients", DEFAULT_MAX_CLIENTS as i64)?
            .set_default("max_nickname_length", DEFAULT_MAX_NICKNAME_LENGTH as i64)?
            .set_default("buffer_size", DEFAULT_BUFFER_SIZE as i64)?
            .set_default("outbound_queue_size", DEFAULT_OUTBOUND_QUEUE_SIZE as i64)?
            .set_default("use_colors", true)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_nickname_length == 0 {
            return Err(ConfigError::Message(
                "max_nickname_length must be greater than 0".into(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        // tokio's bounded channel panics on a zero capacity.
        if self.outbound_queue_size == 0 {
            return Err(ConfigError::Message(
                "outbound_queue_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "cchat-{}-{}.toml",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_reference_limits() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_clients, 100);
        assert_eq!(config.max_nickname_length, 31);
        assert_eq!(config.buffer_size, 2048);
        assert_eq!(config.outbound_queue_size, 256);
        assert_eq!(config.listen_socket(), "0.0.0.0:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load_from("/nonexistent/cchat/config").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert!(config.use_colors);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = temp_config(
            "override",
            "bind_address = \"127.0.0.1\"\nmax_clients = 5\nuse_colors = false\n",
        );

        let config = ServerConfig::load_from(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.max_clients, 5);
        assert!(!config.use_colors);
        assert_eq!(config.buffer_size, 2048);
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let path = temp_config("zero", "max_clients = 0\n");

        let result = ServerConfig::load_from(path.to_str().unwrap());
        fs::remove_file(&path).unwrap();

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_buffers() {
        let config = ServerConfig {
            buffer_size: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            max_nickname_length: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            outbound_queue_size: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
