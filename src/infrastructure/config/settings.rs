//! Top-level configuration loading.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::mq::MqConfig;
use super::web::WebConfig;
use crate::error::{ConfigError, Result};

/// Exporter configuration as read from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mq: MqConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn validate(&self) -> Result<()> {
        self.mq.validate()?;

        if !is_listen_address(&self.web.listen_address) {
            return Err(ConfigError::InvalidValue {
                field: "listen_address",
                reason: format!("'{}' is not a host:port address", self.web.listen_address),
            }
            .into());
        }
        if !self.web.telemetry_path.starts_with('/') || self.web.telemetry_path == "/" {
            return Err(ConfigError::InvalidValue {
                field: "telemetry_path",
                reason: "must start with '/' and must not be the root path".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// A socket address, or a host name followed by `:port`. Names are resolved
/// when the listener is bound.
fn is_listen_address(address: &str) -> bool {
    if address.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(char::is_whitespace)
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_address_accepts_socket_addresses_and_host_names() {
        for address in [
            "0.0.0.0:9873",
            "127.0.0.1:0",
            "[::1]:9873",
            "localhost:9873",
            "mq-exporter.local:80",
        ] {
            assert!(is_listen_address(address), "{address} should be accepted");
        }
    }

    #[test]
    fn listen_address_rejects_malformed_values() {
        for address in [
            "not an address",
            "localhost",
            ":9873",
            "localhost:port",
            "localhost:70000",
            "bad host:9873",
        ] {
            assert!(!is_listen_address(address), "{address} should be rejected");
        }
    }
}
