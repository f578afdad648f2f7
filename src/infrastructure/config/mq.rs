//! Queue manager connection configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::port::{ClientAuth, ConnectOptions, Credentials, TlsOptions};

/// Per-cycle collection timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Connection settings and the queues to monitor.
#[derive(Clone, Default, Deserialize)]
pub struct MqConfig {
    #[serde(default)]
    pub queue_manager: String,
    #[serde(default)]
    pub conn_name: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssl_cipher_spec: String,
    #[serde(default)]
    pub key_repository: String,
    /// Collection cycle timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub queues: Vec<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl MqConfig {
    /// Collection cycle timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Check mandatory and paired fields and the timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::with_capacity(3);
        if self.queue_manager.is_empty() {
            missing.push("queue_manager");
        }
        if self.conn_name.is_empty() {
            missing.push("conn_name");
        }
        if self.channel.is_empty() {
            missing.push("channel");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields { fields: missing });
        }

        if self.user.is_empty() != self.password.is_empty() {
            return Err(ConfigError::Unpaired {
                first: "user",
                second: "password",
            });
        }
        if self.ssl_cipher_spec.is_empty() != self.key_repository.is_empty() {
            return Err(ConfigError::Unpaired {
                first: "ssl_cipher_spec",
                second: "key_repository",
            });
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::NonPositive { field: "timeout" });
        }

        Ok(())
    }

    /// Client connection options derived from this configuration.
    ///
    /// TLS client authentication is optional; the key repository supplies a
    /// certificate only when the server asks for one.
    pub fn connect_options(&self) -> ConnectOptions {
        let credentials = (!self.user.is_empty()).then(|| Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
        });
        let tls = (!self.ssl_cipher_spec.is_empty()).then(|| TlsOptions {
            cipher_spec: self.ssl_cipher_spec.clone(),
            key_repository: self.key_repository.clone(),
            client_auth: ClientAuth::Optional,
        });

        ConnectOptions {
            queue_manager: self.queue_manager.clone(),
            conn_name: self.conn_name.clone(),
            channel: self.channel.clone(),
            credentials,
            tls,
        }
    }
}

impl fmt::Debug for MqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("MqConfig")
            .field("queue_manager", &self.queue_manager)
            .field("conn_name", &self.conn_name)
            .field("channel", &self.channel)
            .field("user", &self.user)
            .field("password", &password)
            .field("ssl_cipher_spec", &self.ssl_cipher_spec)
            .field("key_repository", &self.key_repository)
            .field("timeout_ms", &self.timeout_ms)
            .field("queues", &self.queues)
            .finish()
    }
}
