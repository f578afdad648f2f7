//! HTTP exposition configuration.

use serde::Deserialize;

/// Where the exporter listens and serves metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Socket address to bind.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Path under which to expose metrics.
    #[serde(default = "default_telemetry_path")]
    pub telemetry_path: String,
}

fn default_listen_address() -> String {
    "0.0.0.0:9873".into()
}

fn default_telemetry_path() -> String {
    "/metrics".into()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            telemetry_path: default_telemetry_path(),
        }
    }
}
