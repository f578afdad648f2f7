use std::path::PathBuf;

use thiserror::Error;

use crate::port::transport::{MqReturn, Selector};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing mandatory fields: {}", quote_all(.fields))]
    MissingFields { fields: Vec<&'static str> },

    #[error("requires both '{first}' and '{second}'")]
    Unpaired {
        first: &'static str,
        second: &'static str,
    },

    #[error("requires strict positive '{field}'")]
    NonPositive { field: &'static str },

    #[error("configuration file '{}' does not exist or is not readable", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn quote_all(fields: &[&'static str]) -> String {
    fields
        .iter()
        .map(|f| format!("'{f}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors establishing the connection or opening queue handles.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("failed to connect to queue manager '{queue_manager}': {source}")]
    Connect {
        queue_manager: String,
        #[source]
        source: MqReturn,
    },

    #[error("failed to open queue '{queue}': {source}")]
    OpenQueue {
        queue: String,
        #[source]
        source: MqReturn,
    },

    #[error("connect still in progress")]
    ReconnectInProgress,

    #[error("connection is closed")]
    Closed,
}

/// Per-queue read failures. Absorbed by the collection cycle.
#[derive(Error, Debug, Clone)]
pub enum ReadError {
    #[error("inquire failed: {0}")]
    Inquire(#[from] MqReturn),

    #[error("attribute {0:?} missing from inquire response")]
    MissingAttribute(Selector),

    #[error("queue '{0}' has no open handle")]
    UnknownQueue(String),

    #[error("not connected to queue manager")]
    NotConnected,
}

impl ReadError {
    /// Whether this failure means the whole connection is unusable.
    pub fn is_connection_broken(&self) -> bool {
        matches!(self, ReadError::Inquire(ret) if ret.is_connection_broken())
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::transport::{CompletionCode, ReasonCode};

    #[test]
    fn missing_fields_message_quotes_each_field() {
        let err = ConfigError::MissingFields {
            fields: vec!["queue_manager", "conn_name", "channel"],
        };
        assert_eq!(
            err.to_string(),
            "missing mandatory fields: 'queue_manager', 'conn_name', 'channel'"
        );
    }

    #[test]
    fn read_error_classifies_broken_connection() {
        let broken = ReadError::Inquire(MqReturn::new(
            CompletionCode::Failed,
            ReasonCode::CONNECTION_BROKEN,
        ));
        assert!(broken.is_connection_broken());

        let warning = ReadError::Inquire(MqReturn::new(
            CompletionCode::Warning,
            ReasonCode::CONNECTION_BROKEN,
        ));
        assert!(!warning.is_connection_broken());
        assert!(!ReadError::NotConnected.is_connection_broken());
    }
}
