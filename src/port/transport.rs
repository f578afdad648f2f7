//! Transport port to the queue manager.
//!
//! The native client binding lives outside this crate. Anything that can
//! connect to a queue manager, open queues for inquiry and answer attribute
//! inquiries implements [`Transport`]; the connection manager drives it.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Completion code of a transport call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCode {
    Ok,
    Warning,
    Failed,
}

impl CompletionCode {
    const fn as_i32(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Warning => 1,
            Self::Failed => 2,
        }
    }
}

/// Reason code qualifying a [`CompletionCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReasonCode(pub i32);

impl ReasonCode {
    pub const NONE: Self = Self(0);
    pub const CONNECTION_BROKEN: Self = Self(2009);
    pub const NOT_AUTHORIZED: Self = Self(2035);
    pub const Q_MGR_NOT_AVAILABLE: Self = Self(2059);
    pub const UNKNOWN_OBJECT_NAME: Self = Self(2085);
    pub const HOST_NOT_AVAILABLE: Self = Self(2538);

    /// Symbolic name for the codes this crate knows about.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("MQRC_NONE"),
            2009 => Some("MQRC_CONNECTION_BROKEN"),
            2035 => Some("MQRC_NOT_AUTHORIZED"),
            2059 => Some("MQRC_Q_MGR_NOT_AVAILABLE"),
            2085 => Some("MQRC_UNKNOWN_OBJECT_NAME"),
            2538 => Some("MQRC_HOST_NOT_AVAILABLE"),
            _ => None,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Return status of a failed transport call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("MQ call failed: CompCode={}, Reason={reason_code}", .completion_code.as_i32())]
pub struct MqReturn {
    pub completion_code: CompletionCode,
    pub reason_code: ReasonCode,
}

impl MqReturn {
    pub const fn new(completion_code: CompletionCode, reason_code: ReasonCode) -> Self {
        Self {
            completion_code,
            reason_code,
        }
    }

    /// Shorthand for a failed call with the given reason.
    pub const fn failed(reason_code: ReasonCode) -> Self {
        Self::new(CompletionCode::Failed, reason_code)
    }

    /// Whether the underlying connection, not just one object, is gone.
    pub fn is_connection_broken(&self) -> bool {
        self.completion_code == CompletionCode::Failed
            && self.reason_code == ReasonCode::CONNECTION_BROKEN
    }
}

/// Queue attributes requested on every inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selector {
    QueueName,
    MaxDepth,
    CurrentDepth,
    OpenInputCount,
    OpenOutputCount,
}

/// Attribute selectors sent with every queue inquiry.
pub const QUEUE_SELECTORS: [Selector; 5] = [
    Selector::QueueName,
    Selector::MaxDepth,
    Selector::CurrentDepth,
    Selector::OpenInputCount,
    Selector::OpenOutputCount,
];

/// A single attribute value returned by an inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Int(i32),
    Text(String),
}

/// Attribute values keyed by selector.
pub type InquiryValues = HashMap<Selector, AttributeValue>;

/// User id and password authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// TLS client authentication requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuth {
    Required,
    Optional,
}

/// TLS settings for the client channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    pub cipher_spec: String,
    pub key_repository: String,
    pub client_auth: ClientAuth,
}

/// Everything needed to establish a client connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub queue_manager: String,
    pub conn_name: String,
    pub channel: String,
    pub credentials: Option<Credentials>,
    pub tls: Option<TlsOptions>,
}

/// Synchronous client binding to a queue manager.
///
/// Calls may block for as long as the remote side takes to answer.
pub trait Transport: Send + Sync + 'static {
    /// Connection handle.
    type Connection: Send + Sync + 'static;
    /// Opened queue handle.
    type Object: Send + Sync + 'static;

    fn connect(&self, options: &ConnectOptions) -> Result<Self::Connection, MqReturn>;

    /// Open `queue` for inquiry only.
    fn open_inquire(
        &self,
        connection: &Self::Connection,
        queue: &str,
    ) -> Result<Self::Object, MqReturn>;

    fn inquire(
        &self,
        object: &Self::Object,
        selectors: &[Selector],
    ) -> Result<InquiryValues, MqReturn>;

    fn close(&self, object: &Self::Object) -> Result<(), MqReturn>;

    fn disconnect(&self, connection: &Self::Connection) -> Result<(), MqReturn>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_symbolic_reason() {
        let ret = MqReturn::failed(ReasonCode::CONNECTION_BROKEN);
        assert_eq!(
            ret.to_string(),
            "MQ call failed: CompCode=2, Reason=2009 (MQRC_CONNECTION_BROKEN)"
        );
        assert_eq!(
            MqReturn::failed(ReasonCode(9999)).to_string(),
            "MQ call failed: CompCode=2, Reason=9999"
        );
    }

    #[test]
    fn only_failed_2009_is_broken() {
        assert!(MqReturn::failed(ReasonCode::CONNECTION_BROKEN).is_connection_broken());
        assert!(!MqReturn::failed(ReasonCode::Q_MGR_NOT_AVAILABLE).is_connection_broken());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            user: "app".into(),
            password: "passw0rd".into(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("app"));
        assert!(!printed.contains("passw0rd"));
    }
}
