//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`MetricSource`] - Reads one queue's metrics; consumed by the collection engine
//! - [`Transport`] - Client binding to the queue manager; consumed by the connection manager

pub mod source;
pub mod transport;

pub use source::{MetricSource, Queue};
pub use transport::{
    AttributeValue, ClientAuth, CompletionCode, ConnectOptions, Credentials, InquiryValues,
    MqReturn, ReasonCode, Selector, TlsOptions, Transport, QUEUE_SELECTORS,
};
