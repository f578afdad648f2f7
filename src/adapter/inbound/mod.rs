//! Inbound adapters.
//!
//! - [`http`] - Prometheus text exposition over HTTP

pub mod http;
