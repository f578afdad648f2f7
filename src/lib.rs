//! MQ Exporter - Prometheus metrics for message queue depths and handles.
//!
//! Each scrape inquires every configured queue on one queue manager and
//! reports depth, maximum depth, open handle counts and inquiry latency as
//! gauges. A scrape never takes longer than the configured timeout: queues
//! that have not answered by then report `up` 0 for that scrape.
//!
//! The native client binding is supplied by the embedder through the
//! [`Transport`](port::Transport) trait.
//!
//! # Modules
//!
//! - [`domain`] - Queue identities and samples
//! - [`port`] - Transport and metric source traits
//! - [`application`] - Bounded-time collection cycle and the queue collector
//! - [`infrastructure`] - Configuration and the connection manager
//! - [`adapter`] - HTTP exposition endpoint
//! - [`app`] - Composition root
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use mq_exporter::app::App;
//! use mq_exporter::infrastructure::config::settings::Config;
//! # use mq_exporter::port::Transport;
//! # async fn example<T: Transport>(transport: T) -> mq_exporter::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.logging.init();
//!
//! let (_stop, shutdown) = tokio::sync::watch::channel(false);
//! App::run(config, transport, shutdown).await
//! # }
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
