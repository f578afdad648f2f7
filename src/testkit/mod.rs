//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] - Mock [`MetricSource`](crate::port::MetricSource)
//!   implementations: `StaticSource`, `FailingSource`, `SlowSource`.
//! - [`transport`] - `ScriptedTransport`, an in-memory queue manager.
//! - [`config`] - Canonical test configuration and identities.
//! - [`logs`] - Thread-local log capture.

pub mod config;
pub mod logs;
pub mod source;
pub mod transport;

use tokio::sync::watch;

/// A shutdown receiver that never fires; its sender is already gone.
pub fn never_cancelled() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}
