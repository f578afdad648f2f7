//! Connection manager internal state types.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::port::Transport;

/// Lifecycle state of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    const fn as_u8(self) -> u8 {
        match self {
            Self::Disconnected => 0,
            Self::Connecting => 1,
            Self::Connected => 2,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// Atomically readable [`ConnectionStatus`].
pub(super) struct StatusCell(AtomicU8);

impl StatusCell {
    pub(super) fn new(status: ConnectionStatus) -> Self {
        Self(AtomicU8::new(status.as_u8()))
    }

    pub(super) fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    pub(super) fn set(&self, status: ConnectionStatus) {
        self.0.store(status.as_u8(), Ordering::Release);
    }
}

/// An established connection and the queue handles opened on it.
pub(super) struct Session<T: Transport> {
    pub(super) connection: T::Connection,
    /// Queue name to inquiry handle.
    pub(super) queues: HashMap<String, T::Object>,
}

/// The current session plus the shutdown marker, guarded together so a
/// reconnect cannot install a session after `close()`.
pub(super) struct SessionSlot<T: Transport> {
    pub(super) session: Option<Arc<Session<T>>>,
    pub(super) closed: bool,
}

impl<T: Transport> SessionSlot<T> {
    pub(super) fn empty() -> Self {
        Self {
            session: None,
            closed: false,
        }
    }
}

/// Close every handle of `session`, then disconnect.
///
/// Handle close failures are logged and never stop the disconnect.
pub(super) fn release_session<T: Transport>(transport: &T, session: &Session<T>) {
    for (name, object) in &session.queues {
        match transport.close(object) {
            Ok(()) => info!(queue = %name, "Closed queue"),
            Err(e) => error!(queue = %name, error = %e, "Failed to close queue"),
        }
    }
    match transport.disconnect(&session.connection) {
        Ok(()) => info!("Disconnected from queue manager"),
        Err(e) => error!(error = %e, "Failed to disconnect from queue manager"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_cell() {
        let cell = StatusCell::new(ConnectionStatus::Disconnected);
        for status in [
            ConnectionStatus::Connecting,
            ConnectionStatus::Connected,
            ConnectionStatus::Disconnected,
        ] {
            cell.set(status);
            assert_eq!(cell.get(), status);
        }
    }
}
