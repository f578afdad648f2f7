//! Queue-level [`MetricSource`] backed by the connection manager.

use tracing::{error, warn};

use super::ConnectionManager;
use crate::domain::{QueueIdentity, QueueSample};
use crate::error::ReadError;
use crate::port::{MetricSource, Transport};

/// Reads one queue through its manager's current session.
pub struct ManagedQueue<T: Transport> {
    manager: ConnectionManager<T>,
    identity: QueueIdentity,
}

impl<T: Transport> ManagedQueue<T> {
    pub(super) fn new(manager: ConnectionManager<T>, identity: QueueIdentity) -> Self {
        Self { manager, identity }
    }
}

impl<T: Transport> MetricSource for ManagedQueue<T> {
    fn read(&self) -> Result<QueueSample, ReadError> {
        let result = self.manager.read(&self.identity);
        if let Err(e) = &result {
            let queue = self.identity.queue_name();
            match e {
                ReadError::Inquire(ret) => error!(
                    queue,
                    error = %ret,
                    mqcc = ?ret.completion_code,
                    mqrc = ret.reason_code.0,
                    "Error inquiring queue"
                ),
                other => warn!(queue, error = %other, "Queue read failed"),
            }
        }
        result
    }
}
