//! Metric source port.

use std::fmt;
use std::sync::Arc;

use crate::domain::{QueueIdentity, QueueSample};
use crate::error::ReadError;

/// Reads one queue's current metrics.
///
/// Reads are synchronous and may take as long as the remote side does; the
/// collection engine runs them off the async workers.
pub trait MetricSource: Send + Sync {
    fn read(&self) -> Result<QueueSample, ReadError>;
}

/// A queue identity bound to the source that reads it.
#[derive(Clone)]
pub struct Queue {
    identity: QueueIdentity,
    source: Arc<dyn MetricSource>,
}

impl Queue {
    pub fn new(identity: QueueIdentity, source: Arc<dyn MetricSource>) -> Self {
        Self { identity, source }
    }

    #[must_use]
    pub fn identity(&self) -> &QueueIdentity {
        &self.identity
    }

    pub fn read(&self) -> Result<QueueSample, ReadError> {
        self.source.read()
    }
}

impl fmt::Debug for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
