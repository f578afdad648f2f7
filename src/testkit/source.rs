//! Mock [`MetricSource`] implementations for testing.
//!
//! - [`StaticSource`] - returns a fixed sample immediately.
//! - [`FailingSource`] - always returns the same error.
//! - [`SlowSource`] - blocks for a fixed time, then returns its sample.
//!
//! The free functions wrap each in a [`Queue`] bound to the given identity.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{QueueIdentity, QueueSample};
use crate::error::ReadError;
use crate::port::{MetricSource, Queue};

/// Returns a fixed sample and counts reads.
pub struct StaticSource {
    sample: QueueSample,
    reads: AtomicU32,
}

impl StaticSource {
    pub fn new(sample: QueueSample) -> Self {
        Self {
            sample,
            reads: AtomicU32::new(0),
        }
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }
}

impl MetricSource for StaticSource {
    fn read(&self) -> Result<QueueSample, ReadError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.sample.clone())
    }
}

pub struct FailingSource {
    error: ReadError,
}

impl FailingSource {
    pub fn new(error: ReadError) -> Self {
        Self { error }
    }
}

impl MetricSource for FailingSource {
    fn read(&self) -> Result<QueueSample, ReadError> {
        Err(self.error.clone())
    }
}

/// Sleeps on the calling thread before answering.
pub struct SlowSource {
    delay: Duration,
    sample: QueueSample,
}

impl SlowSource {
    pub fn new(delay: Duration, sample: QueueSample) -> Self {
        Self { delay, sample }
    }
}

impl MetricSource for SlowSource {
    fn read(&self) -> Result<QueueSample, ReadError> {
        std::thread::sleep(self.delay);
        Ok(self.sample.clone())
    }
}

/// Queue whose reads succeed with an otherwise empty sample.
pub fn succeeding(identity: &QueueIdentity) -> Queue {
    succeeding_with(identity, QueueSample::default())
}

/// Queue whose reads succeed with `sample`, relabelled to `identity`.
pub fn succeeding_with(identity: &QueueIdentity, mut sample: QueueSample) -> Queue {
    sample.identity = identity.clone();
    Queue::new(identity.clone(), Arc::new(StaticSource::new(sample)))
}

pub fn failing(identity: &QueueIdentity, error: ReadError) -> Queue {
    Queue::new(identity.clone(), Arc::new(FailingSource::new(error)))
}

/// Queue whose reads take `delay`.
pub fn slow(identity: &QueueIdentity, delay: Duration) -> Queue {
    let sample = QueueSample::empty(identity.clone());
    Queue::new(identity.clone(), Arc::new(SlowSource::new(delay, sample)))
}
