//! Queue gauges refreshed by one collection cycle per scrape.

use std::time::Duration;

use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts, Registry};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use super::collection;
use crate::domain::QueueSample;
use crate::error::Result;
use crate::port::Queue;

pub const NAMESPACE: &str = "mq";
pub const SUBSYSTEM: &str = "queue";

/// Label names, in the order of [`QueueIdentity::label_values`](crate::domain::QueueIdentity::label_values).
pub const QUEUE_LABELS: [&str; 4] = ["name", "connection", "queue_manager", "channel"];

struct QueueGauges {
    registry: Registry,
    up: GaugeVec,
    current_depth: GaugeVec,
    max_depth: GaugeVec,
    open_input_count: GaugeVec,
    open_output_count: GaugeVec,
    request_duration: GaugeVec,
}

impl QueueGauges {
    fn new() -> Result<Self> {
        let registry = Registry::new();
        let gauge = |name: &str, help: &str| -> Result<GaugeVec> {
            let opts = Opts::new(name, help)
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM);
            let vec = GaugeVec::new(opts, &QUEUE_LABELS)?;
            registry.register(Box::new(vec.clone()))?;
            Ok(vec)
        };

        let up = gauge("up", "Was the last scrape of the queue successful.")?;
        let current_depth = gauge("current_depth", "Current number of messages on queue.")?;
        let max_depth = gauge("max_depth", "Maximum number of messages allowed on queue.")?;
        let open_input_count = gauge(
            "open_input_count",
            "Number of MQOPEN calls that have the queue open for input.",
        )?;
        let open_output_count = gauge(
            "open_output_count",
            "Number of MQOPEN calls that have the queue open for output.",
        )?;
        let request_duration = gauge(
            "request_duration_seconds",
            "Duration for request queue metrics in seconds.",
        )?;

        Ok(Self {
            registry,
            up,
            current_depth,
            max_depth,
            open_input_count,
            open_output_count,
            request_duration,
        })
    }

    /// Mark every configured queue down and drop all other series.
    fn reset(&self, queues: &[Queue]) {
        for queue in queues {
            self.up
                .with_label_values(&queue.identity().label_values())
                .set(0.0);
        }
        self.current_depth.reset();
        self.max_depth.reset();
        self.open_input_count.reset();
        self.open_output_count.reset();
        self.request_duration.reset();
    }

    fn record(&self, sample: &QueueSample) {
        let labels = sample.identity.label_values();
        self.up.with_label_values(&labels).set(1.0);
        self.current_depth
            .with_label_values(&labels)
            .set(f64::from(sample.current_depth));
        self.max_depth
            .with_label_values(&labels)
            .set(f64::from(sample.max_depth));
        self.open_input_count
            .with_label_values(&labels)
            .set(f64::from(sample.open_input_count));
        self.open_output_count
            .with_label_values(&labels)
            .set(f64::from(sample.open_output_count));
        self.request_duration
            .with_label_values(&labels)
            .set(sample.request_duration.as_secs_f64());
    }
}

/// Exposes `mq_queue_*` gauges for a fixed set of queues.
///
/// Each [`collect`](Self::collect) runs one collection cycle. Queues missing
/// from the cycle report `up` 0 and no other series. Concurrent scrapes are
/// serialized.
pub struct QueueCollector {
    queues: Vec<Queue>,
    timeout: Duration,
    shutdown: watch::Receiver<bool>,
    gauges: Mutex<QueueGauges>,
}

impl QueueCollector {
    /// # Errors
    ///
    /// Returns an error if the gauge descriptors cannot be built.
    pub fn new(
        queues: Vec<Queue>,
        timeout: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        Ok(Self {
            queues,
            timeout,
            shutdown,
            gauges: Mutex::new(QueueGauges::new()?),
        })
    }

    /// Run one cycle and return the refreshed metric families.
    pub async fn collect(&self) -> Vec<MetricFamily> {
        let gauges = self.gauges.lock().await;
        gauges.reset(&self.queues);

        let samples = collection::collect(&self.queues, self.timeout, self.shutdown.clone()).await;
        for sample in &samples {
            gauges.record(sample);
        }
        debug!(
            collected = samples.len(),
            queues = self.queues.len(),
            "Queue metrics refreshed"
        );

        gauges.registry.gather()
    }

    #[must_use]
    pub fn queues(&self) -> &[Queue] {
        &self.queues
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
