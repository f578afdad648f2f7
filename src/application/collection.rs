//! Bounded-time collection cycle.
//!
//! One cycle reads every queue once, in order, on a single blocking task and
//! streams samples back through a one-slot channel. The caller waits for the
//! next sample, the end of the list, the deadline or shutdown, whichever
//! comes first, and returns whatever arrived by then.
//!
//! Reads are issued sequentially, so under time pressure configuration order
//! is priority order: a queue that hangs past the deadline hides every queue
//! after it for that cycle. A hung read is abandoned, never interrupted; its
//! task notices the deadline once the read returns and exits without
//! delivering anything.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::QueueSample;
use crate::port::Queue;

/// Read `queues` within `timeout`, returning the samples that arrived in time.
///
/// Failed reads are skipped. `shutdown` flipping to `true` ends the cycle
/// early the same way the deadline does; a closed shutdown channel never
/// cancels.
pub async fn collect(
    queues: &[Queue],
    timeout: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Vec<QueueSample> {
    if queues.is_empty() {
        return Vec::new();
    }

    debug!(
        queues = queues.len(),
        timeout_ms = timeout.as_millis() as u64,
        "Starting collection cycle"
    );
    let deadline = Instant::now() + timeout;
    let (tx, mut rx) = mpsc::channel(1);
    let reader = ReadCycle {
        queues: queues.to_vec(),
        deadline: deadline.into_std(),
        shutdown: shutdown.clone(),
        tx,
    };
    tokio::task::spawn_blocking(move || reader.run());

    let mut samples = Vec::with_capacity(queues.len());
    let expired = tokio::time::sleep_until(deadline);
    tokio::pin!(expired);
    let cancelled = cancelled(&mut shutdown);
    tokio::pin!(cancelled);

    loop {
        tokio::select! {
            biased;

            () = &mut expired => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    collected = samples.len(),
                    queues = queues.len(),
                    "Deadline exceeded while waiting for queue metrics"
                );
                break;
            }
            () = &mut cancelled => {
                warn!(
                    collected = samples.len(),
                    queues = queues.len(),
                    "Collection cancelled while waiting for queue metrics"
                );
                break;
            }
            received = rx.recv() => match received {
                Some(sample) => {
                    let id = &sample.identity;
                    debug!(
                        queue = id.queue_name(),
                        connection = id.conn_name(),
                        queue_manager = id.queue_manager(),
                        channel = id.channel(),
                        "Got queue metrics"
                    );
                    samples.push(sample);
                }
                None => break,
            },
        }
    }

    samples
}

/// Resolves once `shutdown` is `true`; never if its sender is gone.
async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// State moved onto the blocking task for one cycle.
struct ReadCycle {
    queues: Vec<Queue>,
    deadline: std::time::Instant,
    shutdown: watch::Receiver<bool>,
    tx: mpsc::Sender<QueueSample>,
}

impl ReadCycle {
    /// Read each queue in turn until the list ends or the cycle is over.
    ///
    /// Dropping `self` at the end closes the channel, which is how the
    /// waiting side learns the cycle completed.
    fn run(self) {
        for (index, queue) in self.queues.iter().enumerate() {
            if self.is_over() {
                debug!(
                    skipped = self.queues.len() - index,
                    "Collection cycle over, not reading remaining queues"
                );
                return;
            }
            let Ok(sample) = queue.read() else {
                continue;
            };
            if self.is_over() || self.tx.blocking_send(sample).is_err() {
                return;
            }
        }
    }

    fn is_over(&self) -> bool {
        std::time::Instant::now() >= self.deadline
            || *self.shutdown.borrow()
            || self.tx.is_closed()
    }
}
