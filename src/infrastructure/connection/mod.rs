//! Queue manager connection lifecycle.
//!
//! [`ConnectionManager`] owns one client connection and the inquiry handles
//! opened on it, and hands out a [`MetricSource`](crate::port::MetricSource)
//! per configured queue.
//!
//! # Recovery
//!
//! A read that fails with a connection-broken reason schedules one background
//! reconnect and returns its error unchanged. The `reconnecting` flag is taken
//! with a compare-and-swap, so further broken-connection signals arriving
//! while that attempt runs are dropped rather than queued. A failed attempt is
//! not retried on a timer; the stale session stays in place and the next
//! broken-connection signal triggers the next attempt.
//!
//! Reads never wait for a reconnect: they clone the current session under a
//! short read lock and inquire without holding it, and a reconnect swaps in a
//! fully established session only once every queue is open.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::runtime::Handle;
use tracing::{debug, error, info, info_span, warn, Span};

use crate::domain::{QueueIdentity, QueueSample};
use crate::error::{ConnectionError, ReadError, Result};
use crate::infrastructure::config::mq::MqConfig;
use crate::port::{AttributeValue, InquiryValues, Queue, Selector, Transport, QUEUE_SELECTORS};

mod queue;
mod state;

pub use queue::ManagedQueue;
pub use state::ConnectionStatus;

use state::{release_session, Session, SessionSlot, StatusCell};

struct Shared<T: Transport> {
    config: MqConfig,
    transport: T,
    slot: RwLock<SessionSlot<T>>,
    status: StatusCell,
    reconnecting: AtomicBool,
    span: Span,
}

/// Owns the connection to one queue manager.
///
/// Cheap to clone; clones share the same connection.
pub struct ConnectionManager<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for ConnectionManager<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Validate `config`, connect, and open every configured queue for inquiry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if validation fails, or a connection
    /// error if connecting or opening any queue fails. Handles opened before
    /// the failure are closed and the connection released.
    pub fn open(config: MqConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let span = info_span!(
            "mq_connection",
            conn_name = %config.conn_name,
            channel = %config.channel,
            queue_manager = %config.queue_manager,
        );
        let manager = Self {
            shared: Arc::new(Shared {
                config,
                transport,
                slot: RwLock::new(SessionSlot::empty()),
                status: StatusCell::new(ConnectionStatus::Disconnected),
                reconnecting: AtomicBool::new(false),
                span,
            }),
        };

        let _entered = manager.shared.span.enter();
        manager.shared.status.set(ConnectionStatus::Connecting);
        match manager.establish() {
            Ok(session) => {
                let queues = session.queues.len();
                manager.shared.slot.write().session = Some(Arc::new(session));
                manager.shared.status.set(ConnectionStatus::Connected);
                info!(queues, "Connected to queue manager");
            }
            Err(e) => {
                manager.shared.status.set(ConnectionStatus::Disconnected);
                error!(error = %e, "Failed to connect to queue manager");
                return Err(e.into());
            }
        }
        drop(_entered);

        Ok(manager)
    }

    /// Connect and open every configured queue.
    fn establish(&self) -> std::result::Result<Session<T>, ConnectionError> {
        let config = &self.shared.config;
        let transport = &self.shared.transport;

        let connection = transport
            .connect(&config.connect_options())
            .map_err(|source| ConnectionError::Connect {
                queue_manager: config.queue_manager.clone(),
                source,
            })?;

        let mut session = Session {
            connection,
            queues: HashMap::with_capacity(config.queues.len()),
        };
        for name in &config.queues {
            if session.queues.contains_key(name) {
                debug!(queue = %name, "Queue configured twice, opening once");
                continue;
            }
            match transport.open_inquire(&session.connection, name) {
                Ok(object) => {
                    debug!(queue = %name, "Opened queue for inquiry");
                    session.queues.insert(name.clone(), object);
                }
                Err(source) => {
                    release_session(transport, &session);
                    return Err(ConnectionError::OpenQueue {
                        queue: name.clone(),
                        source,
                    });
                }
            }
        }
        Ok(session)
    }

    /// Inquire the current attributes of `identity`'s queue.
    ///
    /// A connection-broken failure schedules a background reconnect; the
    /// error is returned either way.
    pub fn read(&self, identity: &QueueIdentity) -> std::result::Result<QueueSample, ReadError> {
        let session = self
            .shared
            .slot
            .read()
            .session
            .clone()
            .ok_or(ReadError::NotConnected)?;
        let object = session
            .queues
            .get(identity.queue_name())
            .ok_or_else(|| ReadError::UnknownQueue(identity.queue_name().to_string()))?;

        let start = Instant::now();
        let values = match self.shared.transport.inquire(object, &QUEUE_SELECTORS) {
            Ok(values) => values,
            Err(ret) => {
                let err = ReadError::from(ret);
                if err.is_connection_broken() {
                    self.schedule_reconnect();
                }
                return Err(err);
            }
        };
        let request_duration = start.elapsed();

        Ok(QueueSample {
            identity: identity.clone(),
            current_depth: int_attribute(&values, Selector::CurrentDepth)?,
            max_depth: int_attribute(&values, Selector::MaxDepth)?,
            open_input_count: int_attribute(&values, Selector::OpenInputCount)?,
            open_output_count: int_attribute(&values, Selector::OpenOutputCount)?,
            request_duration,
        })
    }

    /// Take the `reconnecting` flag unless the manager is closed.
    ///
    /// Runs under the slot read lock so it cannot interleave with `close()`.
    fn try_begin_reconnect(&self) -> ReconnectGate {
        let slot = self.shared.slot.read();
        if slot.closed {
            return ReconnectGate::Closed;
        }
        let won = self
            .shared
            .reconnecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if !won {
            return ReconnectGate::InProgress;
        }
        self.shared.status.set(ConnectionStatus::Connecting);
        ReconnectGate::Begun
    }

    fn finish_reconnect(&self) {
        self.shared.reconnecting.store(false, Ordering::Release);
    }

    /// Run one reconnect attempt off the caller's thread.
    fn schedule_reconnect(&self) {
        let _entered = self.shared.span.enter();
        match self.try_begin_reconnect() {
            ReconnectGate::Begun => {}
            ReconnectGate::InProgress => {
                debug!("Reconnect already in progress, dropping connection-broken signal");
                return;
            }
            ReconnectGate::Closed => return,
        }
        warn!("Connection broken, scheduling reconnect");

        let manager = self.clone();
        let attempt = move || {
            let _entered = manager.shared.span.enter();
            let _ = manager.reconnect_now();
            manager.finish_reconnect();
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(attempt);
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("mq-reconnect".into())
                    .spawn(attempt);
                if let Err(e) = spawned {
                    error!(error = %e, "Failed to spawn reconnect thread");
                    self.finish_reconnect();
                }
            }
        }
    }

    /// Re-run the open sequence and swap in the new session.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::ReconnectInProgress`] if another attempt is
    /// running, [`ConnectionError::Closed`] after [`close`](Self::close),
    /// otherwise any connect or open failure. On failure the manager stays
    /// `Connecting` with its previous handles.
    pub fn reconnect(&self) -> std::result::Result<(), ConnectionError> {
        let _entered = self.shared.span.enter();
        match self.try_begin_reconnect() {
            ReconnectGate::Begun => {}
            ReconnectGate::InProgress => return Err(ConnectionError::ReconnectInProgress),
            ReconnectGate::Closed => return Err(ConnectionError::Closed),
        }
        let result = self.reconnect_now();
        self.finish_reconnect();
        result
    }

    fn reconnect_now(&self) -> std::result::Result<(), ConnectionError> {
        let session = self.establish().map_err(|e| {
            error!(error = %e, "Failed re-connect");
            e
        })?;

        let mut slot = self.shared.slot.write();
        if slot.closed {
            self.shared.status.set(ConnectionStatus::Disconnected);
            drop(slot);
            info!("Connection closed while reconnecting, releasing new session");
            release_session(&self.shared.transport, &session);
            return Ok(());
        }
        // The stale handles belong to a broken connection; they are dropped
        // without close calls.
        slot.session = Some(Arc::new(session));
        self.shared.status.set(ConnectionStatus::Connected);
        drop(slot);

        info!("Reconnected to queue manager");
        Ok(())
    }

    /// Close every open queue, then disconnect.
    ///
    /// Close failures are logged; the disconnect is always attempted. Later
    /// reads fail with [`ReadError::NotConnected`]. Calling it again is a no-op.
    pub fn close(&self) {
        let _entered = self.shared.span.enter();
        let session = {
            let mut slot = self.shared.slot.write();
            slot.closed = true;
            slot.session.take()
        };
        self.shared.status.set(ConnectionStatus::Disconnected);

        match session {
            Some(session) => release_session(&self.shared.transport, &session),
            None => debug!("Connection already closed"),
        }
    }

    /// One [`Queue`] per configured queue, in configuration order.
    pub fn queues(&self) -> Vec<Queue> {
        let config = &self.shared.config;
        let mut seen = Vec::with_capacity(config.queues.len());
        for name in &config.queues {
            if !seen.contains(&name) {
                seen.push(name);
            }
        }

        seen.into_iter()
            .map(|name| {
                let identity = QueueIdentity::new(
                    name.as_str(),
                    config.conn_name.as_str(),
                    config.queue_manager.as_str(),
                    config.channel.as_str(),
                );
                let source = ManagedQueue::new(self.clone(), identity.clone());
                Queue::new(identity, Arc::new(source))
            })
            .collect()
    }

    /// Per-cycle collection timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.shared.config.timeout()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.status.get()
    }

    /// Whether a reconnect attempt is in flight.
    #[must_use]
    pub fn is_reconnecting(&self) -> bool {
        self.shared.reconnecting.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn config(&self) -> &MqConfig {
        &self.shared.config
    }
}

enum ReconnectGate {
    Begun,
    InProgress,
    Closed,
}

impl<T: Transport> Drop for Shared<T> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut();
        if let Some(session) = slot.session.take() {
            debug!("Connection manager dropped without close, releasing session");
            release_session(&self.transport, &session);
        }
    }
}

fn int_attribute(values: &InquiryValues, selector: Selector) -> std::result::Result<i32, ReadError> {
    match values.get(&selector) {
        Some(AttributeValue::Int(value)) => Ok(*value),
        _ => Err(ReadError::MissingAttribute(selector)),
    }
}
