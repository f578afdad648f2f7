//! Scripted [`Transport`] for connection manager tests.
//!
//! [`ScriptedTransport`] is a cheap-to-clone handle: tests keep one clone to
//! script failures and inspect call counts while the manager owns another.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::port::{
    AttributeValue, ConnectOptions, InquiryValues, MqReturn, ReasonCode, Selector, Transport,
};

/// Attribute values reported for a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueValues {
    pub current_depth: i32,
    pub max_depth: i32,
    pub open_input_count: i32,
    pub open_output_count: i32,
}

/// Connection handle issued by [`ScriptedTransport`].
#[derive(Debug)]
pub struct ScriptedConnection {
    pub id: u64,
}

/// Queue handle issued by [`ScriptedTransport`].
#[derive(Debug)]
pub struct ScriptedObject {
    pub name: String,
    pub connection: u64,
}

#[derive(Default)]
struct Script {
    connect_results: VecDeque<Result<(), MqReturn>>,
    connect_delay: Duration,
    open_failures: HashMap<String, MqReturn>,
    inquire_failures: HashMap<String, MqReturn>,
    close_failures: HashSet<String>,
    values: HashMap<String, QueueValues>,
    last_options: Option<ConnectOptions>,
}

#[derive(Default)]
struct Counters {
    connects: AtomicU32,
    opens: AtomicU32,
    inquiries: AtomicU32,
    closes: AtomicU32,
    disconnects: AtomicU32,
    open_handles: AtomicI64,
    next_connection: AtomicU64,
    /// Connections with an id below this report a broken connection.
    broken_below: AtomicU64,
}

/// In-memory queue manager with scripted failures and call counters.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
    counters: Arc<Counters>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results for upcoming `connect` calls; `Ok(())` once exhausted.
    pub fn with_connect_results(self, results: Vec<Result<(), MqReturn>>) -> Self {
        self.script.lock().connect_results = results.into();
        self
    }

    pub fn push_connect_result(&self, result: Result<(), MqReturn>) {
        self.script.lock().connect_results.push_back(result);
    }

    /// Delay every subsequent `connect` call by `delay`.
    pub fn set_connect_delay(&self, delay: Duration) {
        self.script.lock().connect_delay = delay;
    }

    pub fn fail_open(&self, queue: &str, ret: MqReturn) {
        self.script.lock().open_failures.insert(queue.to_string(), ret);
    }

    pub fn fail_inquire(&self, queue: &str, ret: MqReturn) {
        self.script.lock().inquire_failures.insert(queue.to_string(), ret);
    }

    pub fn clear_inquire_failure(&self, queue: &str) {
        self.script.lock().inquire_failures.remove(queue);
    }

    pub fn fail_close(&self, queue: &str) {
        self.script.lock().close_failures.insert(queue.to_string());
    }

    pub fn set_values(&self, queue: &str, values: QueueValues) {
        self.script.lock().values.insert(queue.to_string(), values);
    }

    /// Break every connection established so far.
    ///
    /// Inquiries on their handles fail with `MQRC_CONNECTION_BROKEN`;
    /// connections made afterwards are healthy.
    pub fn break_connection(&self) {
        let next = self.counters.next_connection.load(Ordering::SeqCst);
        self.counters.broken_below.store(next + 1, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> u32 {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> u32 {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub fn inquire_count(&self) -> u32 {
        self.counters.inquiries.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.counters.closes.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> u32 {
        self.counters.disconnects.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet closed, across all connections.
    pub fn open_handles(&self) -> i64 {
        self.counters.open_handles.load(Ordering::SeqCst)
    }

    /// Options passed to the most recent `connect` call.
    pub fn last_connect_options(&self) -> Option<ConnectOptions> {
        self.script.lock().last_options.clone()
    }
}

impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;
    type Object = ScriptedObject;

    fn connect(&self, options: &ConnectOptions) -> Result<ScriptedConnection, MqReturn> {
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        let (result, delay) = {
            let mut script = self.script.lock();
            script.last_options = Some(options.clone());
            (
                script.connect_results.pop_front().unwrap_or(Ok(())),
                script.connect_delay,
            )
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        result?;
        let id = self.counters.next_connection.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ScriptedConnection { id })
    }

    fn open_inquire(
        &self,
        connection: &ScriptedConnection,
        queue: &str,
    ) -> Result<ScriptedObject, MqReturn> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(ret) = self.script.lock().open_failures.get(queue) {
            return Err(*ret);
        }
        self.counters.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedObject {
            name: queue.to_string(),
            connection: connection.id,
        })
    }

    fn inquire(
        &self,
        object: &ScriptedObject,
        selectors: &[Selector],
    ) -> Result<InquiryValues, MqReturn> {
        self.counters.inquiries.fetch_add(1, Ordering::SeqCst);
        if object.connection < self.counters.broken_below.load(Ordering::SeqCst) {
            return Err(MqReturn::failed(ReasonCode::CONNECTION_BROKEN));
        }

        let script = self.script.lock();
        if let Some(ret) = script.inquire_failures.get(&object.name) {
            return Err(*ret);
        }
        let values = script.values.get(&object.name).copied().unwrap_or_default();

        Ok(selectors
            .iter()
            .map(|selector| {
                let value = match selector {
                    Selector::QueueName => AttributeValue::Text(object.name.clone()),
                    Selector::MaxDepth => AttributeValue::Int(values.max_depth),
                    Selector::CurrentDepth => AttributeValue::Int(values.current_depth),
                    Selector::OpenInputCount => AttributeValue::Int(values.open_input_count),
                    Selector::OpenOutputCount => AttributeValue::Int(values.open_output_count),
                };
                (*selector, value)
            })
            .collect())
    }

    fn close(&self, object: &ScriptedObject) -> Result<(), MqReturn> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        if self.script.lock().close_failures.contains(&object.name) {
            return Err(MqReturn::failed(ReasonCode::CONNECTION_BROKEN));
        }
        self.counters.open_handles.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self, _connection: &ScriptedConnection) -> Result<(), MqReturn> {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
