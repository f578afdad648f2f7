//! Canonical test configurations.

use crate::domain::QueueIdentity;
use crate::infrastructure::config::mq::MqConfig;

pub const QUEUE_MANAGER: &str = "QM1";
pub const CONN_NAME: &str = "localhost(1414)";
pub const CHANNEL: &str = "DEV.APP.SVRCONN";

/// A valid configuration monitoring `queues`.
pub fn mq(queues: &[&str]) -> MqConfig {
    MqConfig {
        queue_manager: QUEUE_MANAGER.into(),
        conn_name: CONN_NAME.into(),
        channel: CHANNEL.into(),
        timeout_ms: 3000,
        queues: queues.iter().map(|q| (*q).to_string()).collect(),
        ..MqConfig::default()
    }
}

/// Identity of `queue` on the canonical connection.
pub fn identity(queue: &str) -> QueueIdentity {
    QueueIdentity::new(queue, CONN_NAME, QUEUE_MANAGER, CHANNEL)
}
