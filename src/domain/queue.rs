//! Queue identity and metric samples.

use std::fmt;
use std::time::Duration;

/// Identifies a monitored queue and doubles as its metric label set.
///
/// Fields are private so an identity cannot change after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueueIdentity {
    queue_name: String,
    conn_name: String,
    queue_manager: String,
    channel: String,
}

impl QueueIdentity {
    pub fn new(
        queue_name: impl Into<String>,
        conn_name: impl Into<String>,
        queue_manager: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            queue_name: queue_name.into(),
            conn_name: conn_name.into(),
            queue_manager: queue_manager.into(),
            channel: channel.into(),
        }
    }

    /// Identity with only the queue name set.
    pub fn named(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    #[must_use]
    pub fn conn_name(&self) -> &str {
        &self.conn_name
    }

    #[must_use]
    pub fn queue_manager(&self) -> &str {
        &self.queue_manager
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Label values in the order of [`QUEUE_LABELS`](crate::application::collector::QUEUE_LABELS).
    #[must_use]
    pub fn label_values(&self) -> [&str; 4] {
        [
            &self.queue_name,
            &self.conn_name,
            &self.queue_manager,
            &self.channel,
        ]
    }
}

impl fmt::Display for QueueIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}/{}/{}",
            self.queue_name, self.queue_manager, self.conn_name, self.channel
        )
    }
}

/// One successful read of a queue's attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueSample {
    pub identity: QueueIdentity,
    pub current_depth: i32,
    pub max_depth: i32,
    pub open_input_count: i32,
    pub open_output_count: i32,
    /// Wall-clock time spent on the inquiry.
    pub request_duration: Duration,
}

impl QueueSample {
    /// Sample with zeroed counts, mostly useful in tests.
    pub fn empty(identity: QueueIdentity) -> Self {
        Self {
            identity,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_values_follow_label_order() {
        let id = QueueIdentity::new("DEV.QUEUE.1", "localhost(1414)", "QM1", "DEV.APP.SVRCONN");
        assert_eq!(
            id.label_values(),
            ["DEV.QUEUE.1", "localhost(1414)", "QM1", "DEV.APP.SVRCONN"]
        );
    }

    #[test]
    fn display_is_compact() {
        let id = QueueIdentity::new("Q", "host(1414)", "QM1", "CH");
        assert_eq!(id.to_string(), "Q@QM1/host(1414)/CH");
    }
}
