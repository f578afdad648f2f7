//! Transport-agnostic domain types.

mod queue;

pub use queue::{QueueIdentity, QueueSample};
