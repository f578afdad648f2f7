//! Application services: the collection cycle and the gauges it feeds.

pub mod collection;
pub mod collector;

pub use collection::collect;
pub use collector::QueueCollector;
