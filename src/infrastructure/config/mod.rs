//! Infrastructure configuration modules.

pub mod logging;
pub mod mq;
pub mod settings;
pub mod web;
