//! Infrastructure layer.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`connection`] - Queue manager connection lifecycle and recovery

pub mod config;
pub mod connection;
