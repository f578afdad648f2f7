//! Inbound adapters exposing the application.

pub mod inbound;
