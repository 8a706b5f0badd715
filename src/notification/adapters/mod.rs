//! Adapter implementations for notification ports.

pub mod http;
pub mod memory;
pub mod postgres;
pub mod recording;
