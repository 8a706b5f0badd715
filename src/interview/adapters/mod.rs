//! Adapter implementations for interview ports.

pub mod memory;
pub mod postgres;
