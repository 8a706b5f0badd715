//! Adapter implementations for pipeline ports.

pub mod memory;
pub mod openai;
pub mod postgres;
