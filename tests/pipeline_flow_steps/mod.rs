//! Step definitions for candidate pipeline scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
