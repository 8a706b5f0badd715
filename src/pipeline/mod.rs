//! Candidate pipeline for SynchroHR.
//!
//! This module covers resume intake, manual and AI-assisted screening, offer
//! extension, and the audit trail of stage changes. It follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
