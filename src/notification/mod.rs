//! Candidate notification outbox.
//!
//! Pipeline decisions never call the mail functions directly. Each
//! notification first claims its sent flag on the application, is committed
//! to the email queue, and is then delivered either immediately or by the
//! queue processor with bounded retries.
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
