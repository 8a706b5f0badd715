//! SynchroHR: candidate pipeline automation.
//!
//! This crate tracks job applications from submission to offer, screens
//! resumes manually or with an analysis model, issues automated interview
//! invitations and delivers candidate emails through a durable outbox.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//! - **Services**: Orchestration of domain rules over ports
//!
//! # Modules
//!
//! - [`pipeline`]: Applications, stages, screening and the audit trail
//! - [`notification`]: Email outbox, queue processing and delivery
//! - [`interview`]: Interview invitations and single-use portal tokens
//! - [`http`]: JSON API over the services
//! - [`config`]: Environment configuration

pub mod config;
pub mod db;
pub mod http;
pub mod interview;
pub mod notification;
pub mod pipeline;
pub mod telemetry;

#[cfg(test)]
mod test_support;
