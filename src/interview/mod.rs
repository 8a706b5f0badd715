//! Automated interview invitations and completion.
//!
//! Selected candidates receive a single-use portal token. Only the SHA-256
//! digest of the token is stored; completing the interview consumes the
//! token with one conditional write.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
