//! Parse errors for notification domain values.

use thiserror::Error;

/// Error returned while parsing email kinds from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown email kind: {0}")]
pub struct ParseEmailKindError(pub String);

/// Error returned while parsing email statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown email status: {0}")]
pub struct ParseEmailStatusError(pub String);
