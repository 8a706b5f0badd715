//! Port for the remote mail-sending functions.

use crate::notification::domain::{EmailKind, EmailPayload};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for gateway operations.
pub type NotificationGatewayResult<T> = Result<T, NotificationGatewayError>;

/// Delivers one email through its mail function.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Invokes [`EmailKind::function_name`] with `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationGatewayError`] when the function cannot be
    /// reached or answers with a non-success status.
    async fn send(&self, kind: EmailKind, payload: &EmailPayload)
    -> NotificationGatewayResult<()>;
}

/// Errors returned by notification gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum NotificationGatewayError {
    /// The request could not be sent.
    #[error("transport error calling {function}: {cause}")]
    Transport {
        /// Remote function name.
        function: &'static str,
        /// Underlying transport failure.
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The function answered with a non-success status.
    #[error("{function} returned status {status}: {message}")]
    Rejected {
        /// Remote function name.
        function: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },
}

impl NotificationGatewayError {
    /// Wraps a transport error for `function`.
    pub fn transport(
        function: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            function,
            cause: Arc::new(err),
        }
    }
}
