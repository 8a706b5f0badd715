//! Gateway that logs and records emails instead of sending them.
//!
//! Used when no functions endpoint is configured, and by tests that need to
//! observe deliveries or inject failures.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::notification::{
    domain::{EmailKind, EmailPayload},
    ports::{NotificationGateway, NotificationGatewayError, NotificationGatewayResult},
};

/// One recorded delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEmail {
    /// Email kind.
    pub kind: EmailKind,
    /// Request body.
    pub payload: EmailPayload,
}

#[derive(Debug, Default)]
struct RecordingState {
    sent: Vec<RecordedEmail>,
    failures_remaining: u32,
}

/// Recording [`NotificationGateway`].
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationGateway {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingNotificationGateway {
    /// Creates a gateway that accepts every email.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` sends fail.
    pub fn fail_next(&self, count: u32) {
        if let Ok(mut state) = self.state.lock() {
            state.failures_remaining = count;
        }
    }

    /// Returns the emails accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<RecordedEmail> {
        self.state
            .lock()
            .map(|state| state.sent.clone())
            .unwrap_or_default()
    }

    /// Returns how many accepted emails were of `kind`.
    #[must_use]
    pub fn count_of(&self, kind: EmailKind) -> usize {
        self.sent().iter().filter(|email| email.kind == kind).count()
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotificationGateway {
    async fn send(
        &self,
        kind: EmailKind,
        payload: &EmailPayload,
    ) -> NotificationGatewayResult<()> {
        let mut state = self.state.lock().map_err(|err| {
            NotificationGatewayError::transport(
                kind.function_name(),
                std::io::Error::other(err.to_string()),
            )
        })?;
        if state.failures_remaining > 0 {
            state.failures_remaining -= 1;
            return Err(NotificationGatewayError::Rejected {
                function: kind.function_name(),
                status: 503,
                message: "simulated delivery failure".to_owned(),
            });
        }
        info!(
            function = kind.function_name(),
            recipient = %payload.candidate_email,
            "recorded candidate email"
        );
        state.sent.push(RecordedEmail {
            kind,
            payload: payload.clone(),
        });
        Ok(())
    }
}
