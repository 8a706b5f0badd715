//! Repository port for application persistence, audit history, and sent
//! flag claims.

use crate::pipeline::domain::{
    ApplicationId, Application, AuditEntry, NotificationFlag, ScreeningStatus,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for application repository operations.
pub type ApplicationRepositoryResult<T> = Result<T, ApplicationRepositoryError>;

/// Application persistence contract.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Stores a newly submitted application.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::DuplicateApplication`] when the
    /// identifier already exists.
    async fn store(&self, application: &Application) -> ApplicationRepositoryResult<()>;

    /// Persists a state change together with its audit entry.
    ///
    /// The write only succeeds when the stored revision still equals
    /// `application.revision()`; the stored revision is then advanced by one.
    /// Sent flags are never written by this call.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::NotFound`] when the application
    /// does not exist or [`ApplicationRepositoryError::Conflict`] when another
    /// writer committed first.
    async fn record_transition(
        &self,
        application: &Application,
        entry: &AuditEntry,
    ) -> ApplicationRepositoryResult<()>;

    /// Finds an application by identifier.
    ///
    /// Returns `None` when the application does not exist.
    async fn find_by_id(&self, id: ApplicationId)
    -> ApplicationRepositoryResult<Option<Application>>;

    /// Lists applications, newest first, optionally filtered by screening
    /// status.
    async fn list(
        &self,
        status: Option<ScreeningStatus>,
    ) -> ApplicationRepositoryResult<Vec<Application>>;

    /// Returns the audit trail for an application, oldest first.
    async fn audit_trail(&self, id: ApplicationId) -> ApplicationRepositoryResult<Vec<AuditEntry>>;

    /// Raises `flag` if it is not yet raised.
    ///
    /// Returns `true` for exactly one caller per application and flag.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationRepositoryError::NotFound`] when the application
    /// does not exist.
    async fn claim_notification(
        &self,
        id: ApplicationId,
        flag: NotificationFlag,
    ) -> ApplicationRepositoryResult<bool>;
}

/// Errors returned by application repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ApplicationRepositoryError {
    /// An application with the same identifier already exists.
    #[error("duplicate application identifier: {0}")]
    DuplicateApplication(ApplicationId),

    /// The application was not found.
    #[error("application not found: {0}")]
    NotFound(ApplicationId),

    /// The stored revision moved on since the application was loaded.
    #[error("application {id} was modified concurrently (expected revision {expected})")]
    Conflict {
        /// Application identifier.
        id: ApplicationId,
        /// Revision the writer loaded.
        expected: u64,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ApplicationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
