//! Single-use interview portal tokens.

use super::{InterviewDomainError, InterviewId};
use crate::pipeline::domain::ApplicationId;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an interview token row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterviewTokenId(Uuid);

impl InterviewTokenId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for InterviewTokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InterviewTokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secret handed to the candidate inside the portal link. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);

impl TokenSecret {
    /// Generates a fresh random secret.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps a secret presented by a candidate.
    #[must_use]
    pub fn from_presented(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_owned())
    }

    /// Returns the secret as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digest stored in place of the secret.
    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(&self.0)
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// Lowercase hex SHA-256 of a [`TokenSecret`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Hashes `secret`.
    #[must_use]
    pub fn of(secret: &str) -> Self {
        let hash = Sha256::digest(secret.as_bytes());
        Self(hash.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Wraps a digest loaded from storage.
    #[must_use]
    pub const fn from_stored(hex: String) -> Self {
        Self(hex)
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored record of an issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewToken {
    id: InterviewTokenId,
    application_id: ApplicationId,
    interview_id: InterviewId,
    digest: TokenDigest,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
    interview_completed: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTokenData {
    /// Persisted identifier.
    pub id: InterviewTokenId,
    /// Owning application.
    pub application_id: ApplicationId,
    /// Interview the token opens.
    pub interview_id: InterviewId,
    /// Secret digest.
    pub digest: TokenDigest,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Consumption time.
    pub used_at: Option<DateTime<Utc>>,
    /// Whether the interview was completed with this token.
    pub interview_completed: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl InterviewToken {
    /// Issues a token for `secret`, valid for `ttl`.
    #[must_use]
    pub fn issue(
        application_id: ApplicationId,
        interview_id: InterviewId,
        secret: &TokenSecret,
        ttl: Duration,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: InterviewTokenId::new(),
            application_id,
            interview_id,
            digest: secret.digest(),
            expires_at: timestamp + ttl,
            used_at: None,
            interview_completed: false,
            created_at: timestamp,
        }
    }

    /// Reconstructs a token from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTokenData) -> Self {
        Self {
            id: data.id,
            application_id: data.application_id,
            interview_id: data.interview_id,
            digest: data.digest,
            expires_at: data.expires_at,
            used_at: data.used_at,
            interview_completed: data.interview_completed,
            created_at: data.created_at,
        }
    }

    /// Returns the token identifier.
    #[must_use]
    pub const fn id(&self) -> InterviewTokenId {
        self.id
    }

    /// Returns the owning application.
    #[must_use]
    pub const fn application_id(&self) -> ApplicationId {
        self.application_id
    }

    /// Returns the interview the token opens.
    #[must_use]
    pub const fn interview_id(&self) -> InterviewId {
        self.interview_id
    }

    /// Returns the secret digest.
    #[must_use]
    pub const fn digest(&self) -> &TokenDigest {
        &self.digest
    }

    /// Returns the expiry time.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns when the token was consumed.
    #[must_use]
    pub const fn used_at(&self) -> Option<DateTime<Utc>> {
        self.used_at
    }

    /// Returns whether the interview was completed with this token.
    #[must_use]
    pub const fn interview_completed(&self) -> bool {
        self.interview_completed
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Checks that the token is unused and unexpired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`InterviewDomainError::TokenAlreadyUsed`] or
    /// [`InterviewDomainError::TokenExpired`].
    pub fn ensure_usable(&self, now: DateTime<Utc>) -> Result<(), InterviewDomainError> {
        if self.used_at.is_some() {
            return Err(InterviewDomainError::TokenAlreadyUsed);
        }
        if now >= self.expires_at {
            return Err(InterviewDomainError::TokenExpired);
        }
        Ok(())
    }

    /// Records consumption of the token by a completed interview.
    pub(crate) const fn mark_consumed(&mut self, used_at: DateTime<Utc>) {
        self.used_at = Some(used_at);
        self.interview_completed = true;
    }
}
