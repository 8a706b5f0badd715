//! In-memory interview repository for tests and database-less runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::interview::{
    domain::{Interview, InterviewId, InterviewToken, InterviewTokenId, TokenDigest},
    ports::{InterviewRepository, InterviewRepositoryError, InterviewRepositoryResult},
};

/// Thread-safe in-memory interview repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInterviewRepository {
    state: Arc<RwLock<InMemoryInterviewState>>,
}

#[derive(Debug, Default)]
struct InMemoryInterviewState {
    interviews: HashMap<InterviewId, Interview>,
    tokens: HashMap<InterviewTokenId, InterviewToken>,
    digest_index: HashMap<TokenDigest, InterviewTokenId>,
}

impl InMemoryInterviewRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> InterviewRepositoryError {
    InterviewRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl InterviewRepository for InMemoryInterviewRepository {
    async fn store_invitation(
        &self,
        interview: &Interview,
        token: &InterviewToken,
    ) -> InterviewRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.interviews.insert(interview.id(), interview.clone());
        state.digest_index.insert(token.digest().clone(), token.id());
        state.tokens.insert(token.id(), token.clone());
        Ok(())
    }

    async fn find_token_by_digest(
        &self,
        digest: &TokenDigest,
    ) -> InterviewRepositoryResult<Option<InterviewToken>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state
            .digest_index
            .get(digest)
            .and_then(|token_id| state.tokens.get(token_id))
            .cloned())
    }

    async fn consume_token(
        &self,
        id: InterviewTokenId,
        used_at: DateTime<Utc>,
    ) -> InterviewRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let Some(token) = state.tokens.get_mut(&id) else {
            return Ok(false);
        };
        if token.used_at().is_some() {
            return Ok(false);
        }
        token.mark_consumed(used_at);
        Ok(true)
    }

    async fn find_interview(&self, id: InterviewId) -> InterviewRepositoryResult<Option<Interview>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.interviews.get(&id).cloned())
    }

    async fn update_interview(&self, interview: &Interview) -> InterviewRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let stored = state
            .interviews
            .get_mut(&interview.id())
            .ok_or(InterviewRepositoryError::NotFound(interview.id()))?;
        *stored = interview.clone();
        Ok(())
    }
}
