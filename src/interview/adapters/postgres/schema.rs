//! Diesel schema for interview persistence.

diesel::table! {
    /// Interview records.
    interviews (id) {
        /// Interview identifier.
        id -> Uuid,
        /// Owning application.
        application_id -> Uuid,
        /// Candidate display name.
        #[max_length = 200]
        candidate_name -> Varchar,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Start time.
        scheduled_for -> Timestamptz,
        /// Portal link.
        interview_link -> Text,
        /// Interview kind.
        #[max_length = 50]
        interview_type -> Varchar,
        /// Completion time.
        completed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Digests of issued portal tokens.
    interview_tokens (id) {
        /// Token identifier.
        id -> Uuid,
        /// Owning application.
        application_id -> Uuid,
        /// Interview the token opens.
        interview_id -> Uuid,
        /// SHA-256 hex digest of the secret.
        #[max_length = 64]
        token_digest -> Varchar,
        /// Expiry time.
        expires_at -> Timestamptz,
        /// Consumption time.
        used_at -> Nullable<Timestamptz>,
        /// Whether the interview was completed with this token.
        interview_completed -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(interview_tokens -> interviews (interview_id));
diesel::allow_tables_to_appear_in_same_query!(interviews, interview_tokens);
