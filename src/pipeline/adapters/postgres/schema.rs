//! Diesel schema for application persistence.

diesel::table! {
    /// Candidate application records.
    applications (id) {
        /// Application identifier.
        id -> Uuid,
        /// Candidate display name.
        #[max_length = 200]
        candidate_name -> Varchar,
        /// Candidate email address.
        #[max_length = 320]
        email -> Varchar,
        /// Optional phone number.
        #[max_length = 50]
        phone -> Nullable<Varchar>,
        /// Applied position title.
        #[max_length = 255]
        position_applied -> Varchar,
        /// Optional job role reference.
        job_role_id -> Nullable<Uuid>,
        /// Optional stored resume location.
        file_url -> Nullable<Text>,
        /// Optional structured resume extraction.
        parsed_resume -> Nullable<Jsonb>,
        /// Intake channel.
        #[max_length = 50]
        source -> Varchar,
        /// Screening status derived from the stage.
        #[max_length = 50]
        screening_status -> Varchar,
        /// Pipeline stage.
        #[max_length = 50]
        pipeline_stage -> Varchar,
        /// Whether HR made the latest decision.
        manual_override -> Bool,
        /// Optional model score.
        ai_score -> Nullable<Int4>,
        /// Optional model analysis.
        ai_analysis -> Nullable<Jsonb>,
        /// Selection email dispatched.
        selection_email_sent -> Bool,
        /// Rejection email dispatched.
        rejection_email_sent -> Bool,
        /// Interview invitation issued.
        interview_invitation_sent -> Bool,
        /// Interview scheduled email dispatched.
        interview_scheduled_email_sent -> Bool,
        /// Interview completed email dispatched.
        interview_completed_email_sent -> Bool,
        /// Interview scheduling timestamp.
        interview_scheduled_at -> Nullable<Timestamptz>,
        /// Optimistic concurrency revision.
        revision -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only pipeline transition log.
    pipeline_audit_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Application the entry belongs to.
        application_id -> Uuid,
        /// Recorded action.
        #[max_length = 100]
        action -> Varchar,
        /// Stage before the transition.
        #[max_length = 50]
        from_stage -> Varchar,
        /// Stage after the transition.
        #[max_length = 50]
        to_stage -> Varchar,
        /// Whether automation caused the transition.
        automation_triggered -> Bool,
        /// Acting user.
        #[max_length = 255]
        performed_by -> Nullable<Varchar>,
        /// Free-form details.
        details -> Jsonb,
        /// Entry timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(pipeline_audit_logs -> applications (application_id));
diesel::allow_tables_to_appear_in_same_query!(applications, pipeline_audit_logs);
