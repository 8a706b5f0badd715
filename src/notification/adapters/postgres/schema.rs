//! Diesel schema for the email queue.

diesel::table! {
    /// Outbox of candidate emails.
    email_queue (id) {
        /// Email identifier.
        id -> Uuid,
        /// Owning application.
        application_id -> Uuid,
        /// Email kind.
        #[max_length = 50]
        email_kind -> Varchar,
        /// Mail function request body.
        payload -> Jsonb,
        /// Delivery status.
        #[max_length = 20]
        status -> Varchar,
        /// Failed delivery attempts.
        retry_count -> Int4,
        /// Earliest delivery time.
        scheduled_for -> Timestamptz,
        /// Delivery time.
        sent_at -> Nullable<Timestamptz>,
        /// Last delivery error.
        error_message -> Nullable<Text>,
        /// When a processor claimed the email for delivery.
        claimed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
