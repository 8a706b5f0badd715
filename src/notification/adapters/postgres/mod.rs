//! `PostgreSQL` adapter for the email queue.

mod models;
mod repository;
mod schema;

pub use repository::PostgresEmailQueue;
