//! `PostgreSQL` adapters for application and audit persistence.

mod models;
mod repository;
pub(crate) mod schema;

pub use repository::{PgPool, PostgresApplicationRepository};
