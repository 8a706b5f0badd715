//! `PostgreSQL` adapter for interviews and tokens.

mod models;
mod repository;
mod schema;

pub use repository::PostgresInterviewRepository;
