//! Shared `PostgreSQL` connection pooling for the Diesel adapters.
//!
//! Diesel is synchronous, so every adapter runs its queries through
//! [`run_blocking`], which moves the work onto Tokio's blocking pool.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use thiserror::Error;

/// `PostgreSQL` connection pool type shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Failure obtaining a connection or joining the blocking task.
#[derive(Debug, Error)]
pub enum DbAccessError {
    /// No pooled connection could be checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// The blocking task panicked or was cancelled.
    #[error("blocking task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the initial connections cannot be established.
pub fn connect(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_size).build(manager)
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub(crate) async fn run_blocking<F, T, E>(pool: &PgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<DbAccessError> + Send + 'static,
{
    let shared = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = shared.get().map_err(|err| E::from(DbAccessError::from(err)))?;
        f(&mut connection)
    })
    .await
    .map_err(|err| E::from(DbAccessError::from(err)))?
}
