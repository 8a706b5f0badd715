//! Shared database setup for `PostgreSQL` adapter tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use synchrohr::db::{self, PgPool};
use synchrohr::pipeline::{
    adapters::postgres::PostgresApplicationRepository,
    domain::{
        ApplicantProfile, Application, ApplicationSource, CandidateEmail, CandidateName,
    },
    ports::ApplicationRepository,
};
use tokio::runtime::Runtime;

/// SQL creating every table the adapters use.
const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_pipeline_tables/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "synchrohr_test_template";

/// Pool size large enough for the concurrent claim tests.
const POOL_SIZE: u32 = 4;

/// Creates a runtime for driving the async adapters from sync tests.
///
/// # Errors
///
/// Returns an error when the runtime cannot be built.
pub fn test_runtime() -> eyre::Result<Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Database cloned from the template, dropped when the value goes away.
pub struct TestDatabase {
    cluster: &'static TestCluster,
    name: String,
    pool: PgPool,
}

impl TestDatabase {
    /// Creates a fresh database from the migrated template.
    ///
    /// # Errors
    ///
    /// Returns an error when the template or the database cannot be created.
    pub fn create(cluster: &'static TestCluster) -> eyre::Result<Self> {
        ensure_template(cluster)?;
        let name = format!("test_{}", uuid::Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| eyre::eyre!("{e}"))?;
        let pool = db::connect(&cluster.connection().database_url(&name), POOL_SIZE)?;
        Ok(Self {
            cluster,
            name,
            pool,
        })
    }

    /// Returns a pool connected to this database.
    #[must_use]
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.name);
        }
    }
}

fn ensure_template(cluster: &TestCluster) -> eyre::Result<()> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(CREATE_SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("{e}"))?;
            Ok(())
        })
        .map_err(|e| eyre::eyre!("{e}"))
}

/// Builds a portal application for `name` and `email`.
///
/// # Errors
///
/// Returns an error when the contact details fail validation.
pub fn application(name: &str, email: &str) -> eyre::Result<Application> {
    let profile = ApplicantProfile {
        candidate_name: CandidateName::new(name)?,
        email: CandidateEmail::new(email)?,
        phone: None,
        position_applied: "Platform Engineer".to_owned(),
        job_role_id: None,
        file_url: None,
        parsed_resume: None,
        source: ApplicationSource::Portal,
    };
    Ok(Application::submit(profile, &DefaultClock))
}

/// Stores a fresh application so rows referencing it satisfy their keys.
///
/// # Errors
///
/// Returns an error when the application cannot be built or stored.
pub async fn stored_application(pool: PgPool) -> eyre::Result<Application> {
    let candidate = application("Ada Lovelace", "ada@example.com")?;
    PostgresApplicationRepository::new(pool)
        .store(&candidate)
        .await?;
    Ok(candidate)
}
