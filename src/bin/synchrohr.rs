//! SynchroHR service entry point.
//!
//! ```text
//! synchrohr serve           # HTTP API plus the background email poller
//! synchrohr process-queue   # deliver due emails once and exit
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use synchrohr::config::{ConfigError, Settings};
use synchrohr::db;
use synchrohr::http::{AppState, Backends, ServiceOptions, build_router};
use synchrohr::interview::adapters::postgres::PostgresInterviewRepository;
use synchrohr::notification::{
    adapters::{
        http::HttpNotificationGateway, postgres::PostgresEmailQueue,
        recording::RecordingNotificationGateway,
    },
    ports::{EmailQueueError, NotificationGateway},
    services::EmailQueueProcessor,
};
use synchrohr::pipeline::{
    adapters::{openai::OpenAiResumeAnalyzer, postgres::PostgresApplicationRepository},
    ports::ResumeAnalyzerError,
};
use synchrohr::telemetry;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(about = "Candidate pipeline service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API and the background email poller.
    Serve,
    /// Deliver due emails once and exit.
    ProcessQueue,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("notification gateway: {0}")]
    Gateway(#[from] reqwest::Error),
    #[error(transparent)]
    Analyzer(#[from] ResumeAnalyzerError),
    #[error(transparent)]
    Queue(#[from] EmailQueueError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let settings = Settings::from_env()?;
    if !telemetry::init(&settings.log_filter) {
        warn!("tracing subscriber already installed");
    }

    let cli = Cli::parse();
    let state = AppState::assemble(backends(&settings)?, service_options(&settings));
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&settings, state).await,
        Command::ProcessQueue => {
            let report = state.queue.process_due().await?;
            info!(
                processed = report.processed,
                succeeded = report.succeeded,
                failed = report.failed,
                skipped = report.skipped,
                "email queue processed"
            );
            Ok(())
        }
    }
}

async fn serve(settings: &Settings, state: AppState) -> Result<(), StartupError> {
    let poller = tokio::spawn(poll_queue(Arc::clone(&state.queue), settings.poll_interval));

    let app = build_router(state).layer(TraceLayer::new_for_http());
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "starting synchrohr");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    poller.abort();
    served?;
    Ok(())
}

async fn poll_queue(
    processor: Arc<EmailQueueProcessor<mockable::DefaultClock>>,
    every: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match processor.process_due().await {
            Ok(report) if report.processed > 0 => info!(
                processed = report.processed,
                succeeded = report.succeeded,
                failed = report.failed,
                skipped = report.skipped,
                "email queue processed"
            ),
            Ok(_) => {}
            Err(err) => error!(error = %err, "email queue run failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

fn backends(settings: &Settings) -> Result<Backends, StartupError> {
    let gateway = gateway(settings)?;
    let mut backends = Backends::in_memory(Arc::clone(&gateway));
    if let Some(database_url) = &settings.database_url {
        let pool = db::connect(database_url, settings.database_max_connections)?;
        backends.applications = Arc::new(PostgresApplicationRepository::new(pool.clone()));
        backends.email_queue = Arc::new(PostgresEmailQueue::new(pool.clone()));
        backends.interviews = Arc::new(PostgresInterviewRepository::new(pool));
        info!("using PostgreSQL storage");
    } else {
        warn!("DATABASE_URL not set, using in-memory storage");
    }

    if let Some(analyzer) = settings.analyzer.clone() {
        info!(model = %analyzer.model, "AI screening enabled");
        backends = backends.with_analyzer(Arc::new(OpenAiResumeAnalyzer::new(analyzer)?));
    } else {
        warn!("AI_API_KEY not set, AI screening disabled");
    }
    Ok(backends)
}

fn gateway(settings: &Settings) -> Result<Arc<dyn NotificationGateway>, StartupError> {
    if let Some(functions) = &settings.functions {
        let http = HttpNotificationGateway::new(&functions.base_url, &functions.api_key)?;
        return Ok(Arc::new(http));
    }
    warn!("FUNCTIONS_BASE_URL not set, emails are recorded instead of sent");
    Ok(Arc::new(RecordingNotificationGateway::new()))
}

fn service_options(settings: &Settings) -> ServiceOptions {
    ServiceOptions {
        queue: settings.queue,
        scheduler: settings.scheduler.clone(),
        screening_policy: settings.screening_policy,
        auto_schedule_interview: settings.auto_schedule_interview,
    }
}
