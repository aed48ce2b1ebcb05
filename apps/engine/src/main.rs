mod analysis;
mod config;
mod db;
mod errors;
mod matching;
mod models;
mod queue;
mod routes;
mod state;
mod store;
mod worker;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{CvAnalyzer, HttpCvAnalyzer};
use crate::config::Config;
use crate::db::create_pool;
use crate::queue::memory::InMemoryTaskQueue;
use crate::queue::postgres::PgTaskQueue;
use crate::queue::TaskQueue;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::{InMemoryApplicationRepo, InMemoryCandidateRepo, InMemoryJobRepo};
use crate::store::postgres::{PgApplicationRepo, PgCandidateRepo, PgJobRepo};
use crate::store::{ApplicationRepo, CandidateRepo, JobRepo};
use crate::worker::WorkerPool;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Forgematch engine v{}", env!("CARGO_PKG_VERSION"));

    // Stores and queue: PostgreSQL when configured, in-memory otherwise.
    let (queue, candidates, jobs, applications): (
        Arc<dyn TaskQueue>,
        Arc<dyn CandidateRepo>,
        Arc<dyn JobRepo>,
        Arc<dyn ApplicationRepo>,
    ) = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            (
                Arc::new(PgTaskQueue::new(pool.clone())),
                Arc::new(PgCandidateRepo::new(pool.clone())),
                Arc::new(PgJobRepo::new(pool.clone())),
                Arc::new(PgApplicationRepo::new(pool)),
            )
        }
        None => {
            info!("DATABASE_URL not set — running standalone with in-memory stores");
            (
                Arc::new(InMemoryTaskQueue::new()),
                Arc::new(InMemoryCandidateRepo::default()),
                Arc::new(InMemoryJobRepo::default()),
                Arc::new(InMemoryApplicationRepo::default()),
            )
        }
    };

    // Optional external CV analysis service
    let analyzer: Option<Arc<dyn CvAnalyzer>> = match config.analysis_service() {
        Some((base_url, api_key)) => {
            info!("CV analysis service configured at {base_url}");
            Some(Arc::new(HttpCvAnalyzer::new(base_url, api_key)))
        }
        None => {
            info!("No CV analysis service configured — heuristic extraction only");
            None
        }
    };

    // Spawn the worker pool
    let pool = Arc::new(WorkerPool {
        queue: queue.clone(),
        candidates: candidates.clone(),
        jobs: jobs.clone(),
        applications: applications.clone(),
        analyzer,
        worker_count: config.worker_count,
        poll_interval: Duration::from_millis(config.poll_interval_ms),
    });
    let workers = pool.spawn();
    info!("Worker pool started ({} workers)", workers.len());

    // Build app state and router
    let state = AppState {
        queue,
        candidates,
        jobs,
        applications,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
