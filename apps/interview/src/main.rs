mod config;
mod dashboard;
mod errors;
mod gateway;
mod interview;
mod models;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dashboard::DashboardQuery;
use crate::gateway::http::HttpBackend;
use crate::interview::flow::InterviewFlow;
use crate::interview::service::InterviewService;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::candidates::CandidateStore;
use crate::storage::file::FileStore;
use crate::storage::session::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interview v{}", env!("CARGO_PKG_VERSION"));

    // Local persistence
    let store = Arc::new(FileStore::new(config.data_dir.clone())?);
    let sessions = SessionStore::new(store.clone());
    let candidates = CandidateStore::new(store);

    // Scoring backend
    let backend = Arc::new(HttpBackend::new(&config)?);
    info!("Backend client initialized (base: {})", config.backend_url);

    let flow = InterviewFlow::new(sessions, config.question_time_secs);
    let interview = InterviewService::new(flow, backend, candidates.clone());
    info!(
        "Interview service ready ({}s per question)",
        config.question_time_secs
    );

    let state = AppState {
        interview,
        candidates,
        dashboard: Arc::new(Mutex::new(DashboardQuery::default())),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
