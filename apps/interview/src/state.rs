use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::dashboard::DashboardQuery;
use crate::interview::service::InterviewService;
use crate::storage::candidates::CandidateStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub interview: Arc<InterviewService>,
    pub candidates: CandidateStore,
    /// Search, sort and page the dashboard was last rendered with.
    pub dashboard: Arc<Mutex<DashboardQuery>>,
    pub config: Config,
}
