use std::sync::Arc;

use crate::analysis::AnalysisService;
use crate::config::Config;
use crate::storage::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: UploadStore,
    /// Pluggable analysis backend. Default: HttpAnalysisService pointed at ANALYSIS_SERVICE_URL.
    pub analysis: Arc<dyn AnalysisService>,
}
