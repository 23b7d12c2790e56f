use std::sync::Arc;

use crate::analysis::analyzer::DocumentAnalyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable analyzer backend. Default: `LlmAnalyzer`.
    pub analyzer: Arc<dyn DocumentAnalyzer>,
}
