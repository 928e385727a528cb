use std::sync::Arc;

use crate::analysis::store::AnalysisStore;
use crate::auth::JwtVerifier;
use crate::llm_client::ChatGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// AI gateway. Default: `LlmClient`; tests use a stub.
    pub gateway: Arc<dyn ChatGateway>,
    /// Default: `PgAnalysisStore`.
    pub store: Arc<dyn AnalysisStore>,
    pub auth: JwtVerifier,
}
