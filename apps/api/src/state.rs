use std::sync::Arc;

use crate::llm_client::ModelClient;

/// Shared application state injected into all route handlers via Axum
/// extractors. The model client is the only shared resource — candidate
/// data and documents live and die within a single request.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<ModelClient>,
}
