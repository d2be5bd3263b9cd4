//! Axum route handlers for the CV generation API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::generation::generate_cv;
use crate::models::profile::{CandidateProfile, JobContext};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateCvRequest {
    pub profile: CandidateProfile,
    pub job: JobContext,
    /// Optional model override; must be in the configured allow-list.
    /// Defaults to the first configured model.
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub default: String,
}

/// POST /api/v1/cv
///
/// Full pipeline: prompt → model → parse → layout → PDF. Responds with the
/// PDF bytes as a download; all failures map to the error taxonomy in
/// `errors.rs`.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Response, PipelineError> {
    let model = request
        .model
        .as_deref()
        .unwrap_or_else(|| state.llm.default_model())
        .to_string();

    let generated = generate_cv(&state.llm, &request.profile, &request.job, &model).await?;

    let disposition = format!("attachment; filename=\"{}\"", generated.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        generated.bytes,
    )
        .into_response())
}

/// GET /api/v1/models
///
/// The configured model allow-list; the first entry is the default.
pub async fn handle_list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm.allowed_models().to_vec(),
        default: state.llm.default_model().to_string(),
    })
}
