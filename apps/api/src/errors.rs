//! Pipeline error taxonomy and HTTP mapping.
//!
//! The user-visible messages deliberately distinguish "could not reach the
//! model" (retry later) from "the model's answer could not be used" (adjust
//! input or re-prompt) — the remediation differs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::TransportError;
use crate::models::document::SectionHeading;

/// Why the model's raw output could not be turned into a document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// CONTACT or SUMMARY is absent or empty. Never papered over with a
    /// placeholder — a CV missing contact info is unusable.
    #[error("required section {0} is missing or empty")]
    MissingRequiredSection(SectionHeading),

    /// No recognizable section markers, or the structure is otherwise broken.
    #[error("model output has no recognizable CV structure")]
    UnrecognizedFormat,
}

/// Every way one generation run can fail.
///
/// Propagation policy: `Validation` and `Configuration` indicate a caller or
/// config bug and are never retried. Transport failures are retried inside
/// `ModelClient` and surface here as `Generation` once retries are exhausted.
/// `Parse` and `Render` are terminal for the request — re-invoking with a
/// fresh prompt is the caller's decision.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("generation failed after {attempts} attempt(s): {source}")]
    Generation {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("render error: {0}")]
    Render(String),
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            PipelineError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            PipelineError::Configuration(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONFIGURATION_ERROR",
                msg.clone(),
            ),
            PipelineError::Generation { attempts, source } => {
                tracing::error!("Generation failed after {attempts} attempt(s): {source}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_UNREACHABLE",
                    "Could not reach the language model. Please try again later.".to_string(),
                )
            }
            PipelineError::Parse(e) => {
                tracing::error!("Model output rejected: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UNUSABLE_MODEL_OUTPUT",
                    format!("The model's answer could not be used: {e}. Re-submitting may help."),
                )
            }
            PipelineError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "An internal layout error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
