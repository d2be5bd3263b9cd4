//! CV Generation — orchestrates the full pipeline for one request.
//!
//! Flow: build prompt → model call (with retries) → parse response →
//!       lay out document → export PDF.
//!
//! Each invocation is synchronous and self-contained: no state is shared or
//! cached across requests, and nothing below the model-client boundary is
//! ever retried — a parse or render failure is terminal for the request and
//! the decision to re-prompt belongs to the caller.

pub mod handlers;
pub mod prompt_builder;
pub mod prompts;

use tracing::info;

use crate::errors::PipelineError;
use crate::export;
use crate::layout;
use crate::llm_client::ModelClient;
use crate::models::profile::{CandidateProfile, JobContext};
use crate::parser;

/// The finished product of one pipeline run. Discarded after delivery —
/// nothing is persisted.
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    /// Suggested download filename, e.g. `CV_Jane_Doe.pdf`.
    pub filename: String,
    /// Retries the model call needed (0 on first-try success).
    pub retries: u32,
}

/// Runs the full generation pipeline for one candidate/job pair.
pub async fn generate_cv(
    llm: &ModelClient,
    profile: &CandidateProfile,
    job: &JobContext,
    model: &str,
) -> Result<GeneratedPdf, PipelineError> {
    let prompt = prompt_builder::build(profile, job)?;
    info!(model, prompt_chars = prompt.len(), "prompt built");

    let reply = llm.generate(prompts::CV_SYSTEM, &prompt, model).await?;
    info!(
        retries = reply.retries,
        reply_chars = reply.content.len(),
        "model reply received"
    );

    let document = parser::parse(&reply.content)?;
    info!(sections = document.sections().len(), "response parsed");

    let rendered = layout::render(&document);
    let bytes = export::export(&rendered)?;
    info!(
        pages = rendered.pages.len(),
        pdf_bytes = bytes.len(),
        "PDF exported"
    );

    Ok(GeneratedPdf {
        bytes,
        filename: suggested_filename(&profile.full_name),
        retries: reply.retries,
    })
}

/// `CV_<name>.pdf` with everything outside `[A-Za-z0-9]` folded to a single
/// underscore, so the name is safe in a Content-Disposition header.
fn suggested_filename(full_name: &str) -> String {
    let mut stem = String::with_capacity(full_name.len());
    let mut last_was_underscore = false;
    for c in full_name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c);
            last_was_underscore = false;
        } else if !last_was_underscore {
            stem.push('_');
            last_was_underscore = true;
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "CV.pdf".to_string()
    } else {
        format!("CV_{stem}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::llm_client::{CompletionTransport, TransportError};
    use crate::models::profile::{ExperienceEntry, References};

    const MODEL: &str = "meta-llama-3.1-8b-instruct";

    /// Returns a canned, well-formed CV response regardless of the prompt.
    struct CannedTransport {
        response: &'static str,
    }

    #[async_trait]
    impl CompletionTransport for CannedTransport {
        async fn complete(&self, _: &str, _: &str, _: &str) -> Result<String, TransportError> {
            Ok(self.response.to_string())
        }
    }

    const JANE_DOE_RESPONSE: &str = "\
## CONTACT
Jane Doe
jane@example.com

## SUMMARY
Backend engineer

## EXPERIENCE
- Senior Backend Engineer, Acme GmbH (2020-present)

## SKILLS
- Go
";

    fn jane_doe() -> CandidateProfile {
        CandidateProfile {
            full_name: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: None,
            location: None,
            summary: "Backend engineer".to_string(),
            education: vec![],
            experience: vec![ExperienceEntry {
                employer: "Acme GmbH".to_string(),
                title: "Senior Backend Engineer".to_string(),
                dates: "2020-present".to_string(),
                highlights: vec!["Built APIs in Go".to_string()],
            }],
            skills: vec!["Go".to_string()],
            achievements: vec![],
            references: References::AvailableOnRequest,
        }
    }

    fn job() -> JobContext {
        JobContext {
            description: "Go backend role".to_string(),
        }
    }

    fn client(response: &'static str) -> ModelClient {
        ModelClient::with_transport(
            Arc::new(CannedTransport { response }),
            vec![MODEL.to_string()],
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_pdf_contains_profile_text_in_order() {
        let generated = generate_cv(&client(JANE_DOE_RESPONSE), &jane_doe(), &job(), MODEL)
            .await
            .unwrap();

        assert_eq!(generated.filename, "CV_Jane_Doe.pdf");
        assert_eq!(generated.retries, 0);

        let extracted = pdf_extract::extract_text_from_mem(&generated.bytes).unwrap();
        let positions: Vec<usize> = ["Jane Doe", "jane@example.com", "Backend engineer", "Go"]
            .iter()
            .map(|needle| {
                extracted
                    .find(*needle)
                    .unwrap_or_else(|| panic!("{needle:?} missing from extracted text"))
            })
            .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted, "extracted text out of order");
    }

    #[tokio::test]
    async fn test_unusable_model_answer_is_parse_error_not_pdf() {
        let refusal = "I am sorry, I cannot write a CV for this candidate.";
        let err = generate_cv(&client(refusal), &jane_doe(), &job(), MODEL)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[tokio::test]
    async fn test_invalid_profile_never_reaches_the_model() {
        struct PanickingTransport;

        #[async_trait]
        impl CompletionTransport for PanickingTransport {
            async fn complete(&self, _: &str, _: &str, _: &str) -> Result<String, TransportError> {
                panic!("model must not be called for invalid input");
            }
        }

        let llm = ModelClient::with_transport(
            Arc::new(PanickingTransport),
            vec![MODEL.to_string()],
            Duration::from_secs(30),
        );
        let mut profile = jane_doe();
        profile.email = None;

        let err = generate_cv(&llm, &profile, &job(), MODEL).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[test]
    fn test_suggested_filename_sanitizes_name() {
        assert_eq!(suggested_filename("Jane Doe"), "CV_Jane_Doe.pdf");
        assert_eq!(suggested_filename("  Max  Mustermann! "), "CV_Max_Mustermann.pdf");
        assert_eq!(suggested_filename("___"), "CV.pdf");
    }
}
