//! Prompt Builder — deterministically serializes candidate data and the job
//! description into the model prompt.
//!
//! Byte-identical inputs always yield a byte-identical prompt: no timestamps,
//! no randomness, no iteration over unordered collections. Invalid input is
//! rejected here, before anything is sent to the model.

use crate::errors::PipelineError;
use crate::generation::prompts::CV_PROMPT_TEMPLATE;
use crate::models::profile::{CandidateProfile, JobContext, References};

/// Builds the user prompt for one generation run.
///
/// Fails with `Validation` if the full name is empty, all contact fields are
/// empty, or the job description is blank.
pub fn build(profile: &CandidateProfile, job: &JobContext) -> Result<String, PipelineError> {
    profile.validate()?;
    if job.description.trim().is_empty() {
        return Err(PipelineError::Validation(
            "job description is required".to_string(),
        ));
    }

    let prompt = CV_PROMPT_TEMPLATE
        .replace("{name}", profile.full_name.trim())
        .replace("{job_description}", job.description.trim())
        .replace("{contact}", &contact_block(profile))
        .replace("{summary}", &or_placeholder(profile.summary.trim()))
        .replace("{education}", &education_block(profile))
        .replace("{experience}", &experience_block(profile))
        .replace("{skills}", &list_block(&profile.skills))
        .replace("{achievements}", &list_block(&profile.achievements))
        .replace("{references}", &references_block(&profile.references));

    Ok(prompt)
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() {
        "Not provided".to_string()
    } else {
        value.to_string()
    }
}

fn contact_block(profile: &CandidateProfile) -> String {
    let mut lines = Vec::new();
    if let Some(email) = non_blank(&profile.email) {
        lines.push(format!("Email: {email}"));
    }
    if let Some(phone) = non_blank(&profile.phone) {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(location) = non_blank(&profile.location) {
        lines.push(format!("Location: {location}"));
    }
    lines.join("\n")
}

fn education_block(profile: &CandidateProfile) -> String {
    if profile.education.is_empty() {
        return "Not provided".to_string();
    }
    profile
        .education
        .iter()
        .map(|e| {
            let dates = if e.dates.trim().is_empty() {
                String::new()
            } else {
                format!(" ({})", e.dates.trim())
            };
            format!("{}, {}{dates}", e.degree.trim(), e.institution.trim())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn experience_block(profile: &CandidateProfile) -> String {
    if profile.experience.is_empty() {
        return "Not provided".to_string();
    }
    let mut out = Vec::new();
    for entry in &profile.experience {
        let dates = if entry.dates.trim().is_empty() {
            String::new()
        } else {
            format!(" ({})", entry.dates.trim())
        };
        out.push(format!(
            "{}, {}{dates}",
            entry.title.trim(),
            entry.employer.trim()
        ));
        for highlight in &entry.highlights {
            out.push(format!("- {}", highlight.trim()));
        }
    }
    out.join("\n")
}

fn list_block(items: &[String]) -> String {
    if items.is_empty() {
        return "Not provided".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {}", item.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn references_block(references: &References) -> String {
    match references {
        References::AvailableOnRequest => "Available upon request".to_string(),
        References::Named(refs) if refs.is_empty() => "Available upon request".to_string(),
        References::Named(refs) => refs
            .iter()
            .map(|r| {
                format!(
                    "{} ({}), {}",
                    r.name.trim(),
                    r.relation.trim(),
                    r.contact.trim()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
