//! Candidate input types — what the caller supplies for one generation run.
//!
//! These are immutable for the duration of a pipeline run: the handler
//! deserializes them once from the request body and passes references down.

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

/// Structured candidate data collected by the (external) input form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub references: References,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    #[serde(default)]
    pub dates: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub employer: String,
    pub title: String,
    #[serde(default)]
    pub dates: String,
    /// Bullet points describing the role.
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// References are either a list of named referees or the conventional
/// "available on request" placeholder. Deserializes from a JSON array of
/// reference objects, or from `null` / a missing field for the placeholder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum References {
    Named(Vec<Reference>),
    #[default]
    AvailableOnRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub relation: String,
    pub contact: String,
}

/// The target job description. Biases keyword selection and phrasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobContext {
    pub description: String,
}

impl CandidateProfile {
    /// Presence validation run before anything is sent to the model:
    /// the full name and at least one contact field are required.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.full_name.trim().is_empty() {
            return Err(PipelineError::Validation(
                "full name is required".to_string(),
            ));
        }

        let has_contact = [&self.email, &self.phone, &self.location]
            .iter()
            .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()));
        if !has_contact {
            return Err(PipelineError::Validation(
                "at least one contact field (email, phone, or location) is required".to_string(),
            ));
        }

        Ok(())
    }
}
