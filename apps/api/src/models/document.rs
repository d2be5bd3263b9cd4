//! Typed CV document — the validated output of response parsing.
//!
//! A `GeneratedCvDocument` can only be built through [`GeneratedCvDocument::new`],
//! which enforces the structural invariants (CONTACT and SUMMARY present and
//! first, unique headings, non-empty bodies). Downstream consumers never have
//! to re-check them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParseError;

/// The fixed vocabulary of CV section headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionHeading {
    Contact,
    Summary,
    Experience,
    Skills,
    Education,
    Achievements,
    References,
}

/// Canonical rendering order. CONTACT and SUMMARY lead regardless of the
/// order sections appeared in the model output.
pub const CANONICAL_ORDER: [SectionHeading; 7] = [
    SectionHeading::Contact,
    SectionHeading::Summary,
    SectionHeading::Experience,
    SectionHeading::Skills,
    SectionHeading::Education,
    SectionHeading::Achievements,
    SectionHeading::References,
];

impl SectionHeading {
    /// The canonical label — the exact token the prompt instructs the model
    /// to emit after the `## ` marker.
    pub fn label(&self) -> &'static str {
        match self {
            SectionHeading::Contact => "CONTACT",
            SectionHeading::Summary => "SUMMARY",
            SectionHeading::Experience => "EXPERIENCE",
            SectionHeading::Skills => "SKILLS",
            SectionHeading::Education => "EDUCATION",
            SectionHeading::Achievements => "ACHIEVEMENTS",
            SectionHeading::References => "REFERENCES",
        }
    }

    /// Normalizes a raw heading label to a known heading.
    ///
    /// Matching is case-insensitive: first against the canonical labels, then
    /// against a small synonym table covering the heading variants models
    /// actually emit ("Work Experience", "Profile", ...). Returns `None` for
    /// anything outside the vocabulary — the parser skips those sections.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_lowercase();
        let heading = match normalized.as_str() {
            "contact" | "contact information" | "contact details" | "personal information"
            | "personal details" => SectionHeading::Contact,
            "summary" | "professional summary" | "profile" | "professional profile"
            | "about me" | "objective" | "career objective" => SectionHeading::Summary,
            "experience" | "work experience" | "professional experience"
            | "employment history" | "work history" | "employment" => SectionHeading::Experience,
            "skills" | "technical skills" | "key skills" | "core competencies" => {
                SectionHeading::Skills
            }
            "education" | "academic background" | "qualifications" => SectionHeading::Education,
            "achievements" | "accomplishments" | "awards" | "honors" => {
                SectionHeading::Achievements
            }
            "references" | "referees" => SectionHeading::References,
            _ => return None,
        };
        Some(heading)
    }

    /// Position of this heading in the canonical order, used for re-sorting.
    pub fn canonical_rank(&self) -> usize {
        CANONICAL_ORDER
            .iter()
            .position(|h| h == self)
            .unwrap_or(CANONICAL_ORDER.len())
    }
}

impl fmt::Display for SectionHeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One CV section: a heading plus its body as ordered text blocks.
///
/// A block is one logical line from the model output (a bullet, a contact
/// line, a sentence of the summary). Blocks are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: SectionHeading,
    pub blocks: Vec<String>,
}

/// A parsed, structurally valid CV document.
///
/// Invariants (enforced by [`GeneratedCvDocument::new`]):
/// - CONTACT and SUMMARY are present and are the first two sections
/// - headings are unique
/// - every section has a non-empty body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCvDocument {
    sections: Vec<Section>,
}

impl GeneratedCvDocument {
    /// Builds a document, rejecting any input that violates the structural
    /// invariants. This is the only constructor.
    pub fn new(sections: Vec<Section>) -> Result<Self, ParseError> {
        for required in [SectionHeading::Contact, SectionHeading::Summary] {
            let present = sections
                .iter()
                .any(|s| s.heading == required && !s.blocks.is_empty());
            if !present {
                return Err(ParseError::MissingRequiredSection(required));
            }
        }

        if sections[0].heading != SectionHeading::Contact
            || sections[1].heading != SectionHeading::Summary
        {
            return Err(ParseError::UnrecognizedFormat);
        }

        let mut seen: Vec<SectionHeading> = Vec::with_capacity(sections.len());
        for section in &sections {
            if seen.contains(&section.heading) {
                // Duplicates must have been merged upstream.
                return Err(ParseError::UnrecognizedFormat);
            }
            if section.blocks.iter().all(|b| b.trim().is_empty()) {
                return Err(ParseError::UnrecognizedFormat);
            }
            seen.push(section.heading);
        }

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a section by heading.
    pub fn section(&self, heading: SectionHeading) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}
