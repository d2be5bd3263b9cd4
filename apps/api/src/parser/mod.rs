//! Response Parser — turns the model's free-form text into a typed document.
//!
//! The upstream model output format is a best-effort text contract, not a
//! schema, so this module assumes nothing: markers may be missing, renamed,
//! duplicated, or decorated with markdown. Parsing either yields a fully
//! valid [`GeneratedCvDocument`] or a [`ParseError`] — never a partially
//! filled structure.
//!
//! # Marker syntax
//! A section marker is a line whose first token is a run of 1–6 `#`
//! characters followed by the heading text (the prompt instructs exactly
//! `## HEADING`). Bold decoration (`**…**`) and a trailing colon are
//! tolerated and stripped before heading normalization.
//!
//! # Policy
//! 1. Text before the first recognized marker is discarded as preamble with
//!    a warning — never silently merged into SUMMARY.
//! 2. Missing CONTACT or SUMMARY fails with `MissingRequiredSection`; no
//!    placeholder is synthesized.
//! 3. Duplicate headings merge by concatenation in order of appearance.
//! 4. Empty-body sections are dropped, except CONTACT/SUMMARY which are
//!    errors when empty.

use tracing::warn;

use crate::errors::ParseError;
use crate::models::document::{GeneratedCvDocument, Section, SectionHeading};

/// Parses raw model output into a validated CV document.
pub fn parse(raw: &str) -> Result<GeneratedCvDocument, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::UnrecognizedFormat);
    }

    // First-occurrence order, duplicates merged in place.
    let mut sections: Vec<(SectionHeading, Vec<String>)> = Vec::new();
    // None until the first recognized marker, or while inside an unknown section.
    let mut current: Option<usize> = None;
    let mut preamble_lines = 0usize;
    let mut saw_marker = false;

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');

        if let Some(label) = marker_label(line) {
            match SectionHeading::from_label(&label) {
                Some(heading) => {
                    saw_marker = true;
                    let index = match sections.iter().position(|(h, _)| *h == heading) {
                        Some(existing) => existing, // duplicate: concatenate
                        None => {
                            sections.push((heading, Vec::new()));
                            sections.len() - 1
                        }
                    };
                    current = Some(index);
                }
                None => {
                    warn!("Skipping unknown section heading: {label:?}");
                    current = None;
                }
            }
            continue;
        }

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match current {
            Some(index) => sections[index].1.push(text.to_string()),
            None if !saw_marker => preamble_lines += 1,
            None => {} // body of an unknown section, already warned
        }
    }

    if preamble_lines > 0 {
        warn!("Discarding {preamble_lines} preamble line(s) before the first section marker");
    }

    if sections.is_empty() {
        return Err(ParseError::UnrecognizedFormat);
    }

    // Drop empty sections; empty CONTACT/SUMMARY are fatal.
    let mut kept: Vec<Section> = Vec::with_capacity(sections.len());
    for (heading, blocks) in sections {
        if blocks.is_empty() {
            if matches!(heading, SectionHeading::Contact | SectionHeading::Summary) {
                return Err(ParseError::MissingRequiredSection(heading));
            }
            warn!("Dropping empty section {heading}");
            continue;
        }
        kept.push(Section { heading, blocks });
    }

    for required in [SectionHeading::Contact, SectionHeading::Summary] {
        if !kept.iter().any(|s| s.heading == required) {
            return Err(ParseError::MissingRequiredSection(required));
        }
    }

    // CONTACT and SUMMARY lead; the rest keep first-occurrence order.
    kept.sort_by_key(|s| match s.heading {
        SectionHeading::Contact => 0,
        SectionHeading::Summary => 1,
        _ => 2,
    });

    GeneratedCvDocument::new(kept)
}

/// Extracts the heading label from a marker line, or `None` for body text.
fn marker_label(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }

    let rest = &trimmed[hashes..];
    // Require separation between the hash run and the label ("##CONTACT" is
    // not a marker the prompt can produce; "#hashtag" text stays body text).
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let label = rest
        .trim()
        .trim_matches('*')
        .trim_end_matches(':')
        .trim_matches('*')
        .trim()
        .to_string();

    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
## CONTACT
Jane Doe
jane@example.com
+49 123 456789

## SUMMARY
Backend engineer with five years of experience building reliable services.

## EXPERIENCE
- Senior Backend Engineer, Acme GmbH (2020-present)
- Built RESTful APIs serving 2M requests per day

## SKILLS
- Go
- PostgreSQL
";

    #[test]
    fn test_parses_well_formed_output() {
        let doc = parse(WELL_FORMED).unwrap();
        assert_eq!(doc.sections().len(), 4);
        assert_eq!(doc.sections()[0].heading, SectionHeading::Contact);
        assert_eq!(doc.sections()[1].heading, SectionHeading::Summary);
        assert_eq!(
            doc.section(SectionHeading::Skills).unwrap().blocks,
            vec!["- Go", "- PostgreSQL"]
        );
    }

    #[test]
    fn test_preamble_is_discarded_not_merged_into_summary() {
        let raw = format!("Here is the CV you asked for:\nHope this helps!\n{WELL_FORMED}");
        let doc = parse(&raw).unwrap();
        let summary = doc.section(SectionHeading::Summary).unwrap();
        assert!(!summary.blocks.iter().any(|b| b.contains("Hope this helps")));
        assert_eq!(summary.blocks.len(), 1);
    }

    #[test]
    fn test_missing_summary_is_error_not_placeholder() {
        let raw = "## CONTACT\njane@example.com\n## SKILLS\n- Go\n";
        let err = parse(raw).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingRequiredSection(SectionHeading::Summary)
        ));
    }

    #[test]
    fn test_missing_contact_is_error() {
        let raw = "## SUMMARY\nBackend engineer\n## SKILLS\n- Go\n";
        let err = parse(raw).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingRequiredSection(SectionHeading::Contact)
        ));
    }

    #[test]
    fn test_empty_required_section_is_error() {
        let raw = "## CONTACT\n\n## SUMMARY\nBackend engineer\n";
        let err = parse(raw).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingRequiredSection(SectionHeading::Contact)
        ));
    }

    #[test]
    fn test_duplicate_headings_merge_by_concatenation() {
        let raw = "\
## CONTACT
jane@example.com
## SUMMARY
Backend engineer
## SKILLS
- Go
## SKILLS
- Rust
";
        let doc = parse(raw).unwrap();
        assert_eq!(
            doc.section(SectionHeading::Skills).unwrap().blocks,
            vec!["- Go", "- Rust"]
        );
    }

    #[test]
    fn test_empty_optional_section_is_dropped() {
        let raw = "\
## CONTACT
jane@example.com
## SUMMARY
Backend engineer
## ACHIEVEMENTS

## SKILLS
- Go
";
        let doc = parse(raw).unwrap();
        assert!(doc.section(SectionHeading::Achievements).is_none());
        assert!(doc.section(SectionHeading::Skills).is_some());
    }

    #[test]
    fn test_synonym_headings_are_normalized() {
        let raw = "\
## Contact Information
jane@example.com
## Profile
Backend engineer
## Work Experience
- Senior Backend Engineer, Acme GmbH
";
        let doc = parse(raw).unwrap();
        assert!(doc.section(SectionHeading::Contact).is_some());
        assert!(doc.section(SectionHeading::Summary).is_some());
        assert!(doc.section(SectionHeading::Experience).is_some());
    }

    #[test]
    fn test_unknown_heading_body_is_skipped() {
        let raw = "\
## CONTACT
jane@example.com
## HOBBIES
Competitive knitting
## SUMMARY
Backend engineer
";
        let doc = parse(raw).unwrap();
        assert_eq!(doc.sections().len(), 2);
        assert!(!doc
            .sections()
            .iter()
            .any(|s| s.blocks.iter().any(|b| b.contains("knitting"))));
    }

    #[test]
    fn test_no_markers_at_all_is_unrecognized_format() {
        let raw = "I am sorry, I cannot create a CV from the provided data.";
        assert!(matches!(parse(raw), Err(ParseError::UnrecognizedFormat)));
    }

    #[test]
    fn test_empty_input_is_unrecognized_format() {
        assert!(matches!(parse("  \n \n"), Err(ParseError::UnrecognizedFormat)));
    }

    #[test]
    fn test_contact_and_summary_reordered_to_front() {
        let raw = "\
## SKILLS
- Go
## SUMMARY
Backend engineer
## CONTACT
jane@example.com
";
        let doc = parse(raw).unwrap();
        assert_eq!(doc.sections()[0].heading, SectionHeading::Contact);
        assert_eq!(doc.sections()[1].heading, SectionHeading::Summary);
        assert_eq!(doc.sections()[2].heading, SectionHeading::Skills);
    }

    #[test]
    fn test_marker_tolerates_decoration() {
        let raw = "\
### **Contact:**
jane@example.com
## Summary:
Backend engineer
";
        let doc = parse(raw).unwrap();
        assert!(doc.section(SectionHeading::Contact).is_some());
        assert!(doc.section(SectionHeading::Summary).is_some());
    }

    #[test]
    fn test_hash_without_space_is_not_a_marker() {
        assert_eq!(marker_label("#hashtag in body text"), None);
        assert_eq!(marker_label("plain body text"), None);
        assert_eq!(marker_label("## CONTACT"), Some("CONTACT".to_string()));
    }

    // Round-trip: serialize a parsed document back to marker format and
    // re-parse; the documents must be equivalent.
    #[test]
    fn test_round_trip_through_marker_format() {
        let doc = parse(WELL_FORMED).unwrap();

        let mut serialized = String::new();
        for section in doc.sections() {
            serialized.push_str(&format!("## {}\n", section.heading));
            for block in &section.blocks {
                serialized.push_str(block);
                serialized.push('\n');
            }
            serialized.push('\n');
        }

        let reparsed = parse(&serialized).unwrap();
        assert_eq!(doc, reparsed);
    }
}
