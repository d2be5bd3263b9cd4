// All LLM prompt constants for CV generation.
//
// The `## HEADING` marker contract here is the one the response parser
// scans for — the two must never drift apart.

/// System prompt — sets the CV-writer persona and output discipline.
pub const CV_SYSTEM: &str = "You are a professional CV writer who creates well-structured, \
    ATS-friendly CVs. \
    You MUST return plain text organized into sections. \
    Every section MUST start with a heading line of the form '## HEADING'. \
    Do NOT use tables, columns, images, or any graphical layout. \
    Do NOT add commentary before the first section or after the last one.";

/// CV generation prompt template.
/// Replace: {name}, {job_description}, {contact}, {summary}, {education},
///          {experience}, {skills}, {achievements}, {references}
pub const CV_PROMPT_TEMPLATE: &str = r#"Create a professional CV for {name} who is applying for the following job:

{job_description}

Use the following information to create a well-structured, professional CV:

CONTACT INFORMATION:
{contact}

PROFESSIONAL SUMMARY:
{summary}

EDUCATION:
{education}

WORK EXPERIENCE:
{experience}

SKILLS:
{skills}

ACHIEVEMENTS:
{achievements}

REFERENCES:
{references}

OUTPUT FORMAT — follow exactly:
1. Every section starts with a heading line of the form '## HEADING', on its own line.
2. Use ONLY these headings: CONTACT, SUMMARY, EXPERIENCE, EDUCATION, SKILLS, ACHIEVEMENTS, REFERENCES.
3. ALWAYS include '## CONTACT' (full name first, then one contact detail per line) and '## SUMMARY'.
4. Under each heading write plain text only — one bullet per line starting with '- ' where appropriate.
5. Do NOT use tables, columns, text boxes, or images; they break automated CV parsing.
6. Where truthful, reuse keywords from the job description verbatim so automated screening matches them.
7. Highlight the candidate's strengths most relevant to the job description.
8. Do NOT write anything before the first heading or after the last section."#;
