//! Pure layout pass: canonical section ordering, word wrap, pagination.
//!
//! Pagination rules:
//! - page breaks happen only between blocks — the wrapped lines of one block
//!   (a bullet, a contact line) always stay on the same page. The one
//!   exception is a block taller than an empty page, which has no page it
//!   could stay whole on and instead splits at page boundaries;
//! - a section heading is never orphaned at the bottom of a page: it moves
//!   to the next page together with at least the first line of its body.

use crate::layout::{FontRole, Page, PageGeometry, RenderedLayout, TextRun};
use crate::models::document::{GeneratedCvDocument, CANONICAL_ORDER};

/// Lays out the document with default A4 geometry.
pub fn render(doc: &GeneratedCvDocument) -> RenderedLayout {
    render_with_geometry(doc, &PageGeometry::default())
}

/// Lays out the document on the given geometry. Deterministic and I/O-free.
pub fn render_with_geometry(doc: &GeneratedCvDocument, geo: &PageGeometry) -> RenderedLayout {
    let mut cursor = Cursor::new(geo);

    // Centered title line, as on the original printed form.
    let title = "Curriculum Vitae";
    cursor.place(TextRun {
        text: title.to_string(),
        role: FontRole::Title,
        size_pt: geo.title_size_pt,
        x_mm: centered_x_mm(title, geo.title_size_pt, geo),
        y_mm: cursor.y_mm,
    });
    cursor.advance(geo.line_height_mm * 2.0);

    // Sections are re-sorted into the canonical order, whatever order the
    // parser delivered them in. Absent sections are simply skipped.
    for heading in CANONICAL_ORDER {
        let Some(section) = doc.section(heading) else {
            continue;
        };

        let first_block_lines = section
            .blocks
            .first()
            .map(|b| wrap_text(b, geo.wrap_width_chars).len())
            .unwrap_or(0);

        // Heading plus the first body block move to a new page together.
        // A first block taller than a page splits anyway, so the heading
        // only needs to keep its first line company.
        let mut lead_mm = geo.heading_gap_mm
            + geo.line_height_mm * 1.4
            + first_block_lines as f32 * geo.line_height_mm;
        if !cursor.fits_empty_page(lead_mm) {
            lead_mm = geo.heading_gap_mm + geo.line_height_mm * 2.4;
        }
        cursor.ensure_room(lead_mm);

        cursor.advance(geo.heading_gap_mm);
        cursor.place(TextRun {
            text: heading.label().to_string(),
            role: FontRole::Heading,
            size_pt: geo.heading_size_pt,
            x_mm: geo.margin_mm,
            y_mm: cursor.y_mm,
        });
        cursor.advance(geo.line_height_mm * 1.4);

        for block in &section.blocks {
            let lines = wrap_text(block, geo.wrap_width_chars);
            let block_height_mm = lines.len() as f32 * geo.line_height_mm;

            // A block taller than an empty page cannot stay whole; it splits
            // at page boundaries rather than running past the bottom margin.
            let keep_whole = cursor.fits_empty_page(block_height_mm);
            if keep_whole {
                cursor.ensure_room(block_height_mm);
            }

            for (i, line) in lines.iter().enumerate() {
                if !keep_whole {
                    cursor.ensure_room(geo.line_height_mm);
                }
                // Continuation lines of a wrapped bullet are indented.
                let indent = if i > 0 && block.starts_with("- ") {
                    2.0
                } else {
                    0.0
                };
                cursor.place(TextRun {
                    text: line.clone(),
                    role: FontRole::Body,
                    size_pt: geo.body_size_pt,
                    x_mm: geo.margin_mm + indent,
                    y_mm: cursor.y_mm,
                });
                cursor.advance(geo.line_height_mm);
            }
        }
    }

    cursor.finish()
}

/// Greedy word wrap at a fixed character width. All input characters are
/// preserved: words longer than the width are hard-split, never truncated.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > width {
            // Flush, then hard-split the oversized word.
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                lines.push(chunk.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current.chars().count() + 1 + word_len
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Approximate set width of a line, for centering the title. Built-in
/// Helvetica averages roughly half the point size per character.
fn centered_x_mm(text: &str, size_pt: f32, geo: &PageGeometry) -> f32 {
    const MM_PER_PT: f32 = 0.3528;
    let text_width_mm = text.chars().count() as f32 * size_pt * 0.5 * MM_PER_PT;
    ((geo.width_mm - text_width_mm) / 2.0).max(geo.margin_mm)
}

/// Tracks the current baseline while pages fill up.
struct Cursor<'a> {
    geo: &'a PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y_mm: f32,
}

impl<'a> Cursor<'a> {
    fn new(geo: &'a PageGeometry) -> Self {
        Self {
            geo,
            pages: Vec::new(),
            current: Page::default(),
            y_mm: geo.top_baseline_mm(),
        }
    }

    fn place(&mut self, run: TextRun) {
        self.current.runs.push(run);
    }

    fn advance(&mut self, dy_mm: f32) {
        self.y_mm -= dy_mm;
    }

    /// Starts a new page unless `needed_mm` of vertical space remains.
    /// Never breaks a fresh page, so callers must not ask for more room
    /// than `fits_empty_page` grants.
    fn ensure_room(&mut self, needed_mm: f32) {
        let fresh_page = self.y_mm >= self.geo.top_baseline_mm();
        if !fresh_page && self.y_mm - needed_mm < self.geo.bottom_limit_mm() {
            self.break_page();
        }
    }

    /// Whether a unit of the given height fits on an empty page, by the
    /// same measure `ensure_room` uses.
    fn fits_empty_page(&self, needed_mm: f32) -> bool {
        self.geo.top_baseline_mm() - needed_mm >= self.geo.bottom_limit_mm()
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y_mm = self.geo.top_baseline_mm();
    }

    fn finish(mut self) -> RenderedLayout {
        if !self.current.runs.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        RenderedLayout {
            pages: self.pages,
            page_width_mm: self.geo.width_mm,
            page_height_mm: self.geo.height_mm,
        }
    }
}
