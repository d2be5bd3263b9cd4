//! Document Renderer — lays out a parsed CV into an ATS-safe page flow.
//!
//! ATS-safe means: one logical reading column, real text runs only (no
//! tables, text boxes, or images), headings in a distinct font, and the
//! fixed canonical section order. The renderer is a pure function from
//! [`GeneratedCvDocument`] to [`RenderedLayout`]; the PDF exporter consumes
//! the layout without re-measuring anything.

pub mod renderer;

use serde::{Deserialize, Serialize};

pub use renderer::render;

/// Which font a text run is set in. The exporter maps roles to concrete
/// fonts; keeping roles abstract here keeps the renderer free of PDF types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontRole {
    /// Document title line ("Curriculum Vitae").
    Title,
    /// Section heading — must be visually distinct from body text.
    Heading,
    Body,
}

/// One positioned piece of text. Coordinates are in millimeters from the
/// bottom-left page corner (PDF convention), `y_mm` is the text baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub role: FontRole,
    pub size_pt: f32,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub runs: Vec<TextRun>,
}

/// Ordered page-level draw instructions, owned by the renderer and consumed
/// once by the exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedLayout {
    pub pages: Vec<Page>,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
}

/// Page geometry and type sizes. A4 portrait with generous margins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    pub title_size_pt: f32,
    pub heading_size_pt: f32,
    pub body_size_pt: f32,
    /// Baseline-to-baseline distance for body lines.
    pub line_height_mm: f32,
    /// Extra space above a section heading.
    pub heading_gap_mm: f32,
    /// Fixed wrap width in characters. Long lines wrap here, never truncate.
    pub wrap_width_chars: usize,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 20.0,
            title_size_pt: 16.0,
            heading_size_pt: 13.0,
            body_size_pt: 11.0,
            line_height_mm: 5.5,
            heading_gap_mm: 4.0,
            wrap_width_chars: 88,
        }
    }
}

impl PageGeometry {
    /// Lowest baseline a run may sit on before a page break is needed.
    pub fn bottom_limit_mm(&self) -> f32 {
        self.margin_mm
    }

    /// Baseline of the first line on a fresh page.
    pub fn top_baseline_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}
