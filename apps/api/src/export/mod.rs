//! PDF Exporter — serializes a rendered layout into PDF bytes.
//!
//! Text is written as real PDF text objects in built-in Type1 fonts
//! (Helvetica family), never rasterized — ATS software must be able to
//! extract every string. Deterministic given the layout.

use printpdf::{lopdf, BuiltinFont, IndirectFontRef, Mm, OffsetDateTime, PdfDocument};

use crate::errors::PipelineError;
use crate::layout::{FontRole, RenderedLayout};

const PAGE_TITLE: &str = "Curriculum Vitae";
const LAYER_NAME: &str = "Layer 1";

// Fixed trailer ID pair, replacing the randomized one `save_to_bytes` stamps.
const TRAILER_ID: &str = "00000000000000000000000000000000";

/// Writes the layout to a single PDF document and returns its bytes.
///
/// Every draw instruction is bounds-checked against the page rectangle
/// before anything is written — a run outside the page means a renderer
/// bug and fails the export with a `Render` error.
pub fn export(layout: &RenderedLayout) -> Result<Vec<u8>, PipelineError> {
    check_bounds(layout)?;

    if layout.pages.is_empty() {
        return Err(PipelineError::Render("layout has no pages".to_string()));
    }

    let width = Mm(layout.page_width_mm);
    let height = Mm(layout.page_height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(PAGE_TITLE, width, height, LAYER_NAME);

    // The library defaults to wall-clock creation/modification dates, which
    // would break byte-for-byte reproducibility. Pin them to the epoch.
    let doc = doc
        .with_creation_date(OffsetDateTime::UNIX_EPOCH)
        .with_mod_date(OffsetDateTime::UNIX_EPOCH)
        .with_metadata_date(OffsetDateTime::UNIX_EPOCH);

    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PipelineError::Render(format!("failed to load body font: {e}")))?;
    let heading_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| PipelineError::Render(format!("failed to load heading font: {e}")))?;

    for (index, page) in layout.pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, LAYER_NAME);
            doc.get_page(page_index).get_layer(layer_index)
        };

        for run in &page.runs {
            let font: &IndirectFontRef = match run.role {
                FontRole::Title | FontRole::Heading => &heading_font,
                FontRole::Body => &body_font,
            };
            layer.use_text(
                run.text.clone(),
                run.size_pt,
                Mm(run.x_mm),
                Mm(run.y_mm),
                font,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| PipelineError::Render(format!("failed to serialize PDF: {e}")))?;
    normalize_trailer_id(&bytes)
}

/// `save_to_bytes` generates a fresh random `/ID` pair at save time, so two
/// exports of one layout would differ. Rewrites the trailer with a fixed pair.
fn normalize_trailer_id(bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let mut doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| PipelineError::Render(format!("failed to reopen PDF: {e}")))?;
    doc.trailer.set(
        "ID",
        lopdf::Object::Array(vec![
            lopdf::Object::string_literal(TRAILER_ID),
            lopdf::Object::string_literal(TRAILER_ID),
        ]),
    );

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| PipelineError::Render(format!("failed to rewrite PDF trailer: {e}")))?;
    Ok(out)
}

/// Rejects any run positioned outside the page rectangle.
fn check_bounds(layout: &RenderedLayout) -> Result<(), PipelineError> {
    for (page_index, page) in layout.pages.iter().enumerate() {
        for run in &page.runs {
            let inside = run.x_mm >= 0.0
                && run.x_mm <= layout.page_width_mm
                && run.y_mm >= 0.0
                && run.y_mm <= layout.page_height_mm;
            if !inside {
                return Err(PipelineError::Render(format!(
                    "text run at ({:.1}, {:.1}) mm on page {} is outside the {}x{} mm page",
                    run.x_mm,
                    run.y_mm,
                    page_index + 1,
                    layout.page_width_mm,
                    layout.page_height_mm,
                )));
            }
        }
    }
    Ok(())
}
