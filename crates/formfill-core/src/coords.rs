//! Coordinate transformation between surface and PDF coordinate systems
//!
//! Fields are captured on the rendering surface (top-left origin, surface
//! pixels). A form filler writes into PDF user space (bottom-left origin,
//! points), so exported placements go through these helpers.

use serde::{Deserialize, Serialize};

/// Rectangle in PDF user space, anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert surface coordinates (top-left origin, pixels) to PDF coordinates (bottom-left origin, points)
pub fn surface_to_pdf(
    surface_x: f64,
    surface_y: f64,
    surface_width: f64,
    surface_height: f64,
    media_box: [f64; 4],
) -> (f64, f64) {
    let [mb_x, mb_y, mb_width, mb_height] = media_box;

    let x_pct = surface_x / surface_width;
    let y_pct = surface_y / surface_height;

    // Flip Y axis
    let pdf_x = mb_x + (x_pct * mb_width);
    let pdf_y = mb_y + (mb_height - (y_pct * mb_height));

    (pdf_x, pdf_y)
}

/// Convert PDF coordinates to surface coordinates
pub fn pdf_to_surface(
    pdf_x: f64,
    pdf_y: f64,
    surface_width: f64,
    surface_height: f64,
    media_box: [f64; 4],
) -> (f64, f64) {
    let [mb_x, mb_y, mb_width, mb_height] = media_box;

    let x_pct = (pdf_x - mb_x) / mb_width;
    let y_pct = 1.0 - ((pdf_y - mb_y) / mb_height);

    (x_pct * surface_width, y_pct * surface_height)
}

/// Convert a normalized surface rectangle into a PDF rectangle
///
/// The surface rectangle's bottom edge becomes the PDF rectangle's origin.
pub fn surface_rect_to_pdf(
    rect: &crate::geometry::Rect,
    surface_width: f64,
    surface_height: f64,
    media_box: [f64; 4],
) -> PdfRect {
    let (left, top) = surface_to_pdf(rect.x, rect.y, surface_width, surface_height, media_box);
    let (right, bottom) = surface_to_pdf(
        rect.x + rect.width,
        rect.y + rect.height,
        surface_width,
        surface_height,
        media_box,
    );

    PdfRect {
        x: left,
        y: bottom,
        width: right - left,
        height: top - bottom,
    }
}
