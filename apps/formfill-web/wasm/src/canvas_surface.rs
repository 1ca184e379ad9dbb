//! Canvas-backed overlay surface
//!
//! Field rectangles are painted on a transparent canvas stacked over the
//! rendered page. Pointer positions are mapped through the canvas layout box.

use formfill_core::{OverlaySurface, Rect, ShapeStyle, SurfaceGeometry};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// 2D context of an overlay canvas
pub struct CanvasOverlay {
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasOverlay {
    /// Wrap the 2D context of `canvas`
    ///
    /// # Errors
    /// Returns JsValue error if the canvas has no 2D context
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            context,
            width: canvas.width() as f64,
            height: canvas.height() as f64,
        })
    }
}

impl OverlaySurface for CanvasOverlay {
    fn clear(&mut self) {
        self.context.clear_rect(0.0, 0.0, self.width, self.height);
    }

    fn draw_rectangle(&mut self, rect: &Rect, style: &ShapeStyle) {
        self.context.set_fill_style_str(&style.fill.to_css());
        self.context
            .fill_rect(rect.x, rect.y, rect.width, rect.height);

        self.context.set_stroke_style_str(&style.stroke.to_css());
        self.context.set_line_width(style.line_width);
        self.context
            .stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }
}

/// Layout box and intrinsic size of `canvas`
pub fn surface_geometry(canvas: &HtmlCanvasElement) -> SurfaceGeometry {
    let bounds = canvas.get_bounding_client_rect();
    SurfaceGeometry {
        left: bounds.left(),
        top: bounds.top(),
        display_width: bounds.width(),
        display_height: bounds.height(),
        intrinsic_width: canvas.width() as f64,
        intrinsic_height: canvas.height() as f64,
    }
}
