//! WASM bindings for the form field designer
//!
//! ## Architecture
//!
//! - Designer state lives in Rust via `FormDesigner` (backed by `formfill-core`)
//! - pdf.js decodes and rasterizes pages through `www/js/pdf-bridge.js`
//! - Field rectangles are painted on an overlay canvas stacked over the page
//! - JavaScript only handles DOM events and file I/O
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { FormDesigner, initPdfJs, fieldTypesJson } from './pkg/formfill_wasm.js';
//!
//! await init();
//! await initPdfJs();
//!
//! const designer = new FormDesigner();
//! await designer.loadDocument(new Uint8Array(await file.arrayBuffer()));
//! await designer.renderCurrentPage(pageCanvas);
//!
//! designer.armSelection();
//! overlay.onpointerdown = (e) => designer.pointerDown(e.clientX, e.clientY, overlay);
//! overlay.onpointermove = (e) => {
//!     if (designer.pointerMove(e.clientX, e.clientY, overlay)) designer.redraw(overlay);
//! };
//! overlay.onpointerup = () => showPicker(designer.pointerUp());
//! designer.classify("Input");
//! designer.redraw(overlay);
//!
//! const schema = designer.schemaJson();
//! ```

pub mod canvas_surface;
pub mod designer;
pub mod pdf_viewer;

use wasm_bindgen::prelude::*;

// Re-export main types for JavaScript
pub use canvas_surface::{surface_geometry, CanvasOverlay};
pub use designer::{field_type_options, field_types_json, FieldTypeOption, FormDesigner};
pub use pdf_viewer::{init_pdf_js, init_pdf_js_with_worker};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(
        &format!("formfill-wasm {} initialized", env!("CARGO_PKG_VERSION")).into(),
    );
}

/// Get the library version
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
