//! Stateful form designer exposed to JavaScript
//!
//! All designer state lives in Rust. JavaScript forwards DOM events (file
//! picks, pointer events on the overlay canvas, toolbar clicks) and asks
//! for redraws.

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use formfill_core::{DesignerConfig, DesignerSession, FieldType, LoadOutcome};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::canvas_surface::{surface_geometry, CanvasOverlay};
use crate::pdf_viewer;

/// Entry for the field type picker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldTypeOption {
    pub label: &'static str,
    pub key: u8,
}

/// Picker entries in keyboard order
pub fn field_type_options() -> Vec<FieldTypeOption> {
    FieldType::ALL
        .iter()
        .map(|ft| FieldTypeOption {
            label: ft.label(),
            key: ft.option_key(),
        })
        .collect()
}

/// Store the proxy of a finished load; returns the proxy nobody uses anymore
///
/// A successful load replaces the current proxy. Stale and failed loads hand
/// their own proxy back.
fn settle_proxy<P>(
    slot: &mut Option<P>,
    outcome: &LoadOutcome,
    incoming: Option<P>,
) -> Option<P> {
    match outcome {
        LoadOutcome::Loaded { .. } => std::mem::replace(slot, incoming),
        LoadOutcome::Failed | LoadOutcome::Stale => incoming,
    }
}

struct DesignerState {
    session: DesignerSession,
    /// pdf.js proxy for the document the session currently shows
    document_proxy: Option<JsValue>,
}

/// Form field designer session
///
/// Async methods take `&self` so a second upload can start while the first
/// is still decoding; the session drops whichever completion is stale.
#[wasm_bindgen]
pub struct FormDesigner {
    state: Rc<RefCell<DesignerState>>,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[wasm_bindgen]
impl FormDesigner {
    /// Create a designer, optionally configured from a TOML string
    #[wasm_bindgen(constructor)]
    pub fn new(config_toml: Option<String>) -> Result<FormDesigner, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_toml.as_deref() {
            Some(toml) if !toml.trim().is_empty() => DesignerConfig::from_str(toml)
                .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {:#}", e)))?,
            _ => DesignerConfig::default(),
        };

        Ok(Self {
            state: Rc::new(RefCell::new(DesignerState {
                session: DesignerSession::with_config(config),
                document_proxy: None,
            })),
        })
    }


    /// Load an uploaded PDF
    ///
    /// Resolves to `{outcome: "loaded", page_count}` or `{outcome: "stale"}`
    /// and rejects with the error message when the bytes cannot be decoded.
    #[wasm_bindgen(js_name = loadDocument)]
    pub async fn load_document(&self, bytes: Vec<u8>) -> Result<JsValue, JsValue> {
        let ticket = self.state.borrow_mut().session.begin_load();
        let loaded = pdf_viewer::load_document(&bytes).await;

        let mut state = self.state.borrow_mut();
        let (result, proxy) = match loaded {
            Ok((info, proxy)) => (Ok(info), Some(proxy)),
            Err(e) => (Err(e), None),
        };

        let outcome = state.session.complete_load(ticket, result);
        if let Some(released) = settle_proxy(&mut state.document_proxy, &outcome, proxy) {
            pdf_viewer::destroy_document(&released);
        }

        if outcome == LoadOutcome::Failed {
            return Err(JsValue::from_str(
                state
                    .session
                    .last_error()
                    .unwrap_or("Failed to load PDF document"),
            ));
        }
        to_js(&outcome)
    }

    /// Render the current page at the current zoom onto `canvas`
    #[wasm_bindgen(js_name = renderCurrentPage)]
    pub async fn render_current_page(&self, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
        let (proxy, page, scale) = {
            let state = self.state.borrow();
            let proxy = state
                .document_proxy
                .clone()
                .ok_or_else(|| JsValue::from_str("No document loaded"))?;
            (proxy, state.session.current_page(), state.session.scale())
        };

        let rendered = pdf_viewer::render_page(&proxy, page, &canvas, scale).await;

        let mut state = self.state.borrow_mut();
        let superseded = state.session.current_page() != page
            || !state
                .document_proxy
                .as_ref()
                .is_some_and(|current| js_sys::Object::is(current, &proxy));
        if superseded {
            return Ok(());
        }

        match rendered {
            Ok(()) => {
                state.session.invalidate_overlay();
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                state.session.report_render_failure(&message);
                Err(JsValue::from_str(&message))
            }
        }
    }

    #[wasm_bindgen(js_name = lastError)]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().session.last_error().map(str::to_string)
    }

    #[wasm_bindgen(js_name = clearError)]
    pub fn clear_error(&self) {
        self.state.borrow_mut().session.clear_error();
    }

    /// "empty", "loading" or "ready"
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().session.status())
    }


    #[wasm_bindgen(js_name = armSelection)]
    pub fn arm_selection(&self) -> Result<(), JsValue> {
        self.state
            .borrow_mut()
            .session
            .arm_selection()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Start a drag; `canvas` is the overlay, or null while it is not mounted
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(
        &self,
        client_x: f64,
        client_y: f64,
        canvas: Option<HtmlCanvasElement>,
    ) -> Result<(), JsValue> {
        let geometry = canvas.as_ref().map(surface_geometry);
        self.state
            .borrow_mut()
            .session
            .pointer_down(client_x, client_y, geometry.as_ref())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Returns true when the overlay needs a redraw
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(
        &self,
        client_x: f64,
        client_y: f64,
        canvas: Option<HtmlCanvasElement>,
    ) -> bool {
        let geometry = canvas.as_ref().map(surface_geometry);
        self.state
            .borrow_mut()
            .session
            .pointer_move(client_x, client_y, geometry.as_ref())
    }

    /// Finish a drag; resolves to `{outcome: "pending", rect}`, `"discarded"` or `"ignored"`
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self) -> Result<JsValue, JsValue> {
        let outcome = self.state.borrow_mut().session.pointer_up();
        to_js(&outcome)
    }

    /// Commit the pending rectangle as a field
    ///
    /// `field_type` is a label ("Input", "email") or a picker key ("1".."7").
    /// Returns the new field as JSON.
    pub fn classify(&self, field_type: &str) -> Result<String, JsValue> {
        let field_type =
            FieldType::from_str(field_type).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let field = self
            .state
            .borrow_mut()
            .session
            .classify(field_type)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&field)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = cancelCapture)]
    pub fn cancel_capture(&self) {
        self.state.borrow_mut().session.cancel_capture();
    }

    #[wasm_bindgen(js_name = captureState)]
    pub fn capture_state(&self) -> Result<JsValue, JsValue> {
        to_js(self.state.borrow().session.capture_state())
    }


    /// Remove the most recent field; returns whether one was removed
    #[wasm_bindgen(js_name = undoLast)]
    pub fn undo_last(&self) -> bool {
        self.state.borrow_mut().session.undo_last().is_some()
    }

    #[wasm_bindgen(js_name = schemaJson)]
    pub fn schema_json(&self) -> Result<String, JsValue> {
        self.state
            .borrow()
            .session
            .export_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Human-readable field list with current-page flags
    #[wasm_bindgen(js_name = listingJson)]
    pub fn listing_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.borrow().session.listing())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Fields in PDF user space, each sized against its own page
    #[wasm_bindgen(js_name = pdfPlacementsJson)]
    pub fn pdf_placements_json(&self) -> Result<String, JsValue> {
        let placements = self
            .state
            .borrow()
            .session
            .pdf_placements()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        serde_json::to_string(&placements)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Repaint the overlay canvas if the visible shapes changed
    pub fn redraw(&self, canvas: HtmlCanvasElement) -> Result<JsValue, JsValue> {
        let mut overlay = CanvasOverlay::from_canvas(&canvas)?;
        let plan = self.state.borrow_mut().session.redraw(&mut overlay);
        to_js(&plan)
    }

    /// Next redraw repaints everything, e.g. after the overlay canvas was resized
    #[wasm_bindgen(js_name = invalidateOverlay)]
    pub fn invalidate_overlay(&self) {
        self.state.borrow_mut().session.invalidate_overlay();
    }


    #[wasm_bindgen(getter, js_name = currentPage)]
    pub fn current_page(&self) -> u32 {
        self.state.borrow().session.current_page()
    }

    #[wasm_bindgen(getter, js_name = pageCount)]
    pub fn page_count(&self) -> u32 {
        self.state.borrow().session.page_count()
    }

    /// Returns true when the page changed and must be re-rendered
    #[wasm_bindgen(js_name = prevPage)]
    pub fn prev_page(&self) -> bool {
        self.state.borrow_mut().session.go_to_prev_page()
    }

    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&self) -> bool {
        self.state.borrow_mut().session.go_to_next_page()
    }

    #[wasm_bindgen(js_name = goToPage)]
    pub fn go_to_page(&self, page: u32) -> bool {
        self.state.borrow_mut().session.go_to_page(page)
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.state.borrow().session.scale()
    }

    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&self) -> f64 {
        self.state.borrow_mut().session.zoom_in()
    }

    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&self) -> f64 {
        self.state.borrow_mut().session.zoom_out()
    }

    #[wasm_bindgen(js_name = fitToWidth)]
    pub fn fit_to_width(&self, container_width: f64) -> f64 {
        self.state.borrow_mut().session.fit_to_width(container_width)
    }
}

/// Field types for the picker as `[{label, key}]`
#[wasm_bindgen(js_name = fieldTypesJson)]
pub fn field_types_json() -> Result<String, JsValue> {
    serde_json::to_string(&field_type_options())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use formfill_core::DocumentInfo;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn loaded_designer(page_count: u32) -> FormDesigner {
        let designer = FormDesigner::new(None).unwrap();
        {
            let mut state = designer.state.borrow_mut();
            let ticket = state.session.begin_load();
            state
                .session
                .complete_load(ticket, Ok(DocumentInfo::with_page_count(page_count)));
        }
        designer
    }

    fn overlay_canvas() -> HtmlCanvasElement {
        let document = web_sys::window().unwrap().document().unwrap();
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .unwrap()
            .dyn_into()
            .unwrap();
        canvas.set_width(612);
        canvas.set_height(792);
        canvas
    }

    #[wasm_bindgen_test]
    fn test_rejects_bad_config() {
        assert!(FormDesigner::new(Some("[zoom\n".to_string())).is_err());
    }

    #[wasm_bindgen_test]
    fn test_pointer_without_document_errors() {
        let designer = FormDesigner::new(None).unwrap();
        assert!(designer.arm_selection().is_err());
        assert!(designer.pointer_down(1.0, 1.0, None).is_err());
    }

    #[wasm_bindgen_test]
    fn test_unmounted_drag_is_discarded() {
        let designer = loaded_designer(1);
        designer.arm_selection().unwrap();
        designer.pointer_down(40.0, 40.0, None).unwrap();
        designer.pointer_move(140.0, 90.0, None);
        designer.pointer_up().unwrap();

        assert!(designer.classify("Input").is_err());
        assert_eq!(designer.schema_json().unwrap(), "[]");
    }

    #[wasm_bindgen_test]
    fn test_classify_by_key_and_redraw() {
        let designer = loaded_designer(2);
        {
            let mut state = designer.state.borrow_mut();
            state.session.arm_selection().unwrap();
            let geometry = formfill_core::SurfaceGeometry::unscaled(612.0, 792.0);
            state.session.pointer_down(10.0, 10.0, Some(&geometry)).unwrap();
            state.session.pointer_move(110.0, 60.0, Some(&geometry));
            state.session.pointer_up();
        }

        let field = designer.classify("6").unwrap();
        assert!(field.contains(r#""type":"Email""#));

        let canvas = overlay_canvas();
        designer.redraw(canvas.clone()).unwrap();
        let listing = designer.listing_json().unwrap();
        assert!(listing.contains("Email at (10, 10) - Width: 100, Height: 50 (Page 1)"));

        assert!(designer.next_page());
        assert!(designer.undo_last());
        assert_eq!(designer.schema_json().unwrap(), "[]");
    }

    #[wasm_bindgen_test]
    fn test_unknown_field_type() {
        let designer = loaded_designer(1);
        assert!(designer.classify("Signature").is_err());
    }
}
