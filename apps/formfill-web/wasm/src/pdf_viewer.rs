//! PDF.js integration for rendering PDFs in the browser via WASM
//!
//! pdf.js owns decoding and rasterizing. The bridge hands back an opaque
//! document proxy; Rust keeps it only when the load is still the latest one.

use formfill_core::{DesignerError, DocumentInfo, PageMetadata};
use js_sys::{Reflect, Uint8Array};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

/// Default pdf.js worker, matching the version pinned in pdf-bridge.js
pub const DEFAULT_WORKER_SRC: &str =
    "https://cdn.jsdelivr.net/npm/pdfjs-dist@3.11.174/build/pdf.worker.min.js";

// External JavaScript functions from pdf-bridge.js
#[wasm_bindgen(module = "/www/js/pdf-bridge.js")]
extern "C" {
    #[wasm_bindgen(js_name = initPdfJs)]
    pub async fn init_pdf_js_internal(worker_src: &str) -> JsValue;

    #[wasm_bindgen(js_name = loadDocument)]
    pub async fn load_document_internal(data: Uint8Array) -> JsValue;

    #[wasm_bindgen(js_name = renderPage)]
    pub async fn render_page_internal(
        document: &JsValue,
        page_num: u32,
        canvas: &HtmlCanvasElement,
        scale: f64,
    ) -> JsValue;

    #[wasm_bindgen(js_name = destroyDocument)]
    pub fn destroy_document_internal(document: &JsValue);
}

/// Page size as reported by pdf.js at scale 1.0
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BridgePage {
    pub width: f64,
    pub height: f64,
}

/// Successful `loadDocument` payload, minus the proxy handle
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeDocument {
    pub num_pages: f64,
    #[serde(default)]
    pub pages: Vec<BridgePage>,
}

impl BridgeDocument {
    /// Validate what pdf.js reported and turn it into document info
    pub fn into_document_info(self) -> Result<DocumentInfo, DesignerError> {
        if !self.num_pages.is_finite() || self.num_pages < 1.0 {
            return Err(DesignerError::ParseError(format!(
                "Invalid page count: {}",
                self.num_pages
            )));
        }

        let page_count = self.num_pages as u32;
        let pages = self
            .pages
            .iter()
            .take(page_count as usize)
            .enumerate()
            .map(|(idx, page)| PageMetadata::new(idx as u32 + 1, page.width, page.height))
            .collect();

        Ok(DocumentInfo { page_count, pages })
    }
}

/// Error message carried in a bridge result, if any
pub fn bridge_error(result: &JsValue) -> Option<String> {
    if result.is_undefined() || result.is_null() {
        return Some("pdf.js returned no result".to_string());
    }
    Reflect::get(result, &JsValue::from_str("error"))
        .ok()
        .filter(|e| !e.is_undefined() && !e.is_null())
        .map(|e| e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

/// Decode a `loadDocument` result into document info and the pdf.js proxy
pub fn parse_loaded_document(result: &JsValue) -> Result<(DocumentInfo, JsValue), DesignerError> {
    if let Some(message) = bridge_error(result) {
        return Err(DesignerError::ParseError(message));
    }

    let proxy = Reflect::get(result, &JsValue::from_str("proxy"))
        .map_err(|_| DesignerError::ParseError("Missing document proxy".to_string()))?;
    let document: BridgeDocument = serde_wasm_bindgen::from_value(result.clone())
        .map_err(|e| DesignerError::ParseError(e.to_string()))?;

    Ok((document.into_document_info()?, proxy))
}

/// Load PDF bytes through pdf.js
pub async fn load_document(bytes: &[u8]) -> Result<(DocumentInfo, JsValue), DesignerError> {
    let uint8_array = Uint8Array::new_with_length(bytes.len() as u32);
    uint8_array.copy_from(bytes);

    let result = load_document_internal(uint8_array).await;
    parse_loaded_document(&result).inspect_err(|_| {
        // pdf.js may have opened the document before the payload was rejected
        if let Ok(proxy) = Reflect::get(&result, &JsValue::from_str("proxy")) {
            destroy_document(&proxy);
        }
    })
}

/// Release a pdf.js document proxy and its worker-side resources
pub fn destroy_document(document: &JsValue) {
    if !document.is_undefined() && !document.is_null() {
        destroy_document_internal(document);
    }
}

/// Turn an `initPdfJs` result into an error for JavaScript
fn check_init(result: &JsValue) -> Result<(), JsValue> {
    match bridge_error(result) {
        Some(message) => Err(JsValue::from_str(&format!(
            "Failed to initialize pdf.js: {}",
            message
        ))),
        None => Ok(()),
    }
}

/// Render `page_num` of `document` onto `canvas`
pub async fn render_page(
    document: &JsValue,
    page_num: u32,
    canvas: &HtmlCanvasElement,
    scale: f64,
) -> Result<(), DesignerError> {
    let result = render_page_internal(document, page_num, canvas, scale).await;
    match bridge_error(&result) {
        Some(message) => Err(DesignerError::Render(message)),
        None => Ok(()),
    }
}

/// Initialize PDF.js library with default worker
/// Must be called before loading documents
#[wasm_bindgen(js_name = initPdfJs)]
pub async fn init_pdf_js() -> Result<(), JsValue> {
    check_init(&init_pdf_js_internal(DEFAULT_WORKER_SRC).await)
}

/// Initialize PDF.js library with custom worker URL
#[wasm_bindgen(js_name = initPdfJsWithWorker)]
pub async fn init_pdf_js_with_worker(worker_src: &str) -> Result<(), JsValue> {
    check_init(&init_pdf_js_internal(worker_src).await)
}
