//! Document source capabilities
//!
//! Decoding and rasterizing PDFs is delegated to an external collaborator
//! (pdf.js in the browser). The core only needs a page count and, when
//! available, page sizes. [`LopdfSource`] provides both natively.

use std::collections::HashSet;

use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DesignerError;

/// US Letter, used when a page carries no MediaBox anywhere in its tree
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Page size and origin in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Page number (1-indexed)
    pub page_num: u32,
    /// X offset (usually 0)
    pub x: f64,
    /// Y offset (usually 0)
    pub y: f64,
    /// Page width in PDF points (1 point = 1/72 inch)
    pub width: f64,
    /// Page height in PDF points
    pub height: f64,
}

impl PageMetadata {
    pub fn new(page_num: u32, width: f64, height: f64) -> Self {
        Self {
            page_num,
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    /// `[x, y, width, height]`
    pub fn media_box(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// What a successful load reports back
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub page_count: u32,
    /// Per-page sizes; empty when the source does not report them
    #[serde(default)]
    pub pages: Vec<PageMetadata>,
}

impl DocumentInfo {
    pub fn with_page_count(page_count: u32) -> Self {
        Self {
            page_count,
            pages: Vec::new(),
        }
    }

    pub fn page(&self, page_num: u32) -> Option<&PageMetadata> {
        self.pages.iter().find(|p| p.page_num == page_num)
    }
}

/// Decodes uploaded bytes into a paginated document
pub trait DocumentSource {
    fn load(&mut self, bytes: &[u8]) -> Result<DocumentInfo, DesignerError>;
}

/// Draws a page of the loaded document onto a target surface
pub trait PageRenderer {
    type Target;

    fn render_page(&mut self, page_num: u32, target: &mut Self::Target)
        -> Result<(), DesignerError>;
}

/// Native document source backed by lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfSource;

impl LopdfSource {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentSource for LopdfSource {
    fn load(&mut self, bytes: &[u8]) -> Result<DocumentInfo, DesignerError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| DesignerError::ParseError(e.to_string()))?;

        let page_ids = doc.get_pages();
        if page_ids.is_empty() {
            return Err(DesignerError::ParseError(
                "document has no pages".to_string(),
            ));
        }

        let mut pages = Vec::with_capacity(page_ids.len());
        for (&page_num, &page_id) in page_ids.iter() {
            let [x, y, width, height] = page_media_box(&doc, page_id)?;
            pages.push(PageMetadata {
                page_num,
                x,
                y,
                width,
                height,
            });
        }

        debug!(page_count = pages.len(), "lopdf decoded document");

        Ok(DocumentInfo {
            page_count: pages.len() as u32,
            pages,
        })
    }
}

/// MediaBox of a page as `[x, y, width, height]`, inheriting from parents
fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<[f64; 4], DesignerError> {
    let mut visited = HashSet::new();
    let mut current = Some(page_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(DesignerError::ParseError(
                "MediaBox inheritance cycle".to_string(),
            ));
        }
        let dict = doc
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| DesignerError::ParseError(format!("Page tree node: {}", e)))?;

        if let Ok(media_box) = dict.get(b"MediaBox") {
            return parse_rect(doc, media_box);
        }

        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(DEFAULT_MEDIA_BOX)
}

/// Parse a PDF rectangle array `[x1, y1, x2, y2]` into `[x, y, width, height]`
fn parse_rect(doc: &Document, obj: &Object) -> Result<[f64; 4], DesignerError> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc
            .get_object(*id)
            .and_then(Object::as_array)
            .map_err(|e| DesignerError::ParseError(format!("MediaBox reference: {}", e)))?,
        _ => {
            return Err(DesignerError::ParseError(
                "MediaBox is not an array".to_string(),
            ))
        }
    };

    if arr.len() != 4 {
        return Err(DesignerError::ParseError(format!(
            "MediaBox has {} elements, expected 4",
            arr.len()
        )));
    }

    let mut values = [0.0f64; 4];
    for (i, obj) in arr.iter().enumerate() {
        values[i] = extract_number(doc, obj)?;
    }

    Ok([
        values[0],
        values[1],
        values[2] - values[0],
        values[3] - values[1],
    ])
}

fn extract_number(doc: &Document, obj: &Object) -> Result<f64, DesignerError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(r) => Ok(*r as f64),
        Object::Reference(id) => {
            let resolved = doc
                .get_object(*id)
                .map_err(|e| DesignerError::ParseError(format!("Failed to resolve: {}", e)))?;
            extract_number(doc, resolved)
        }
        _ => Err(DesignerError::ParseError(
            "Expected number in rectangle".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn two_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let page1_id = doc.new_object_id();
        let page2_id = doc.new_object_id();

        // Page 1 inherits Letter from the page tree, page 2 is A4
        let page1 = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        doc.objects.insert(page1_id, Object::Dictionary(page1));

        let page2 = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(page2_id, Object::Dictionary(page2));

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page1_id.into(), page2_id.into()],
            "Count" => 2,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_lopdf_source_reports_pages() {
        let mut source = LopdfSource::new();
        let info = source.load(&two_page_pdf()).unwrap();

        assert_eq!(info.page_count, 2);
        assert_eq!(info.page(1).unwrap().media_box(), [0.0, 0.0, 612.0, 792.0]);
        assert_eq!(info.page(2).unwrap().media_box(), [0.0, 0.0, 595.0, 842.0]);
        assert!(info.page(3).is_none());
    }

    #[test]
    fn test_lopdf_source_rejects_garbage() {
        let mut source = LopdfSource::new();
        let err = source.load(b"definitely not a pdf").unwrap_err();

        assert!(matches!(err, DesignerError::ParseError(_)));
    }

    #[test]
    fn test_parent_cycle_is_an_error() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        let node_id = doc.new_object_id();

        // No MediaBox anywhere and a node that is its own parent
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => node_id,
            }),
        );
        doc.objects.insert(
            node_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Parent" => node_id,
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();

        let err = LopdfSource::new().load(&buffer).unwrap_err();
        assert_eq!(
            err,
            DesignerError::ParseError("MediaBox inheritance cycle".to_string())
        );
    }

    #[test]
    fn test_page_metadata_aspect_ratio() {
        let page = PageMetadata::new(1, 612.0, 792.0);
        assert!((page.aspect_ratio() - 612.0 / 792.0).abs() < 1e-12);
    }
}
