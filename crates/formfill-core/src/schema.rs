//! Schema store
//!
//! The schema is the single source of truth for committed fields. Everything
//! the overlay needs per page is projected from it on demand.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coords::PdfRect;
use crate::error::DesignerError;
use crate::field::{Field, FieldType};
use crate::geometry::Rect;
use crate::source::DocumentInfo;

/// Row of the field list shown next to the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldListing {
    pub index: usize,
    pub summary: String,
    pub page: u32,
    pub on_current_page: bool,
}

/// A field positioned in PDF user space, ready for a form filler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfPlacement {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub page: u32,
    pub rect: PdfRect,
}

/// Ordered collection of committed fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    fields: Vec<Field>,
}

impl SchemaDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field at the end; overlapping geometry is allowed
    pub fn append(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Remove and return the most recently appended field, on any page
    pub fn remove_last(&mut self) -> Option<Field> {
        self.fields.pop()
    }

    /// Fields anchored to `page`, in append order
    pub fn fields_for_page(&self, page: u32) -> impl Iterator<Item = &Field> + '_ {
        self.fields.iter().filter(move |f| f.page == page)
    }

    /// Rectangles anchored to `page`, in append order
    pub fn rects_for_page(&self, page: u32) -> impl Iterator<Item = &Rect> + '_ {
        self.fields_for_page(page).map(|f| &f.coordinates)
    }

    /// Full page -> rectangles projection
    pub fn page_index(&self) -> BTreeMap<u32, Vec<Rect>> {
        let mut index: BTreeMap<u32, Vec<Rect>> = BTreeMap::new();
        for field in &self.fields {
            index.entry(field.page).or_default().push(field.coordinates);
        }
        index
    }

    pub fn reset(&mut self) {
        self.fields.clear();
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn last(&self) -> Option<&Field> {
        self.fields.last()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn listing(&self, current_page: u32) -> Vec<FieldListing> {
        self.fields
            .iter()
            .enumerate()
            .map(|(index, field)| FieldListing {
                index,
                summary: field.summary(),
                page: field.page,
                on_current_page: field.page == current_page,
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, DesignerError> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DesignerError> {
        Ok(serde_json::to_string_pretty(&self.fields)?)
    }

    /// Parse a schema, rejecting fields that could never have been committed
    pub fn from_json(json: &str) -> Result<Self, DesignerError> {
        let fields: Vec<Field> = serde_json::from_str(json)?;
        for (idx, field) in fields.iter().enumerate() {
            field
                .validate()
                .map_err(|e| DesignerError::InvalidField(format!("entry {}: {}", idx, e)))?;
        }
        Ok(Self { fields })
    }

    /// Convert every field into PDF user space, each against its own page size
    ///
    /// Fields whose page has no metadata are skipped.
    pub fn to_pdf_placements(&self, document: &DocumentInfo) -> Vec<PdfPlacement> {
        self.fields
            .iter()
            .filter_map(|field| match document.page(field.page) {
                Some(page) => Some(PdfPlacement {
                    field_type: field.field_type,
                    page: field.page,
                    rect: field.to_pdf_rect(page),
                }),
                None => {
                    warn!(page = field.page, "no page metadata, skipping field export");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PageMetadata;

    fn field(ft: FieldType, page: u32, x: f64) -> Field {
        Field::new(ft, page, Rect::new(x, 10.0, 20.0, 10.0))
    }

    #[test]
    fn test_fields_for_page_preserves_order() {
        let mut schema = SchemaDocument::new();
        schema.append(field(FieldType::Input, 1, 1.0));
        schema.append(field(FieldType::Date, 2, 2.0));
        schema.append(field(FieldType::Email, 1, 3.0));

        let page1: Vec<f64> = schema.rects_for_page(1).map(|r| r.x).collect();
        assert_eq!(page1, vec![1.0, 3.0]);
        assert_eq!(schema.fields_for_page(2).count(), 1);
        assert_eq!(schema.fields_for_page(3).count(), 0);
    }

    #[test]
    fn test_remove_last_crosses_pages() {
        let mut schema = SchemaDocument::new();
        schema.append(field(FieldType::Input, 1, 1.0));
        schema.append(field(FieldType::Toggle, 2, 2.0));

        let removed = schema.remove_last().unwrap();
        assert_eq!(removed.page, 2);
        assert_eq!(schema.fields_for_page(2).count(), 0);
        assert_eq!(schema.len(), 1);
    }

    #[test]
    fn test_remove_last_on_empty_is_noop() {
        let mut schema = SchemaDocument::new();
        assert_eq!(schema.remove_last(), None);
        assert!(schema.is_empty());
    }

    #[test]
    fn test_duplicates_allowed() {
        let mut schema = SchemaDocument::new();
        schema.append(field(FieldType::Input, 1, 1.0));
        schema.append(field(FieldType::Input, 1, 1.0));
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_page_index_is_projection() {
        let mut schema = SchemaDocument::new();
        schema.append(field(FieldType::Input, 3, 1.0));
        schema.append(field(FieldType::Input, 1, 2.0));
        schema.append(field(FieldType::Input, 3, 3.0));

        let index = schema.page_index();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&3].iter().map(|r| r.x).collect::<Vec<_>>(), vec![1.0, 3.0]);

        schema.remove_last();
        assert_eq!(schema.page_index()[&3].len(), 1);
    }

    #[test]
    fn test_listing_marks_current_page() {
        let mut schema = SchemaDocument::new();
        schema.append(field(FieldType::Select, 1, 1.0));
        schema.append(field(FieldType::Checkbox, 2, 2.0));

        let rows = schema.listing(2);
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].on_current_page);
        assert!(rows[1].on_current_page);
        assert_eq!(rows[1].index, 1);
        assert!(rows[1].summary.starts_with("Checkbox at (2, 10)"));
    }

    #[test]
    fn test_json_contract() {
        let mut schema = SchemaDocument::new();
        schema.append(Field::new(
            FieldType::Input,
            1,
            Rect::new(10.0, 10.0, 100.0, 50.0),
        ));

        let json = schema.to_json().unwrap();
        assert_eq!(
            json,
            r#"[{"type":"Input","page":1,"coordinates":{"x":10.0,"y":10.0,"width":100.0,"height":50.0}}]"#
        );
        assert_eq!(SchemaDocument::from_json(&json).unwrap(), schema);
    }

    #[test]
    fn test_from_json_rejects_degenerate() {
        let json = r#"[{"type":"Input","page":1,"coordinates":{"x":0,"y":0,"width":0,"height":40}}]"#;
        let err = SchemaDocument::from_json(json).unwrap_err();
        assert!(matches!(err, DesignerError::InvalidField(_)));
    }

    #[test]
    fn test_from_json_rejects_unknown_type() {
        let json = r#"[{"type":"Signature","page":1,"coordinates":{"x":0,"y":0,"width":5,"height":5}}]"#;
        let err = SchemaDocument::from_json(json).unwrap_err();
        assert!(matches!(err, DesignerError::SerializationError(_)));
    }

    #[test]
    fn test_pdf_placements_skip_unknown_pages() {
        let mut schema = SchemaDocument::new();
        schema.append(Field::new(FieldType::Input, 1, Rect::new(0.0, 0.0, 612.0, 792.0)));
        schema.append(Field::new(FieldType::Input, 5, Rect::new(0.0, 0.0, 10.0, 10.0)));

        let doc = DocumentInfo {
            page_count: 1,
            pages: vec![PageMetadata::new(1, 612.0, 792.0)],
        };
        let placements = schema.to_pdf_placements(&doc);

        assert_eq!(placements.len(), 1);
        assert_eq!(placements[0].page, 1);
        assert!((placements[0].rect.height - 792.0).abs() < 1e-9);
    }

    #[test]
    fn test_pdf_placements_per_page_size() {
        let mut schema = SchemaDocument::new();
        schema.append(Field::new(FieldType::Input, 1, Rect::new(0.0, 0.0, 612.0, 792.0)));
        schema.append(Field::new(FieldType::Input, 2, Rect::new(0.0, 0.0, 595.0, 842.0)));

        let doc = DocumentInfo {
            page_count: 2,
            pages: vec![
                PageMetadata::new(1, 612.0, 792.0),
                PageMetadata::new(2, 595.0, 842.0),
            ],
        };
        let placements = schema.to_pdf_placements(&doc);

        // Full-page fields cover each page exactly
        assert!((placements[0].rect.width - 612.0).abs() < 1e-9);
        assert!((placements[1].rect.width - 595.0).abs() < 1e-9);
        assert!((placements[1].rect.height - 842.0).abs() < 1e-9);
        assert!(placements[1].rect.y.abs() < 1e-9);
    }
}
