use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coords::{surface_rect_to_pdf, PdfRect};
use crate::error::DesignerError;
use crate::geometry::Rect;
use crate::source::PageMetadata;

/// Kind of form input a captured region stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Input,
    Textarea,
    Select,
    Checkbox,
    Date,
    Email,
    Toggle,
}

impl FieldType {
    /// Every field type, in selection-menu order
    pub const ALL: [FieldType; 7] = [
        FieldType::Input,
        FieldType::Textarea,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Date,
        FieldType::Email,
        FieldType::Toggle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Input => "Input",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Checkbox => "Checkbox",
            FieldType::Date => "Date",
            FieldType::Email => "Email",
            FieldType::Toggle => "Toggle",
        }
    }

    /// 1-based key used by the field type selection menu
    pub fn option_key(&self) -> u8 {
        match self {
            FieldType::Input => 1,
            FieldType::Textarea => 2,
            FieldType::Select => 3,
            FieldType::Checkbox => 4,
            FieldType::Date => 5,
            FieldType::Email => 6,
            FieldType::Toggle => 7,
        }
    }

    pub fn from_option_key(key: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|ft| ft.option_key() == key)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FieldType {
    type Err = DesignerError;

    /// Accepts a label in any case ("input", "Email") or a menu option key ("1")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(key) = trimmed.parse::<u8>() {
            return Self::from_option_key(key)
                .ok_or_else(|| DesignerError::InvalidField(format!("Unknown field option: {}", key)));
        }

        Self::ALL
            .iter()
            .copied()
            .find(|ft| ft.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DesignerError::InvalidField(format!("Invalid field type: {}", s)))
    }
}

/// A typed, page-anchored rectangle committed to the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Page number (1-indexed)
    pub page: u32,
    /// Normalized rectangle in surface coordinates
    pub coordinates: Rect,
}

impl Field {
    pub fn new(field_type: FieldType, page: u32, coordinates: Rect) -> Self {
        Self {
            field_type,
            page,
            coordinates,
        }
    }

    /// Check the invariants every stored field satisfies
    pub fn validate(&self) -> Result<(), DesignerError> {
        if self.page == 0 {
            return Err(DesignerError::InvalidField(
                "page numbers start at 1".to_string(),
            ));
        }
        if !self.coordinates.is_finite() {
            return Err(DesignerError::InvalidField(format!(
                "{} field on page {} has non-finite coordinates",
                self.field_type, self.page
            )));
        }
        if !self.coordinates.is_normalized() || self.coordinates.is_degenerate() {
            return Err(DesignerError::InvalidField(format!(
                "{} field on page {} has zero or negative size",
                self.field_type, self.page
            )));
        }
        Ok(())
    }

    /// One-line description shown in the field list
    pub fn summary(&self) -> String {
        let c = &self.coordinates;
        format!(
            "{} at ({}, {}) - Width: {}, Height: {} (Page {})",
            self.field_type.label(),
            c.x.round(),
            c.y.round(),
            c.width.round(),
            c.height.round(),
            self.page
        )
    }

    /// Placement in PDF user space
    ///
    /// Coordinates are page units: the page rendered at scale 1 is
    /// `page.width` by `page.height` surface units.
    pub fn to_pdf_rect(&self, page: &PageMetadata) -> PdfRect {
        surface_rect_to_pdf(&self.coordinates, page.width, page.height, page.media_box())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_keys_line_up() {
        for (idx, ft) in FieldType::ALL.iter().enumerate() {
            assert_eq!(ft.option_key() as usize, idx + 1);
            assert_eq!(FieldType::from_option_key(ft.option_key()), Some(*ft));
        }
        assert_eq!(FieldType::from_option_key(0), None);
        assert_eq!(FieldType::from_option_key(8), None);
    }

    #[test]
    fn test_parse_field_type() {
        assert_eq!("input".parse::<FieldType>().unwrap(), FieldType::Input);
        assert_eq!("Email".parse::<FieldType>().unwrap(), FieldType::Email);
        assert_eq!(" TOGGLE ".parse::<FieldType>().unwrap(), FieldType::Toggle);
        assert_eq!("4".parse::<FieldType>().unwrap(), FieldType::Checkbox);
        assert!("signature".parse::<FieldType>().is_err());
        assert!("9".parse::<FieldType>().is_err());
        assert!("".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_json_shape() {
        let field = Field::new(FieldType::Input, 1, Rect::new(10.0, 10.0, 100.0, 50.0));
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(json["type"], "Input");
        assert_eq!(json["page"], 1);
        assert_eq!(json["coordinates"]["x"], 10.0);
        assert_eq!(json["coordinates"]["width"], 100.0);
        assert_eq!(json["coordinates"]["height"], 50.0);
    }

    #[test]
    fn test_summary_rounds_numbers() {
        let field = Field::new(FieldType::Date, 3, Rect::new(10.4, 9.6, 99.5, 50.2));
        assert_eq!(
            field.summary(),
            "Date at (10, 10) - Width: 100, Height: 50 (Page 3)"
        );
    }

    #[test]
    fn test_validate() {
        let ok = Field::new(FieldType::Select, 2, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert!(ok.validate().is_ok());

        let page_zero = Field::new(FieldType::Select, 0, Rect::new(0.0, 0.0, 5.0, 5.0));
        assert!(page_zero.validate().is_err());

        let flat = Field::new(FieldType::Select, 1, Rect::new(0.0, 0.0, 0.0, 5.0));
        assert!(flat.validate().is_err());

        let negative = Field::new(FieldType::Select, 1, Rect::new(0.0, 0.0, -5.0, 5.0));
        assert!(negative.validate().is_err());

        let nan = Field::new(FieldType::Select, 1, Rect::new(f64::NAN, 0.0, 5.0, 5.0));
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_to_pdf_rect() {
        let page = PageMetadata::new(1, 612.0, 792.0);
        let field = Field::new(FieldType::Checkbox, 1, Rect::new(0.0, 0.0, 306.0, 396.0));
        let pdf = field.to_pdf_rect(&page);

        assert!((pdf.x - 0.0).abs() < 1e-9);
        assert!((pdf.y - 396.0).abs() < 1e-9);
        assert!((pdf.width - 306.0).abs() < 1e-9);
        assert!((pdf.height - 396.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_pdf_rect_uses_page_size() {
        let a4 = PageMetadata::new(2, 595.0, 842.0);
        let field = Field::new(FieldType::Date, 2, Rect::new(100.0, 42.0, 200.0, 100.0));
        let pdf = field.to_pdf_rect(&a4);

        assert!((pdf.x - 100.0).abs() < 1e-9);
        assert!((pdf.y - 700.0).abs() < 1e-9);
        assert!((pdf.width - 200.0).abs() < 1e-9);
        assert!((pdf.height - 100.0).abs() < 1e-9);
    }
}
