//! Form field designer core
//!
//! State and coordinate logic for drawing form-field regions on top of a
//! rendered PDF page and exporting them as a JSON schema.
//!
//! - [`session::DesignerSession`]: owns document, page, zoom, capture and schema
//! - [`capture::RegionCapture`]: arm / drag / classify state machine
//! - [`overlay`]: declarative overlay reconciliation against a drawing surface
//! - [`source::LopdfSource`]: page count and media boxes via lopdf
//!
//! Rendering and drawing are supplied by the host through the
//! [`source::PageRenderer`] and [`overlay::OverlaySurface`] traits.

pub mod capture;
pub mod config;
pub mod coords;
pub mod error;
pub mod field;
pub mod geometry;
pub mod navigation;
pub mod overlay;
pub mod schema;
pub mod session;
pub mod source;

pub use capture::{CaptureState, PointerUpOutcome, RegionCapture};
pub use config::DesignerConfig;
pub use coords::PdfRect;
pub use error::{CaptureError, DesignerError};
pub use field::{Field, FieldType};
pub use geometry::{map_client_point, Point, Rect, SurfaceGeometry};
pub use navigation::{PageNavigator, Zoom, ZoomLimits};
pub use overlay::{OverlayStyles, OverlaySurface, RenderPlan, Rgba, ScaledSurface, ShapeStyle};
pub use schema::{FieldListing, PdfPlacement, SchemaDocument};
pub use session::{DesignerSession, DocumentStatus, LoadOutcome, LoadTicket};
pub use source::{DocumentInfo, DocumentSource, LopdfSource, PageMetadata, PageRenderer};

/// Parse PDF bytes and return page count
pub fn get_page_count(bytes: &[u8]) -> Result<u32, DesignerError> {
    let mut source = LopdfSource::new();
    Ok(source.load(bytes)?.page_count)
}
