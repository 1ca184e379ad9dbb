//! Designer session
//!
//! Owns everything one editing session needs: the loaded document, page
//! navigation, zoom, the capture state machine, the schema and the overlay
//! reconciler. Hosts feed it pointer and toolbar events and ask it to redraw.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::capture::{CaptureState, PointerUpOutcome, RegionCapture};
use crate::config::DesignerConfig;
use crate::error::DesignerError;
use crate::field::{Field, FieldType};
use crate::geometry::{map_client_point, Point, SurfaceGeometry};
use crate::navigation::{PageNavigator, Zoom};
use crate::overlay::{
    desired_shapes, OverlayReconciler, OverlaySurface, RenderPlan, ScaledSurface,
};
use crate::schema::{FieldListing, PdfPlacement, SchemaDocument};
use crate::source::{DocumentInfo, DocumentSource, PageRenderer};

/// Issued by [`DesignerSession::begin_load`]; only the latest ticket may complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded { page_count: u32 },
    Failed,
    /// A newer load was started; this completion was dropped
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Empty,
    Loading,
    Ready,
}

#[derive(Debug, Default)]
pub struct DesignerSession {
    config: DesignerConfig,
    document: Option<DocumentInfo>,
    load_generation: u64,
    pending_load: Option<u64>,
    last_error: Option<String>,
    navigator: PageNavigator,
    zoom: Zoom,
    capture: RegionCapture,
    schema: SchemaDocument,
    reconciler: OverlayReconciler,
}

impl DesignerSession {
    pub fn new() -> Self {
        Self::with_config(DesignerConfig::default())
    }

    pub fn with_config(config: DesignerConfig) -> Self {
        Self {
            zoom: Zoom::new(config.zoom.into()),
            capture: RegionCapture::with_min_size(config.capture.min_size),
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// Start a load; any completion for an earlier ticket becomes stale
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.pending_load = Some(self.load_generation);
        debug!(generation = self.load_generation, "document load started");
        LoadTicket {
            generation: self.load_generation,
        }
    }

    /// Apply the result of a load started with `ticket`
    ///
    /// A successful load replaces the document and resets schema, page and
    /// capture. A failed load records the error and leaves the previous
    /// document and schema as they were.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DocumentInfo, DesignerError>,
    ) -> LoadOutcome {
        if ticket.generation != self.load_generation {
            warn!(
                generation = ticket.generation,
                latest = self.load_generation,
                "ignoring stale document load"
            );
            return LoadOutcome::Stale;
        }
        self.pending_load = None;

        let info = match result {
            Ok(info) if info.page_count == 0 => {
                return self.fail_load(DesignerError::ParseError(
                    "document has no pages".to_string(),
                ))
            }
            Ok(info) => info,
            Err(e) => return self.fail_load(e),
        };

        let page_count = info.page_count;
        self.schema.reset();
        self.navigator.reset(page_count);
        self.capture.reset();
        self.reconciler.invalidate();
        self.last_error = None;
        self.document = Some(info);

        info!(page_count, generation = ticket.generation, "document loaded");
        LoadOutcome::Loaded { page_count }
    }

    fn fail_load(&mut self, err: DesignerError) -> LoadOutcome {
        warn!(error = %err, "document load failed");
        self.last_error = Some(err.to_string());
        LoadOutcome::Failed
    }

    /// Load synchronously through `source`
    pub fn load_with<S: DocumentSource + ?Sized>(
        &mut self,
        source: &mut S,
        bytes: &[u8],
    ) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = source.load(bytes);
        self.complete_load(ticket, result)
    }

    pub fn status(&self) -> DocumentStatus {
        match (&self.pending_load, &self.document) {
            (Some(_), _) => DocumentStatus::Loading,
            (None, Some(_)) => DocumentStatus::Ready,
            (None, None) => DocumentStatus::Empty,
        }
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    fn require_document(&self) -> Result<&DocumentInfo, DesignerError> {
        self.document.as_ref().ok_or(DesignerError::NoDocument)
    }

    /// Render the current page; failures are also kept for display
    pub fn render_current_page<R: PageRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        target: &mut R::Target,
    ) -> Result<(), DesignerError> {
        self.require_document()?;
        let page = self.navigator.current();

        match renderer.render_page(page, target) {
            Ok(()) => {
                self.reconciler.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(page, error = %e, "page render failed");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Record a render failure reported by an asynchronous host
    pub fn report_render_failure(&mut self, message: &str) {
        let err = DesignerError::Render(message.to_string());
        warn!(error = %err, "page render failed");
        self.last_error = Some(err.to_string());
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Reconcile the overlay for the current page and live drag
    ///
    /// Shapes are kept in page units and painted at the current zoom.
    pub fn redraw<S: OverlaySurface + ?Sized>(&mut self, surface: &mut S) -> RenderPlan {
        let desired = desired_shapes(
            &self.schema,
            self.navigator.current(),
            self.capture.live_rect(),
        );
        let mut scaled = ScaledSurface::new(surface, self.zoom.scale());
        self.reconciler
            .reconcile(desired, &self.config.overlay, &mut scaled)
    }

    /// Force the next redraw to repaint everything (surface resized or replaced)
    pub fn invalidate_overlay(&mut self) {
        self.reconciler.invalidate();
    }

    pub fn arm_selection(&mut self) -> Result<(), DesignerError> {
        self.require_document()?;
        self.capture.arm()?;
        Ok(())
    }

    pub fn pointer_down(
        &mut self,
        client_x: f64,
        client_y: f64,
        surface: Option<&SurfaceGeometry>,
    ) -> Result<(), DesignerError> {
        self.require_document()?;
        let point = self.page_point(client_x, client_y, surface);
        self.capture.pointer_down(point)?;
        Ok(())
    }

    /// Returns whether the live rectangle moved (and the overlay needs a redraw)
    pub fn pointer_move(
        &mut self,
        client_x: f64,
        client_y: f64,
        surface: Option<&SurfaceGeometry>,
    ) -> bool {
        let point = self.page_point(client_x, client_y, surface);
        self.capture.pointer_move(point)
    }

    /// Surface pixels rendered at the current zoom, back in scale-1 page units
    fn page_point(
        &self,
        client_x: f64,
        client_y: f64,
        surface: Option<&SurfaceGeometry>,
    ) -> Point {
        let point = map_client_point(client_x, client_y, surface);
        let scale = self.zoom.scale();
        Point::new(point.x / scale, point.y / scale)
    }

    pub fn pointer_up(&mut self) -> PointerUpOutcome {
        self.capture.pointer_up()
    }

    /// Commit the pending rectangle as a field on the current page
    pub fn classify(&mut self, field_type: FieldType) -> Result<Field, DesignerError> {
        let page = self.navigator.current();
        let field = self.capture.classify(field_type, page)?;
        info!(field_type = %field_type, page, "field committed");
        self.schema.append(field.clone());
        Ok(field)
    }

    pub fn cancel_capture(&mut self) {
        self.capture.cancel();
    }

    pub fn capture_state(&self) -> &CaptureState {
        self.capture.state()
    }

    /// Remove the most recent field on any page
    pub fn undo_last(&mut self) -> Option<Field> {
        let removed = self.schema.remove_last();
        match &removed {
            Some(field) => info!(page = field.page, "undid last field"),
            None => debug!("nothing to undo"),
        }
        removed
    }

    pub fn schema(&self) -> &SchemaDocument {
        &self.schema
    }

    pub fn listing(&self) -> Vec<FieldListing> {
        self.schema.listing(self.navigator.current())
    }

    pub fn export_json(&self) -> Result<String, DesignerError> {
        self.schema.to_json()
    }

    /// Schema in PDF user space
    pub fn pdf_placements(&self) -> Result<Vec<PdfPlacement>, DesignerError> {
        let document = self.require_document()?;
        Ok(self.schema.to_pdf_placements(document))
    }

    pub fn current_page(&self) -> u32 {
        self.navigator.current()
    }

    pub fn page_count(&self) -> u32 {
        self.navigator.page_count()
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn go_to_prev_page(&mut self) -> bool {
        let changed = self.navigator.go_to_prev();
        self.after_navigation(changed)
    }

    pub fn go_to_next_page(&mut self) -> bool {
        let changed = self.navigator.go_to_next();
        self.after_navigation(changed)
    }

    pub fn go_to_page(&mut self, page: u32) -> bool {
        let changed = self.navigator.go_to(page);
        self.after_navigation(changed)
    }

    /// A rectangle drawn on one page must not be committed to another
    fn after_navigation(&mut self, changed: bool) -> bool {
        if changed && self.capture.discard_in_progress() {
            debug!(
                page = self.navigator.current(),
                "discarded in-progress capture on navigation"
            );
        }
        changed
    }

    pub fn scale(&self) -> f64 {
        self.zoom.scale()
    }

    pub fn zoom_in(&mut self) -> f64 {
        let scale = self.zoom.zoom_in();
        self.reconciler.invalidate();
        scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        let scale = self.zoom.zoom_out();
        self.reconciler.invalidate();
        scale
    }

    /// Fit the current page's width into `container_width` pixels
    pub fn fit_to_width(&mut self, container_width: f64) -> f64 {
        let page_width = self
            .document
            .as_ref()
            .and_then(|doc| doc.page(self.navigator.current()))
            .map(|page| page.width);

        match page_width {
            Some(width) => {
                let scale = self.zoom.fit_to_width(container_width, width);
                self.reconciler.invalidate();
                scale
            }
            None => self.zoom.scale(),
        }
    }
}
