//! Overlay reconciliation for field rectangles
//!
//! The overlay is computed, not mutated: given the schema, the current page
//! and the live drag, [`desired_shapes`] says what should be on screen.
//! [`OverlayReconciler`] diffs that against the last frame it drew and
//! issues the minimum surface calls a clear-and-paint canvas allows.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::Rect;
use crate::schema::SchemaDocument;

/// RGBA colour with straight alpha in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(..)` notation, as canvas fill and stroke styles expect
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub fill: Rgba,
    pub stroke: Rgba,
    pub line_width: f64,
}

/// Styles for committed fields and for the rectangle being dragged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyles {
    #[serde(default = "default_committed_style")]
    pub committed: ShapeStyle,
    #[serde(default = "default_live_style")]
    pub live: ShapeStyle,
}

impl Default for OverlayStyles {
    fn default() -> Self {
        Self {
            committed: default_committed_style(),
            live: default_live_style(),
        }
    }
}

fn default_committed_style() -> ShapeStyle {
    ShapeStyle {
        fill: Rgba::new(18, 189, 18, 0.3),
        stroke: Rgba::new(0, 0, 0, 1.0),
        line_width: 1.0,
    }
}

fn default_live_style() -> ShapeStyle {
    ShapeStyle {
        fill: Rgba::new(0, 0, 255, 0.2),
        stroke: Rgba::new(0, 0, 0, 1.0),
        line_width: 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Committed,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayShape {
    pub rect: Rect,
    pub kind: ShapeKind,
}

impl OverlayShape {
    pub fn style<'a>(&self, styles: &'a OverlayStyles) -> &'a ShapeStyle {
        match self.kind {
            ShapeKind::Committed => &styles.committed,
            ShapeKind::Live => &styles.live,
        }
    }
}

/// Drawing capability supplied by the rendering collaborator
pub trait OverlaySurface {
    fn clear(&mut self);
    fn draw_rectangle(&mut self, rect: &Rect, style: &ShapeStyle);
}

/// Paints page-unit shapes onto a surface rendered at `scale`
pub struct ScaledSurface<'a, S: OverlaySurface + ?Sized> {
    inner: &'a mut S,
    scale: f64,
}

impl<'a, S: OverlaySurface + ?Sized> ScaledSurface<'a, S> {
    pub fn new(inner: &'a mut S, scale: f64) -> Self {
        Self { inner, scale }
    }
}

impl<S: OverlaySurface + ?Sized> OverlaySurface for ScaledSurface<'_, S> {
    fn clear(&mut self) {
        self.inner.clear();
    }

    fn draw_rectangle(&mut self, rect: &Rect, style: &ShapeStyle) {
        let scaled = Rect::new(
            rect.x * self.scale,
            rect.y * self.scale,
            rect.width * self.scale,
            rect.height * self.scale,
        );
        self.inner.draw_rectangle(&scaled, style);
    }
}

/// Shapes that should be visible: committed rects for `page`, then the live drag
pub fn desired_shapes(
    schema: &SchemaDocument,
    page: u32,
    live: Option<Rect>,
) -> Vec<OverlayShape> {
    schema
        .rects_for_page(page)
        .map(|rect| OverlayShape {
            rect: *rect,
            kind: ShapeKind::Committed,
        })
        .chain(live.map(|rect| OverlayShape {
            rect,
            kind: ShapeKind::Live,
        }))
        .collect()
}

/// What a reconcile pass did to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum RenderPlan {
    /// Surface already shows the desired shapes
    Unchanged,
    /// Only new trailing shapes were painted
    Append { drawn: usize },
    /// Surface was cleared and every shape painted
    Redraw { drawn: usize },
}

/// Remembers the last frame so repeated redraws are free
#[derive(Debug, Clone, Default)]
pub struct OverlayReconciler {
    rendered: Option<Vec<OverlayShape>>,
}

impl OverlayReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the last frame; the next reconcile repaints from scratch
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    pub fn rendered(&self) -> Option<&[OverlayShape]> {
        self.rendered.as_deref()
    }

    pub fn reconcile<S: OverlaySurface + ?Sized>(
        &mut self,
        desired: Vec<OverlayShape>,
        styles: &OverlayStyles,
        surface: &mut S,
    ) -> RenderPlan {
        let plan = match &self.rendered {
            Some(previous) if *previous == desired => RenderPlan::Unchanged,
            Some(previous) if desired.len() > previous.len() && desired.starts_with(previous) => {
                for shape in &desired[previous.len()..] {
                    surface.draw_rectangle(&shape.rect, shape.style(styles));
                }
                RenderPlan::Append {
                    drawn: desired.len() - previous.len(),
                }
            }
            _ => {
                surface.clear();
                for shape in &desired {
                    surface.draw_rectangle(&shape.rect, shape.style(styles));
                }
                RenderPlan::Redraw {
                    drawn: desired.len(),
                }
            }
        };

        if plan != RenderPlan::Unchanged {
            debug!(?plan, shapes = desired.len(), "overlay reconciled");
        }
        self.rendered = Some(desired);
        plan
    }
}
