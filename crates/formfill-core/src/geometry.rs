//! Surface geometry and pointer coordinate mapping
//!
//! Pointer events arrive in viewport pixels. The overlay canvas may be
//! displayed at a different size than its backing pixel grid, so every
//! pointer position is mapped into the surface's intrinsic coordinate space
//! before it reaches the capture state machine.

use serde::{Deserialize, Serialize};

/// A position in surface (intrinsic) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface coordinates
///
/// `width` and `height` may be negative while a drag is still in progress;
/// use [`Rect::from_corners`] to obtain the normalized form that is stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanning two drag corners
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Signed rectangle anchored at the drag start, as drawn during a live drag
    pub fn from_drag(start: Point, end: Point) -> Self {
        Self {
            x: start.x,
            y: start.y,
            width: end.x - start.x,
            height: end.y - start.y,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn is_normalized(&self) -> bool {
        self.width >= 0.0 && self.height >= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    pub fn area(&self) -> f64 {
        (self.width * self.height).abs()
    }
}

/// Placement and size of a mounted rendering surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Left edge of the displayed surface in viewport pixels
    pub left: f64,
    /// Top edge of the displayed surface in viewport pixels
    pub top: f64,
    /// Displayed (CSS) width
    pub display_width: f64,
    /// Displayed (CSS) height
    pub display_height: f64,
    /// Backing pixel width
    pub intrinsic_width: f64,
    /// Backing pixel height
    pub intrinsic_height: f64,
}

impl SurfaceGeometry {
    /// Surface displayed at its intrinsic size at the viewport origin
    pub fn unscaled(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            display_width: width,
            display_height: height,
            intrinsic_width: width,
            intrinsic_height: height,
        }
    }

    /// Whether the surface has a size that pointer positions can be mapped against
    pub fn is_mounted(&self) -> bool {
        self.display_width > 0.0
            && self.display_height > 0.0
            && self.intrinsic_width > 0.0
            && self.intrinsic_height > 0.0
    }

    pub fn scale_x(&self) -> f64 {
        self.intrinsic_width / self.display_width
    }

    pub fn scale_y(&self) -> f64 {
        self.intrinsic_height / self.display_height
    }
}

/// Map a pointer position in viewport pixels to surface intrinsic units
///
/// Returns the origin when the surface is not mounted or has no size yet,
/// so a drag started before layout collapses into a degenerate rectangle.
pub fn map_client_point(client_x: f64, client_y: f64, surface: Option<&SurfaceGeometry>) -> Point {
    match surface {
        Some(geometry) if geometry.is_mounted() => Point {
            x: (client_x - geometry.left) * geometry.scale_x(),
            y: (client_y - geometry.top) * geometry.scale_y(),
        },
        _ => Point::ORIGIN,
    }
}
