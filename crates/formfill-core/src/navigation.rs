//! Page navigation and zoom bookkeeping

use serde::{Deserialize, Serialize};

/// 1-indexed current page, always clamped to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageNavigator {
    current: u32,
    page_count: u32,
}

impl Default for PageNavigator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PageNavigator {
    pub fn new(page_count: u32) -> Self {
        Self {
            current: 1,
            page_count,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Highest reachable page; an unloaded document still shows page 1
    fn last_page(&self) -> u32 {
        self.page_count.max(1)
    }

    /// Jump to `page`, clamped into range; returns whether the page changed
    pub fn go_to(&mut self, page: u32) -> bool {
        let target = page.clamp(1, self.last_page());
        let changed = target != self.current;
        self.current = target;
        changed
    }

    pub fn go_to_prev(&mut self) -> bool {
        self.go_to(self.current.saturating_sub(1))
    }

    pub fn go_to_next(&mut self) -> bool {
        self.go_to(self.current.saturating_add(1))
    }

    pub fn can_go_prev(&self) -> bool {
        self.current > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.current < self.page_count
    }

    /// New document: back to page 1 with a fresh page count
    pub fn reset(&mut self, page_count: u32) {
        *self = Self::new(page_count);
    }
}

/// Limits for [`Zoom`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub step: f64,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: 0.25,
            min_scale: 0.5,
            max_scale: 4.0,
        }
    }
}

/// Render scale applied to the current page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zoom {
    scale: f64,
    limits: ZoomLimits,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(ZoomLimits::default())
    }
}

impl Zoom {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            scale: 1.0_f64.clamp(limits.min_scale, limits.max_scale),
            limits,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn limits(&self) -> &ZoomLimits {
        &self.limits
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.scale + self.limits.step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.scale - self.limits.step)
    }

    /// Scale so a page `page_width` points wide fills `container_width` pixels
    pub fn fit_to_width(&mut self, container_width: f64, page_width: f64) -> f64 {
        if container_width <= 0.0 || page_width <= 0.0 {
            return self.scale;
        }
        self.set_scale(container_width / page_width)
    }

    /// Set the scale, clamped to the limits; non-finite input is ignored
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if scale.is_finite() {
            self.scale = scale.clamp(self.limits.min_scale, self.limits.max_scale);
        }
        self.scale
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.limits);
    }
}
