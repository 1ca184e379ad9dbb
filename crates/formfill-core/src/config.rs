//! Designer configuration
//!
//! Overlay colours, zoom limits and capture thresholds can be tuned from a
//! TOML document. Every section and key is optional.
//!
//! ```toml
//! [overlay.committed]
//! fill = { r = 18, g = 189, b = 18, a = 0.3 }
//! stroke = { r = 0, g = 0, b = 0, a = 1.0 }
//! line_width = 1.0
//!
//! [zoom]
//! step = 0.25
//! min_scale = 0.5
//! max_scale = 4.0
//!
//! [capture]
//! min_size = 2.0
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::navigation::ZoomLimits;
use crate::overlay::OverlayStyles;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignerConfig {
    #[serde(default)]
    pub overlay: OverlayStyles,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// Scale change per zoom in/out (default: 0.25)
    #[serde(default = "default_zoom_step")]
    pub step: f64,
    /// Smallest render scale (default: 0.5)
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Largest render scale (default: 4.0)
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,
}

fn default_zoom_step() -> f64 {
    0.25
}

fn default_min_scale() -> f64 {
    0.5
}

fn default_max_scale() -> f64 {
    4.0
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step: default_zoom_step(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
        }
    }
}

impl From<ZoomConfig> for ZoomLimits {
    fn from(cfg: ZoomConfig) -> Self {
        ZoomLimits {
            step: cfg.step,
            min_scale: cfg.min_scale,
            max_scale: cfg.max_scale,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Drags whose normalized width or height is at or below this are discarded
    #[serde(default)]
    pub min_size: f64,
}

impl DesignerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the limits are inconsistent
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let zoom = &self.zoom;
        if !(zoom.step > 0.0) {
            anyhow::bail!("zoom.step must be positive, got {}", zoom.step);
        }
        if !(zoom.min_scale > 0.0 && zoom.min_scale <= zoom.max_scale) {
            anyhow::bail!(
                "zoom scale range is invalid: min {} max {}",
                zoom.min_scale,
                zoom.max_scale
            );
        }
        if !(self.capture.min_size >= 0.0) {
            anyhow::bail!(
                "capture.min_size must not be negative, got {}",
                self.capture.min_size
            );
        }
        Ok(())
    }
}
