//! Mirror Paint
//!
//! A software canvas for the drawn widgets of a smart mirror dashboard:
//! progress rings, number lines and the panel rotator that cycles embedded
//! widgets on a timer.
//!
//! # Features
//!
//! - **Progress rings**: thin track plus thick arc, double-buffered so the
//!   visible surface changes in exactly one copy per redraw
//! - **Explicit drawing context**: a canvas-like [`rendering::Context2d`]
//!   over plain RGBA surfaces, resolved by id through a registry
//! - **Deterministic output**: identical input yields identical pixels, with
//!   PNG export and SHA-256 digests for golden tests
//!
//! # Example
//!
//! ```
//! use mirrorpaint::rendering::{Surface, SurfaceRegistry};
//! use mirrorpaint::MirrorConfig;
//!
//! let config = MirrorConfig::default();
//! let renderer = config.ring_renderer();
//!
//! let mut surfaces = SurfaceRegistry::new();
//! surfaces.insert("activity_ring", Surface::new(100, 100));
//! renderer.draw_progress(&mut surfaces, "activity_ring", 0.5);
//!
//! let png = surfaces.get("activity_ring").unwrap().to_screenshot().unwrap();
//! assert_eq!(png.width, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod activity;
pub mod number_line;
pub mod progress;
pub mod rendering;
pub mod rotator;
pub mod schedule;

pub use number_line::NumberLineStyle;
pub use progress::{FractionPolicy, ProgressRingRenderer, RingGeometry, RingStyle};
pub use rotator::{Rotator, WidgetRotator};

use rendering::{SurfaceRegistry, SurfaceSpec};

/// Configuration for the mirror widgets
///
/// Every field has a default matching the stock dashboard, so a config file
/// only needs the values it changes:
/// - rings use a 1px track and a 6px round-capped white arc
/// - out-of-range fractions are clamped
/// - panels rotate every 30 seconds
///
/// # Examples
///
/// ```
/// let cfg = mirrorpaint::MirrorConfig::from_json_str(r#"{"rotator_interval_ms": 5000}"#).unwrap();
/// assert_eq!(cfg.rotator_interval_ms, 5000);
/// assert_eq!(cfg.ring.thick_line_width, 6.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Progress ring strokes
    pub ring: RingStyle,
    /// Handling of fractions outside [0, 1]
    pub fraction_policy: FractionPolicy,
    /// Number line appearance
    pub number_line: NumberLineStyle,
    /// Milliseconds between panel rotations
    pub rotator_interval_ms: u64,
    /// Milliseconds between ring redraws in watch mode
    pub redraw_interval_ms: u64,
    /// Surfaces to create up front, by id
    pub surfaces: Vec<SurfaceSpec>,
}

/// Largest stroke width or font size, in pixels, a config may ask for.
pub const MAX_STROKE_PX: f64 = 1024.0;
/// Largest surface edge, in pixels, a config may declare.
pub const MAX_SURFACE_EDGE: u32 = 16_384;

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            ring: RingStyle::default(),
            fraction_policy: FractionPolicy::default(),
            number_line: NumberLineStyle::default(),
            rotator_interval_ms: 30_000,
            redraw_interval_ms: 60_000,
            surfaces: Vec::new(),
        }
    }
}

impl MirrorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: MirrorConfig =
            serde_json::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("ring.thin_line_width", self.ring.thin_line_width),
            ("ring.thick_line_width", self.ring.thick_line_width),
            ("number_line.line_width", self.number_line.line_width),
            ("number_line.font_px", self.number_line.font_px),
        ];
        for (name, v) in widths {
            if !(v.is_finite() && v > 0.0 && v <= MAX_STROKE_PX) {
                return Err(Error::ConfigError(format!(
                    "{} must be in (0, {}], got {}",
                    name, MAX_STROKE_PX, v
                )));
            }
        }
        if self.rotator_interval_ms == 0 || self.redraw_interval_ms == 0 {
            return Err(Error::ConfigError("intervals must be non-zero".into()));
        }
        for s in &self.surfaces {
            if s.width == 0 || s.height == 0 {
                return Err(Error::ConfigError(format!("surface {} has zero size", s.id)));
            }
            if s.width > MAX_SURFACE_EDGE || s.height > MAX_SURFACE_EDGE {
                return Err(Error::ConfigError(format!(
                    "surface {} exceeds {}px",
                    s.id, MAX_SURFACE_EDGE
                )));
            }
        }
        Ok(())
    }

    pub fn ring_renderer(&self) -> ProgressRingRenderer {
        ProgressRingRenderer::new(self.ring.clone(), self.fraction_policy)
    }

    pub fn surface_registry(&self) -> SurfaceRegistry {
        SurfaceRegistry::from_specs(&self.surfaces)
    }
}
