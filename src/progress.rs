//! Circular progress ring renderer
//!
//! A ring is a thin full-circle track with a thick arc on top whose sweep is
//! proportional to a completion fraction. Drawing happens on a scratch
//! surface that is copied onto the visible surface in one step, so callers
//! never observe the track without its arc.
//!
//! ```
//! use mirrorpaint::progress::ProgressRingRenderer;
//! use mirrorpaint::rendering::{Surface, SurfaceRegistry};
//!
//! let mut surfaces = SurfaceRegistry::new();
//! surfaces.insert("steps", Surface::new(64, 64));
//!
//! let renderer = ProgressRingRenderer::default();
//! renderer.draw_progress(&mut surfaces, "steps", 0.25);
//! assert!(surfaces.get("steps").unwrap().painted_pixel_count() > 0);
//! ```

use std::f64::consts::{FRAC_PI_2, TAU};

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::rendering::{CompositeOp, Context2d, LineCap, Rgba, Surface, SurfaceLookup};
use crate::{Error, Result};

/// What to do with fractions outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionPolicy {
    /// Saturate into `[0, 1]`; NaN becomes 0.
    #[default]
    Clamp,
    /// Keep only the fractional turn (1.25 draws like 0.25); NaN becomes 0.
    Wrap,
    /// Refuse to draw.
    Reject,
}

impl FractionPolicy {
    pub fn apply(self, fraction: f64) -> Result<f64> {
        if (0.0..=1.0).contains(&fraction) {
            return Ok(fraction);
        }
        match self {
            FractionPolicy::Clamp if fraction.is_nan() => Ok(0.0),
            FractionPolicy::Clamp => Ok(fraction.clamp(0.0, 1.0)),
            FractionPolicy::Wrap if !fraction.is_finite() => Ok(0.0),
            FractionPolicy::Wrap => Ok(fraction.rem_euclid(1.0)),
            FractionPolicy::Reject => Err(Error::InvalidFraction(fraction)),
        }
    }
}

/// Stroke parameters shared by the track and the progress arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingStyle {
    pub thin_line_width: f64,
    pub thick_line_width: f64,
    pub color: Rgba,
    pub line_cap: LineCap,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            thin_line_width: 1.0,
            thick_line_width: 6.0,
            color: Rgba::WHITE,
            line_cap: LineCap::Round,
        }
    }
}

/// Ring placement derived from the surface size on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl RingGeometry {
    /// Quarter turn subtracted from every angle so that 0 points north.
    pub const ROTATION: f64 = FRAC_PI_2;

    /// `None` when the thick stroke leaves no positive radius.
    pub fn new(width: u32, height: u32, thick_line_width: f64) -> Option<Self> {
        let radius = height as f64 / 2.0 - thick_line_width / 2.0;
        (radius > 0.0).then(|| Self {
            center_x: width as f64 / 2.0,
            center_y: height as f64 / 2.0,
            radius,
        })
    }

    /// Canvas angles of the full background track.
    pub fn track_span(&self) -> (f64, f64) {
        (-Self::ROTATION, TAU - Self::ROTATION)
    }

    /// Canvas angles of the progress arc for `fraction`.
    pub fn progress_span(&self, fraction: f64) -> (f64, f64) {
        (-Self::ROTATION, TAU * fraction - Self::ROTATION)
    }
}

/// Stroke one arc: the primitive behind both the track and the progress arc.
#[allow(clippy::too_many_arguments)]
pub fn draw_arc(
    ctx: &mut Context2d<'_>,
    x: f64,
    y: f64,
    radius: f64,
    start: f64,
    end: f64,
    line_width: f64,
    style: &RingStyle,
) -> Result<()> {
    ctx.set_stroke_style(style.color)
        .set_line_width(line_width)
        .set_line_cap(style.line_cap)
        .begin_path();
    ctx.arc(x, y, radius, start, end)?;
    ctx.stroke();
    Ok(())
}

/// Draw track and progress arc onto `ctx`. Returns `false` when the surface
/// is too small to hold a ring.
pub fn draw_progress_ring(
    ctx: &mut Context2d<'_>,
    fraction: f64,
    style: &RingStyle,
) -> Result<bool> {
    let Some(g) = RingGeometry::new(ctx.width(), ctx.height(), style.thick_line_width) else {
        return Ok(false);
    };
    let (start, end) = g.track_span();
    draw_arc(ctx, g.center_x, g.center_y, g.radius, start, end, style.thin_line_width, style)?;
    let (start, end) = g.progress_span(fraction);
    draw_arc(ctx, g.center_x, g.center_y, g.radius, start, end, style.thick_line_width, style)?;
    Ok(true)
}

/// Parse a fraction from text: `0.42` or `42%`.
pub fn parse_fraction(text: &str) -> Result<f64> {
    let text = text.trim();
    let bad = |_| Error::ParseError(format!("not a fraction: {:?}", text));
    match text.strip_suffix('%') {
        Some(pct) => Ok(pct.trim().parse::<f64>().map_err(bad)? / 100.0),
        None => text.parse::<f64>().map_err(bad),
    }
}

/// Double-buffered progress ring renderer.
#[derive(Debug, Clone, Default)]
pub struct ProgressRingRenderer {
    style: RingStyle,
    policy: FractionPolicy,
}

impl ProgressRingRenderer {
    pub fn new(style: RingStyle, policy: FractionPolicy) -> Self {
        Self { style, policy }
    }

    pub fn style(&self) -> &RingStyle {
        &self.style
    }

    pub fn policy(&self) -> FractionPolicy {
        self.policy
    }

    /// Draw the ring for `fraction` onto the surface registered as
    /// `surface_id`. Failures are logged and the call becomes a no-op; the
    /// caller is expected to retry on its next tick.
    pub fn draw_progress<L>(&self, surfaces: &mut L, surface_id: &str, fraction: f64)
    where
        L: SurfaceLookup + ?Sized,
    {
        if let Err(e) = self.try_draw_progress(surfaces, surface_id, fraction) {
            error!("{}", e);
        }
    }

    /// Like [`draw_progress`](Self::draw_progress) but hands the error back
    /// instead of logging it. The visible surface is untouched on error.
    pub fn try_draw_progress<L>(
        &self,
        surfaces: &mut L,
        surface_id: &str,
        fraction: f64,
    ) -> Result<()>
    where
        L: SurfaceLookup + ?Sized,
    {
        let target = surfaces
            .surface_mut(surface_id)
            .ok_or_else(|| Error::SurfaceNotFound(surface_id.to_string()))?;
        let fraction = self.policy.apply(fraction)?;

        let (scratch, drawn) = self.render_ring(target.width(), target.height(), fraction)?;
        if drawn {
            info!("Drawing progress: {} {}", surface_id, fraction);
        } else {
            warn!(
                "Surface {} ({}x{}) too small for a progress ring",
                surface_id,
                target.width(),
                target.height()
            );
        }
        Context2d::new(target).draw_image(&scratch, 0, 0, CompositeOp::Copy);
        Ok(())
    }

    fn render_ring(&self, width: u32, height: u32, fraction: f64) -> Result<(Surface, bool)> {
        let mut scratch = Surface::new(width, height);
        let mut ctx = Context2d::new(&mut scratch);
        ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
        let drawn = draw_progress_ring(&mut ctx, fraction, &self.style)?;
        Ok((scratch, drawn))
    }

    /// Render a ring onto a fresh surface, bypassing id lookup.
    pub fn render(&self, width: u32, height: u32, fraction: f64) -> Result<Surface> {
        let fraction = self.policy.apply(fraction)?;
        Ok(self.render_ring(width, height, fraction)?.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::SurfaceRegistry;

    #[test]
    fn clamp_policy_saturates() {
        let p = FractionPolicy::Clamp;
        assert_eq!(p.apply(0.3).unwrap(), 0.3);
        assert_eq!(p.apply(-0.5).unwrap(), 0.0);
        assert_eq!(p.apply(7.0).unwrap(), 1.0);
        assert_eq!(p.apply(f64::NAN).unwrap(), 0.0);
        assert_eq!(p.apply(f64::INFINITY).unwrap(), 1.0);
    }

    #[test]
    fn wrap_policy_keeps_fractional_turn() {
        let p = FractionPolicy::Wrap;
        assert_eq!(p.apply(1.0).unwrap(), 1.0);
        assert!((p.apply(1.25).unwrap() - 0.25).abs() < 1e-12);
        assert!((p.apply(-0.25).unwrap() - 0.75).abs() < 1e-12);
        assert_eq!(p.apply(f64::NEG_INFINITY).unwrap(), 0.0);
    }

    #[test]
    fn reject_policy_errors_out_of_range() {
        let p = FractionPolicy::Reject;
        assert_eq!(p.apply(0.0).unwrap(), 0.0);
        assert!(matches!(p.apply(1.5), Err(Error::InvalidFraction(_))));
        assert!(p.apply(f64::NAN).is_err());
    }

    #[test]
    fn geometry_from_surface_size() {
        let g = RingGeometry::new(120, 100, 6.0).unwrap();
        assert_eq!((g.center_x, g.center_y, g.radius), (60.0, 50.0, 47.0));
        assert!(RingGeometry::new(10, 6, 6.0).is_none());
        let (s, e) = g.progress_span(0.5);
        assert_eq!(s, -FRAC_PI_2);
        assert!((e - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn parse_fraction_accepts_percent() {
        assert_eq!(parse_fraction(" 0.5\n").unwrap(), 0.5);
        assert_eq!(parse_fraction("42%").unwrap(), 0.42);
        assert!(parse_fraction("half").is_err());
    }

    #[test]
    fn missing_surface_is_reported() {
        let mut surfaces = SurfaceRegistry::new();
        let r = ProgressRingRenderer::default();
        let err = r.try_draw_progress(&mut surfaces, "nope", 0.5).unwrap_err();
        assert!(matches!(err, Error::SurfaceNotFound(ref id) if id == "nope"));
        // the logging twin must not panic
        r.draw_progress(&mut surfaces, "nope", 0.5);
    }

    #[test]
    fn rejected_fraction_leaves_surface_untouched() {
        let mut surfaces = SurfaceRegistry::new();
        surfaces.insert("ring", Surface::new(40, 40));
        ProgressRingRenderer::default().draw_progress(&mut surfaces, "ring", 0.5);
        let before = surfaces.get("ring").unwrap().digest();

        let strict = ProgressRingRenderer::new(RingStyle::default(), FractionPolicy::Reject);
        assert!(strict.try_draw_progress(&mut surfaces, "ring", 2.0).is_err());
        assert_eq!(surfaces.get("ring").unwrap().digest(), before);
    }

    #[test]
    fn tiny_surface_is_cleared() {
        let mut surfaces = SurfaceRegistry::new();
        let mut s = Surface::new(4, 4);
        s.set_pixel(0, 0, Rgba::WHITE);
        surfaces.insert("tiny", s);
        ProgressRingRenderer::default()
            .try_draw_progress(&mut surfaces, "tiny", 0.5)
            .unwrap();
        assert_eq!(surfaces.get("tiny").unwrap().painted_pixel_count(), 0);
    }
}
