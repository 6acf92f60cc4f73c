/// Explicit 2D drawing context over a `Surface`
///
/// Mirrors the subset of the HTML canvas API the dashboard widgets use. All
/// state lives on the context value; setters return `&mut Self` so a drawing
/// can be written as a chain of calls against one explicit context.

use std::f64::consts::TAU;

use crate::rendering::glyphs;
use crate::rendering::raster::{self, LineCap, Point, Segment};
use crate::rendering::surface::{Rgba, Surface};
use crate::{Error, Result};

/// How `draw_image` combines source pixels with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeOp {
    #[default]
    SourceOver,
    /// Destination pixels under the image are replaced outright.
    Copy,
}

/// Result of `measure_text`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
}

#[derive(Debug, Clone)]
struct Subpath {
    start: Point,
    segments: Vec<Segment>,
}

impl Subpath {
    fn current_point(&self) -> Point {
        raster::last_point(&self.segments).unwrap_or(self.start)
    }
}

pub struct Context2d<'a> {
    surface: &'a mut Surface,
    stroke_style: Rgba,
    fill_style: Rgba,
    line_width: f64,
    line_cap: LineCap,
    font_px: f64,
    subpaths: Vec<Subpath>,
}

impl<'a> Context2d<'a> {
    /// Canvas defaults: black styles, 1px butt-capped lines, 10px font.
    pub fn new(surface: &'a mut Surface) -> Self {
        Self {
            surface,
            stroke_style: Rgba::BLACK,
            fill_style: Rgba::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            font_px: 10.0,
            subpaths: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn surface(&self) -> &Surface {
        &*self.surface
    }

    pub fn set_stroke_style(&mut self, color: Rgba) -> &mut Self {
        self.stroke_style = color;
        self
    }

    pub fn set_fill_style(&mut self, color: Rgba) -> &mut Self {
        self.fill_style = color;
        self
    }

    /// Non-positive or non-finite widths are ignored, as in canvas.
    pub fn set_line_width(&mut self, width: f64) -> &mut Self {
        if width.is_finite() && width > 0.0 {
            self.line_width = width;
        }
        self
    }

    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.line_cap = cap;
        self
    }

    pub fn set_font_px(&mut self, px: f64) -> &mut Self {
        if px.is_finite() && px > 0.0 {
            self.font_px = px;
        }
        self
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn begin_path(&mut self) -> &mut Self {
        self.subpaths.clear();
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.subpaths.push(Subpath {
            start: Point::new(x, y),
            segments: Vec::new(),
        });
        self
    }

    /// Without a current point this behaves like `move_to`.
    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        let to = Point::new(x, y);
        match self.subpaths.last_mut() {
            Some(sub) => {
                let from = sub.current_point();
                sub.segments.push(Segment::Line { from, to });
            }
            None => {
                self.move_to(x, y);
            }
        }
        self
    }

    /// Clockwise arc around (x, y). When a subpath is open a straight line
    /// joins its current point to the arc's start.
    pub fn arc(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Result<&mut Self> {
        if radius < 0.0 {
            return Err(Error::InvalidArgument(format!("negative arc radius: {}", radius)));
        }
        if ![x, y, radius, start_angle, end_angle].iter().all(|v| v.is_finite()) {
            // canvas silently ignores non-finite arguments
            return Ok(self);
        }
        let center = Point::new(x, y);
        let sweep = raster::normalize_sweep(start_angle, end_angle);
        let begin = raster::point_on_circle(center, radius, start_angle);
        match self.subpaths.last_mut() {
            Some(sub) => {
                let from = sub.current_point();
                if from != begin {
                    sub.segments.push(Segment::Line { from, to: begin });
                }
            }
            None => self.subpaths.push(Subpath {
                start: begin,
                segments: Vec::new(),
            }),
        }
        if let Some(sub) = self.subpaths.last_mut() {
            sub.segments.push(Segment::Arc {
                center,
                radius,
                start: start_angle.rem_euclid(TAU),
                sweep,
            });
        }
        Ok(self)
    }

    /// Stroke the current path with the stroke style, width and cap.
    pub fn stroke(&mut self) -> &mut Self {
        let segments: Vec<Segment> = self
            .subpaths
            .iter()
            .flat_map(|s| s.segments.iter().copied())
            .collect();
        raster::stroke_segments(
            self.surface,
            &segments,
            self.line_width,
            self.line_cap,
            self.stroke_style,
        );
        self
    }

    /// Fill the current path (non-zero winding), closing each subpath.
    pub fn fill(&mut self) -> &mut Self {
        let polygons: Vec<Vec<Point>> = self
            .subpaths
            .iter()
            .map(|s| raster::flatten(s.start, &s.segments))
            .collect();
        raster::fill_polygons(self.surface, &polygons, self.fill_style);
        self
    }

    pub fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) -> &mut Self {
        self.surface.clear_rect(
            x.floor() as i64,
            y.floor() as i64,
            width.max(0.0).ceil() as u32,
            height.max(0.0).ceil() as u32,
        );
        self
    }

    pub fn measure_text(&self, text: &str) -> TextMetrics {
        let scale = glyphs::scale_for(self.font_px);
        TextMetrics {
            width: glyphs::text_width(text, scale) as f64,
        }
    }

    /// Draw `text` with its left edge at `x` and alphabetic baseline at `y`.
    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) -> &mut Self {
        let scale = i64::from(glyphs::scale_for(self.font_px));
        let left = x.round() as i64;
        let top = (y.round() as i64).saturating_sub(i64::from(glyphs::GLYPH_HEIGHT) * scale);
        let advance = i64::from(glyphs::GLYPH_WIDTH + glyphs::GLYPH_SPACING) * scale;
        for (i, c) in text.chars().enumerate() {
            let gx = left.saturating_add((i as i64).saturating_mul(advance));
            if gx >= i64::from(self.surface.width()) {
                break;
            }
            for row in 0..glyphs::GLYPH_HEIGHT {
                for col in 0..glyphs::GLYPH_WIDTH {
                    if !glyphs::is_set(c, col, row) {
                        continue;
                    }
                    let bx = gx.saturating_add(i64::from(col) * scale);
                    let by = top.saturating_add(i64::from(row) * scale);
                    self.fill_block(bx, by, scale);
                }
            }
        }
        self
    }

    /// Fill a `size` square at (x, y), clipped to the surface.
    fn fill_block(&mut self, x: i64, y: i64, size: i64) {
        let (w, h) = (i64::from(self.surface.width()), i64::from(self.surface.height()));
        let (x0, x1) = (x.clamp(0, w), x.saturating_add(size).clamp(0, w));
        let (y0, y1) = (y.clamp(0, h), y.saturating_add(size).clamp(0, h));
        for py in y0..y1 {
            for px in x0..x1 {
                self.surface.blend_pixel(px as u32, py as u32, self.fill_style, 1.0);
            }
        }
    }

    /// Composite `image` with its top-left corner at (dx, dy), clipped to
    /// the surface.
    pub fn draw_image(&mut self, image: &Surface, dx: i64, dy: i64, op: CompositeOp) -> &mut Self {
        if op == CompositeOp::Copy && dx == 0 && dy == 0 && self.surface.copy_from(image).is_ok() {
            return self;
        }
        for sy in 0..image.height() {
            for sx in 0..image.width() {
                let (tx, ty) = (dx + sx as i64, dy + sy as i64);
                if tx < 0 || ty < 0 {
                    continue;
                }
                let Some(px) = image.pixel(sx, sy) else { continue };
                match op {
                    CompositeOp::SourceOver => {
                        self.surface.blend_pixel(tx as u32, ty as u32, px, 1.0)
                    }
                    CompositeOp::Copy => self.surface.set_pixel(tx as u32, ty as u32, px),
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn fluent_setters_change_state() {
        let mut s = Surface::new(10, 10);
        let mut ctx = Context2d::new(&mut s);
        ctx.set_line_width(3.0).set_line_width(-1.0).set_line_cap(LineCap::Round);
        assert_eq!(ctx.line_width(), 3.0);
    }

    #[test]
    fn negative_radius_is_rejected() {
        let mut s = Surface::new(10, 10);
        let mut ctx = Context2d::new(&mut s);
        assert!(matches!(ctx.arc(5.0, 5.0, -1.0, 0.0, PI), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn stroke_without_path_draws_nothing() {
        let mut s = Surface::new(10, 10);
        Context2d::new(&mut s).begin_path().stroke().fill();
        assert_eq!(s.painted_pixel_count(), 0);
    }

    #[test]
    fn begin_path_discards_previous_segments() {
        let mut a = Surface::new(20, 20);
        {
            let mut ctx = Context2d::new(&mut a);
            ctx.set_stroke_style(Rgba::WHITE);
            ctx.move_to(0.0, 5.5).line_to(20.0, 5.5);
            ctx.begin_path().move_to(0.0, 15.5).line_to(20.0, 15.5).stroke();
        }
        assert_eq!(a.pixel(10, 5).unwrap().a, 0);
        assert_eq!(a.pixel(10, 15).unwrap().a, 255);
    }

    #[test]
    fn filled_circle_covers_centre() {
        let mut s = Surface::new(30, 30);
        {
            let mut ctx = Context2d::new(&mut s);
            ctx.set_fill_style(Rgba::WHITE).move_to(15.0, 15.0);
            ctx.arc(15.0, 15.0, 8.0, 0.0, 2.0 * PI).unwrap();
            ctx.fill();
        }
        assert_eq!(s.pixel(15, 15).unwrap().a, 255);
        assert_eq!(s.pixel(15, 8).unwrap().a, 255);
        assert_eq!(s.pixel(15, 3).unwrap().a, 0);
        assert_eq!(s.pixel(0, 0).unwrap().a, 0);
    }

    #[test]
    fn fill_text_inks_below_baseline_top() {
        let mut s = Surface::new(40, 20);
        {
            let mut ctx = Context2d::new(&mut s);
            ctx.set_fill_style(Rgba::WHITE).set_font_px(8.0);
            assert_eq!(ctx.measure_text("-1").width, 11.0);
            ctx.fill_text("-", 2.0, 10.0);
        }
        // '-' occupies row 3 of a 7-row glyph whose top is at baseline - 7
        for x in 2..7 {
            assert_eq!(s.pixel(x, 6).unwrap().a, 255);
        }
        assert_eq!(s.painted_pixel_count(), 5);
    }

    #[test]
    fn huge_font_is_clipped_to_surface() {
        let mut s = Surface::new(16, 16);
        {
            let mut ctx = Context2d::new(&mut s);
            ctx.set_fill_style(Rgba::WHITE).set_font_px(1e10);
            assert_eq!(ctx.measure_text("88").width, u32::MAX as f64);
            ctx.fill_text("-8", 0.0, 16.0);
        }
        // '-' only inks row 3, far above the surface
        assert_eq!(s.painted_pixel_count(), 0);
        let mut s = Surface::new(16, 16);
        Context2d::new(&mut s)
            .set_fill_style(Rgba::WHITE)
            .set_font_px(1e10)
            .fill_text("8", 0.0, 7.5e9);
        // baseline at 6 glyph units puts the inked left cell of row 1 over the surface
        assert_eq!(s.painted_pixel_count(), 256);
    }

    #[test]
    fn draw_image_copy_replaces_pixels() {
        let mut src = Surface::new(4, 4);
        src.set_pixel(1, 1, Rgba::new(255, 255, 255, 128));
        let mut dst = Surface::new(4, 4);
        dst.set_pixel(1, 1, Rgba::WHITE);
        dst.set_pixel(2, 2, Rgba::WHITE);

        let mut over = dst.clone();
        Context2d::new(&mut over).draw_image(&src, 0, 0, CompositeOp::SourceOver);
        assert_eq!(over.pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(over.pixel(2, 2), Some(Rgba::WHITE));

        Context2d::new(&mut dst).draw_image(&src, 0, 0, CompositeOp::Copy);
        assert_eq!(dst, src);
    }

    #[test]
    fn draw_image_offset_is_clipped() {
        let mut src = Surface::new(2, 2);
        src.set_pixel(0, 0, Rgba::WHITE);
        src.set_pixel(1, 1, Rgba::WHITE);
        let mut dst = Surface::new(3, 3);
        Context2d::new(&mut dst).draw_image(&src, 2, -1, CompositeOp::Copy);
        assert_eq!(dst.painted_pixel_count(), 0);
        Context2d::new(&mut dst).draw_image(&src, 2, 2, CompositeOp::Copy);
        assert_eq!(dst.pixel(2, 2), Some(Rgba::WHITE));
        assert_eq!(dst.painted_pixel_count(), 1);
    }
}
