/// Coverage rasterizer for stroked and filled paths, plus PNG encoding.
///
/// Geometry is sampled at pixel centres with a one pixel anti-aliasing ramp
/// around the ideal edge. Everything is plain f64 arithmetic so identical
/// input always produces identical bytes.

use std::f64::consts::TAU;

use crate::rendering::surface::{Rgba, Surface};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Line cap applied at the ends of stroked segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// One piece of a flattened-on-demand path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line { from: Point, to: Point },
    /// Clockwise (screen space) arc; `sweep` is already normalised to `[0, TAU]`.
    Arc { center: Point, radius: f64, start: f64, sweep: f64 },
}

impl Segment {
    pub fn is_degenerate(&self) -> bool {
        match *self {
            Segment::Line { from, to } => from.distance(to) < 1e-9,
            Segment::Arc { radius, sweep, .. } => radius <= 0.0 || sweep <= 0.0,
        }
    }

    fn start_point(&self) -> Point {
        match *self {
            Segment::Line { from, .. } => from,
            Segment::Arc { center, radius, start, .. } => point_on_circle(center, radius, start),
        }
    }

    fn end_point(&self) -> Point {
        match *self {
            Segment::Line { to, .. } => to,
            Segment::Arc { center, radius, start, sweep } => {
                point_on_circle(center, radius, start + sweep)
            }
        }
    }

    /// Axis-aligned bounds as (min, max).
    fn bounds(&self) -> (Point, Point) {
        match *self {
            Segment::Line { from, to } => (
                Point::new(from.x.min(to.x), from.y.min(to.y)),
                Point::new(from.x.max(to.x), from.y.max(to.y)),
            ),
            // A bounding circle is tight enough for widget-sized surfaces.
            Segment::Arc { center, radius, .. } => (
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            ),
        }
    }

    /// Coverage of the pixel centred at `p` by this segment stroked at
    /// `half_width`.
    fn stroke_coverage(&self, p: Point, half_width: f64, cap: LineCap) -> f64 {
        match *self {
            Segment::Line { from, to } => line_coverage(p, from, to, half_width, cap),
            Segment::Arc { center, radius, start, sweep } => {
                arc_coverage(p, center, radius, start, sweep, half_width, cap)
            }
        }
    }

    /// Append polyline points (excluding the segment start) to `out`.
    fn flatten_into(&self, out: &mut Vec<Point>) {
        match *self {
            Segment::Line { to, .. } => out.push(to),
            Segment::Arc { center, radius, start, sweep } => {
                let steps = ((sweep * radius).ceil() as usize).clamp(8, 1024);
                for i in 1..=steps {
                    let a = start + sweep * (i as f64 / steps as f64);
                    out.push(point_on_circle(center, radius, a));
                }
            }
        }
    }
}

pub fn point_on_circle(center: Point, radius: f64, angle: f64) -> Point {
    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

/// Normalise a clockwise sweep from `start` to `end` the way canvas `arc()`
/// does: a difference of a full turn or more is a full circle, anything else
/// is reduced into `[0, TAU)`.
pub fn normalize_sweep(start: f64, end: f64) -> f64 {
    let diff = end - start;
    if diff >= TAU {
        TAU
    } else {
        diff.rem_euclid(TAU)
    }
}

fn ramp(half_width: f64, distance: f64) -> f64 {
    (half_width + 0.5 - distance).clamp(0.0, 1.0)
}

fn line_coverage(p: Point, from: Point, to: Point, hw: f64, cap: LineCap) -> f64 {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let len = dx.hypot(dy);
    let t = ((p.x - from.x) * dx + (p.y - from.y) * dy) / (len * len);
    match cap {
        LineCap::Round => {
            let t = t.clamp(0.0, 1.0);
            let nearest = Point::new(from.x + dx * t, from.y + dy * t);
            ramp(hw, p.distance(nearest))
        }
        LineCap::Butt => {
            let perp = ((p.x - from.x) * dy - (p.y - from.y) * dx).abs() / len;
            // signed distance past either end, negative while inside
            let along = (-t * len).max((t - 1.0) * len);
            ramp(hw, perp).min((0.5 - along).clamp(0.0, 1.0))
        }
    }
}

fn arc_coverage(p: Point, c: Point, r: f64, start: f64, sweep: f64, hw: f64, cap: LineCap) -> f64 {
    let (vx, vy) = (p.x - c.x, p.y - c.y);
    let band = ramp(hw, (vx.hypot(vy) - r).abs());
    if sweep >= TAU {
        return band;
    }
    let t = (vy.atan2(vx) - start).rem_euclid(TAU);
    let body = if t <= sweep { band } else { 0.0 };
    let end = start + sweep;
    let caps = match cap {
        LineCap::Round => {
            let s = ramp(hw, p.distance(point_on_circle(c, r, start)));
            let e = ramp(hw, p.distance(point_on_circle(c, r, end)));
            s.max(e)
        }
        LineCap::Butt => {
            // Soften the radial cut edges: distance past the cap along the
            // tangent, clockwise at the end and counter-clockwise at the start.
            let ps = point_on_circle(c, r, start);
            let pe = point_on_circle(c, r, end);
            let past_start = (p.x - ps.x) * start.sin() - (p.y - ps.y) * start.cos();
            let past_end = -(p.x - pe.x) * end.sin() + (p.y - pe.y) * end.cos();
            let s = if (0.0..0.5).contains(&past_start) { band.min(0.5 - past_start) } else { 0.0 };
            let e = if (0.0..0.5).contains(&past_end) { band.min(0.5 - past_end) } else { 0.0 };
            s.max(e)
        }
    };
    body.max(caps)
}

/// Source-over composite of `color` at `coverage` onto a non-premultiplied
/// destination pixel.
pub fn source_over(dst: [u8; 4], color: Rgba, coverage: f32) -> [u8; 4] {
    let sa = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    if oa <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mix = |sc: u8, dc: u8| -> u8 {
        let v = (sc as f32 * sa + dc as f32 * da * (1.0 - sa)) / oa;
        v.round().clamp(0.0, 255.0) as u8
    };
    [
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (oa * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Pixel rectangle `[x0, x1) x [y0, y1)` touched by bounds grown by `pad`.
fn pixel_span(surface: &Surface, min: Point, max: Point, pad: f64) -> (u32, u32, u32, u32) {
    let clamp_x = |v: f64| v.clamp(0.0, surface.width() as f64) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, surface.height() as f64) as u32;
    (
        clamp_x((min.x - pad).floor()),
        clamp_y((min.y - pad).floor()),
        clamp_x((max.x + pad).ceil() + 1.0),
        clamp_y((max.y + pad).ceil() + 1.0),
    )
}

/// Stroke segments onto `surface`. Coverage is unioned across segments so
/// one stroke never blends a pixel twice.
pub fn stroke_segments(
    surface: &mut Surface,
    segments: &[Segment],
    line_width: f64,
    cap: LineCap,
    color: Rgba,
) {
    let (w, h) = (surface.width() as usize, surface.height() as usize);
    if w == 0 || h == 0 || line_width <= 0.0 {
        return;
    }
    let hw = line_width / 2.0;
    let mut coverage = vec![0.0f64; w * h];
    for seg in segments.iter().filter(|s| !s.is_degenerate()) {
        let (min, max) = seg.bounds();
        let (x0, y0, x1, y1) = pixel_span(surface, min, max, hw + 1.0);
        for py in y0..y1 {
            for px in x0..x1 {
                let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                let c = seg.stroke_coverage(p, hw, cap);
                let slot = &mut coverage[py as usize * w + px as usize];
                if c > *slot {
                    *slot = c;
                }
            }
        }
    }
    apply_coverage(surface, &coverage, color);
}

/// Fill closed polygons (one per subpath) with the non-zero winding rule.
pub fn fill_polygons(surface: &mut Surface, polygons: &[Vec<Point>], color: Rgba) {
    let (w, h) = (surface.width() as usize, surface.height() as usize);
    let polygons: Vec<&Vec<Point>> = polygons.iter().filter(|p| p.len() >= 3).collect();
    if w == 0 || h == 0 || polygons.is_empty() {
        return;
    }
    let mut min = Point::new(f64::MAX, f64::MAX);
    let mut max = Point::new(f64::MIN, f64::MIN);
    for p in polygons.iter().flat_map(|poly| poly.iter()) {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    let (x0, y0, x1, y1) = pixel_span(surface, min, max, 1.0);
    let mut coverage = vec![0.0f64; w * h];
    for py in y0..y1 {
        for px in x0..x1 {
            let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
            let mut winding = 0i32;
            let mut edge_dist = f64::MAX;
            for poly in &polygons {
                for (i, &a) in poly.iter().enumerate() {
                    let b = poly[(i + 1) % poly.len()];
                    winding += winding_contribution(p, a, b);
                    edge_dist = edge_dist.min(distance_to_segment(p, a, b));
                }
            }
            let signed = if winding != 0 { edge_dist } else { -edge_dist };
            coverage[py as usize * w + px as usize] = (0.5 + signed).clamp(0.0, 1.0);
        }
    }
    apply_coverage(surface, &coverage, color);
}

/// Flatten a subpath (start point + segments) into a closed polygon.
pub fn flatten(start: Point, segments: &[Segment]) -> Vec<Point> {
    let mut points = vec![start];
    for seg in segments {
        if points.last() != Some(&seg.start_point()) {
            points.push(seg.start_point());
        }
        seg.flatten_into(&mut points);
    }
    points
}

/// End point of the last segment, if any.
pub fn last_point(segments: &[Segment]) -> Option<Point> {
    segments.last().map(Segment::end_point)
}

fn winding_contribution(p: Point, a: Point, b: Point) -> i32 {
    let cross = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
    if a.y <= p.y {
        if b.y > p.y && cross > 0.0 {
            return 1;
        }
    } else if b.y <= p.y && cross < 0.0 {
        return -1;
    }
    0
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + dx * t, a.y + dy * t))
}

fn apply_coverage(surface: &mut Surface, coverage: &[f64], color: Rgba) {
    let w = surface.width() as usize;
    for (i, &c) in coverage.iter().enumerate() {
        if c > 0.0 {
            surface.blend_pixel((i % w) as u32, (i / w) as u32, color, c as f32);
        }
    }
}

/// Encode a surface as an 8-bit RGBA PNG.
pub fn encode_png(surface: &Surface) -> Result<Vec<u8>> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(Error::EncodeError(format!(
            "cannot encode {}x{} surface",
            surface.width(),
            surface.height()
        )));
    }
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.pixels())?;
        writer.finish()?;
    }
    Ok(buf)
}
