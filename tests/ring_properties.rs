use mirrorpaint::progress::{draw_arc, ProgressRingRenderer, RingGeometry, RingStyle};
use mirrorpaint::rendering::{Context2d, Surface, SurfaceRegistry};

const SIZE: u32 = 100;
// radius = 50 - 6 / 2
const RADIUS: f64 = 47.0;

fn render(fraction: f64) -> Surface {
    let mut surfaces = SurfaceRegistry::new();
    surfaces.insert("ring", Surface::new(SIZE, SIZE));
    ProgressRingRenderer::default().draw_progress(&mut surfaces, "ring", fraction);
    surfaces.remove("ring").unwrap()
}

/// Alpha at `degrees` clockwise from north, `dist` pixels from the centre.
fn alpha_at(s: &Surface, degrees: f64, dist: f64) -> u8 {
    let c = SIZE as f64 / 2.0;
    let a = degrees.to_radians();
    let x = (c + dist * a.sin()).floor() as u32;
    let y = (c - dist * a.cos()).floor() as u32;
    s.pixel(x, y).expect("probe inside surface").a
}

/// Outside the thin track's reach but inside the thick arc's band.
fn thick_present(s: &Surface, degrees: f64) -> bool {
    alpha_at(s, degrees, RADIUS + 2.5) > 0
}

const COMPASS: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

#[test]
fn zero_fraction_draws_only_the_track() {
    let s = render(0.0);
    for deg in COMPASS {
        assert!(!thick_present(&s, deg), "unexpected arc pixel at {}deg", deg);
    }
    assert!(alpha_at(&s, 0.0, RADIUS) > 0, "track missing at north");

    // identical to stroking the track alone
    let mut track = Surface::new(SIZE, SIZE);
    {
        let style = RingStyle::default();
        let g = RingGeometry::new(SIZE, SIZE, style.thick_line_width).unwrap();
        let (start, end) = g.track_span();
        let mut ctx = Context2d::new(&mut track);
        let (cx, cy, r) = (g.center_x, g.center_y, g.radius);
        draw_arc(&mut ctx, cx, cy, r, start, end, style.thin_line_width, &style).unwrap();
    }
    assert_eq!(s.digest(), track.digest());
}

#[test]
fn full_fraction_covers_whole_circle() {
    let s = render(1.0);
    for deg in COMPASS {
        assert!(thick_present(&s, deg), "arc missing at {}deg", deg);
        assert_eq!(alpha_at(&s, deg, RADIUS), 255, "arc not opaque at {}deg", deg);
    }
}

#[test]
fn half_fraction_spans_north_clockwise_to_south() {
    let s = render(0.5);
    for deg in [45.0, 90.0, 135.0] {
        assert!(thick_present(&s, deg), "arc missing at {}deg", deg);
    }
    for deg in [225.0, 270.0, 315.0] {
        assert!(!thick_present(&s, deg), "arc leaked to {}deg", deg);
    }
    assert_eq!(alpha_at(&s, 90.0, RADIUS), 255);
}

#[test]
fn arc_runs_clockwise_from_north() {
    let s = render(0.25);
    assert!(thick_present(&s, 45.0));
    assert!(!thick_present(&s, 135.0));
    assert!(!thick_present(&s, 315.0));
}

#[test]
fn redraw_is_idempotent() {
    let mut surfaces = SurfaceRegistry::new();
    surfaces.insert("ring", Surface::new(SIZE, SIZE));
    let renderer = ProgressRingRenderer::default();

    renderer.draw_progress(&mut surfaces, "ring", 0.42);
    let first = surfaces.get("ring").unwrap().clone();
    renderer.draw_progress(&mut surfaces, "ring", 0.42);
    assert_eq!(surfaces.get("ring").unwrap(), &first);
}

#[test]
fn redraw_replaces_previous_ring() {
    let mut surfaces = SurfaceRegistry::new();
    surfaces.insert("ring", Surface::new(SIZE, SIZE));
    let renderer = ProgressRingRenderer::default();

    renderer.draw_progress(&mut surfaces, "ring", 0.9);
    renderer.draw_progress(&mut surfaces, "ring", 0.3);
    assert_eq!(surfaces.get("ring").unwrap().digest(), render(0.3).digest());
}

#[test]
fn larger_fraction_contains_smaller() {
    let pairs = [(0.1, 0.35), (0.35, 0.6), (0.6, 0.99)];
    for (f1, f2) in pairs {
        let (a, b) = (render(f1), render(f2));
        let not_contained = a
            .pixels()
            .chunks_exact(4)
            .zip(b.pixels().chunks_exact(4))
            .filter(|(pa, pb)| pa[3] > pb[3])
            .count();
        assert_eq!(not_contained, 0, "{} not contained in {}", f1, f2);
        assert!(b.painted_pixel_count() > a.painted_pixel_count());
    }
}

#[test]
fn progress_span_grows_monotonically() {
    let g = RingGeometry::new(SIZE, SIZE, 6.0).unwrap();
    let mut prev = g.progress_span(0.0);
    for i in 1..=100 {
        let span = g.progress_span(i as f64 / 100.0);
        assert_eq!(span.0, prev.0);
        assert!(span.1 > prev.1);
        prev = span;
    }
    let (start, end) = g.progress_span(1.0);
    assert!((end - start - std::f64::consts::TAU).abs() < 1e-12);
}

#[test]
fn out_of_range_fraction_clamps_by_default() {
    assert_eq!(render(-0.5).digest(), render(0.0).digest());
    assert_eq!(render(3.0).digest(), render(1.0).digest());
}
