//! Integer number line with the current value marked by a dot

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::rendering::{Context2d, Rgba};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NumberLineStyle {
    pub color: Rgba,
    pub line_width: f64,
    pub font_px: f64,
    pub dot_radius: f64,
    /// Half the height of an unmarked tick.
    pub tick_half_height: f64,
    /// Distance from the axis down to the label baseline.
    pub label_offset: f64,
}

impl Default for NumberLineStyle {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            line_width: 2.0,
            font_px: 20.0,
            dot_radius: 8.0,
            tick_half_height: 5.0,
            label_offset: 30.0,
        }
    }
}

/// Horizontal position of integer `i` on a line spanning `width` pixels.
///
/// The line is split into one cell per integer and each integer sits at the
/// middle of its cell.
pub fn tick_x(width: u32, min: i64, max: i64, i: i64) -> f64 {
    let span = (i128::from(max) - i128::from(min)) as f64;
    let step = width as f64 / (span + 1.0);
    ((i128::from(i) - i128::from(min)) as f64 * step).round() + step / 2.0
}

/// Draw the number line for `min..=max` with `value` marked.
///
/// `value` outside the range simply marks nothing. The range may hold at
/// most one integer per pixel column.
pub fn draw_number_line(
    ctx: &mut Context2d<'_>,
    min: i64,
    max: i64,
    value: i64,
    style: &NumberLineStyle,
) -> Result<()> {
    if min > max {
        return Err(Error::InvalidArgument(format!(
            "number line min {} exceeds max {}",
            min, max
        )));
    }
    let w = ctx.width();
    match max.checked_sub(min) {
        Some(span) if span < i64::from(w.max(1)) => {}
        _ => {
            return Err(Error::InvalidArgument(format!(
                "number line {}..={} does not fit in {}px",
                min, max, w
            )))
        }
    }
    let mid_y = ctx.height() as f64 / 2.0;

    ctx.set_stroke_style(style.color)
        .set_fill_style(style.color)
        .set_font_px(style.font_px)
        .set_line_width(style.line_width);

    ctx.begin_path().move_to(0.0, mid_y).line_to(w as f64, mid_y).stroke();

    for i in min..=max {
        let x = tick_x(w, min, max, i);
        ctx.begin_path();
        if i == value {
            ctx.move_to(x, mid_y);
            ctx.arc(x, mid_y, style.dot_radius, 0.0, TAU)?;
            ctx.fill();
        } else {
            ctx.move_to(x, mid_y - style.tick_half_height)
                .line_to(x, mid_y + style.tick_half_height)
                .stroke();
        }
        let label = i.to_string();
        let text_x = x - ctx.measure_text(&label).width / 2.0;
        ctx.fill_text(&label, text_x, mid_y + style.label_offset);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Surface;

    #[test]
    fn ticks_are_centred_in_cells() {
        // 5 integers over 100px: 20px cells
        assert_eq!(tick_x(100, -2, 2, -2), 10.0);
        assert_eq!(tick_x(100, -2, 2, 0), 50.0);
        assert_eq!(tick_x(100, -2, 2, 2), 90.0);
        // positive minimum starts at the first cell
        assert_eq!(tick_x(100, 3, 7, 3), 10.0);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut s = Surface::new(50, 50);
        let mut ctx = Context2d::new(&mut s);
        let r = draw_number_line(&mut ctx, 3, 1, 2, &NumberLineStyle::default());
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn extreme_ranges_are_rejected_without_overflow() {
        let tick = tick_x(400, -5, i64::MAX, 0);
        assert!(tick.is_finite() && tick < 1.0);

        let mut s = Surface::new(400, 80);
        let style = NumberLineStyle::default();
        let mut ctx = Context2d::new(&mut s);
        for (min, max) in [(-5, i64::MAX), (i64::MIN, i64::MAX), (0, 400)] {
            let r = draw_number_line(&mut ctx, min, max, 0, &style);
            assert!(matches!(r, Err(Error::InvalidArgument(_))), "{}..={}", min, max);
        }
        assert_eq!(ctx.surface().painted_pixel_count(), 0);
        // one integer per column still fits
        assert!(draw_number_line(&mut ctx, 0, 399, 0, &style).is_ok());
    }

    #[test]
    fn value_is_marked_with_dot() {
        let mut s = Surface::new(200, 100);
        let style = NumberLineStyle::default();
        draw_number_line(&mut Context2d::new(&mut s), -2, 2, 1, &style).unwrap();
        // dot at x=140 spans well above the axis; a plain tick only reaches 5px
        let above = 50 - 7;
        assert_eq!(s.pixel(140, above).unwrap().a, 255);
        assert_eq!(s.pixel(100, above).unwrap().a, 0);
        // the axis runs the full width
        assert_eq!(s.pixel(0, 49).unwrap().a, 255);
        assert_eq!(s.pixel(199, 50).unwrap().a, 255);
        // labels are drawn beneath the line
        let label_rows =
            (55..80).any(|y| (130..150).any(|x| s.pixel(x, y).unwrap().a > 0));
        assert!(label_rows);
    }
}
