//! Tiny 5x7 bitmap font covering the characters used by numeric labels.
//!
//! Unknown characters advance like a space and draw nothing.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Blank columns between glyphs, in font units.
pub const GLYPH_SPACING: u32 = 1;

/// Rows top to bottom, most significant of the low five bits is the left column.
fn rows(c: char) -> Option<[u8; 7]> {
    let rows = match c {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        _ => return None,
    };
    Some(rows)
}

/// Whether font unit (col, row) of `c` is inked.
pub fn is_set(c: char, col: u32, row: u32) -> bool {
    if col >= GLYPH_WIDTH || row >= GLYPH_HEIGHT {
        return false;
    }
    rows(c).is_some_and(|r| r[row as usize] & (0x10 >> col) != 0)
}

/// Integer scale for a pixel font size; glyph cells are 8 units tall.
/// Saturates at `u32::MAX` for absurd sizes.
pub fn scale_for(font_px: f64) -> u32 {
    ((font_px / 8.0).round() as u32).max(1)
}

/// Rendered width of `text` in pixels at `scale`, saturating.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    if n == 0 {
        return 0;
    }
    n.saturating_mul(GLYPH_WIDTH + GLYPH_SPACING)
        .saturating_sub(GLYPH_SPACING)
        .saturating_mul(scale)
}
