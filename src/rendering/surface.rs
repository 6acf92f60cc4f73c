/// Raster surfaces and id-based surface resolution

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::rendering::{raster, Screenshot};
use crate::{Error, Result};

/// Non-premultiplied 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

/// Parses CSS hex notation: `#rgb`, `#rrggbb` or `#rrggbbaa`.
impl FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let hex_digits = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| Error::InvalidArgument(format!("colour must start with '#': {}", s)))?;
        let bad = || Error::InvalidArgument(format!("invalid colour: {}", s));
        if !hex_digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let channel = |i: usize, len: usize| -> Result<u8> {
            let part = hex_digits.get(i * len..(i + 1) * len).ok_or_else(bad)?;
            let v = u8::from_str_radix(part, 16).map_err(|_| bad())?;
            // #rgb expands each nibble: f -> ff
            Ok(if len == 1 { v * 17 } else { v })
        };
        match hex_digits.len() {
            3 => Ok(Rgba::new(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?, 255)),
            6 => Ok(Rgba::new(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, 255)),
            8 => Ok(Rgba::new(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?, channel(3, 2)?)),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// An addressable RGBA raster, row-major, initialised fully transparent.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Colour at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        let o = self.offset(x, y)?;
        let p = &self.pixels[o..o + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(o) = self.offset(x, y) {
            self.pixels[o..o + 4].copy_from_slice(&color.to_array());
        }
    }

    /// Source-over blend `color` scaled by `coverage` (0..=1) into (x, y).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        if let Some(o) = self.offset(x, y) {
            let dst = [
                self.pixels[o],
                self.pixels[o + 1],
                self.pixels[o + 2],
                self.pixels[o + 3],
            ];
            let out = raster::source_over(dst, color, coverage);
            self.pixels[o..o + 4].copy_from_slice(&out);
        }
    }

    /// Reset a rectangle to transparent, clipped to the surface.
    pub fn clear_rect(&mut self, x: i64, y: i64, width: u32, height: u32) {
        let x0 = x.clamp(0, self.width as i64) as u32;
        let y0 = y.clamp(0, self.height as i64) as u32;
        let x1 = (x + width as i64).clamp(0, self.width as i64) as u32;
        let y1 = (y + height as i64).clamp(0, self.height as i64) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px, py, Rgba::TRANSPARENT);
            }
        }
    }

    /// Replace this surface's pixels with `src` in a single operation.
    ///
    /// Both surfaces must have the same dimensions.
    pub fn copy_from(&mut self, src: &Surface) -> Result<()> {
        if src.width != self.width || src.height != self.height {
            return Err(Error::InvalidArgument(format!(
                "cannot copy {}x{} surface onto {}x{} surface",
                src.width, src.height, self.width, self.height
            )));
        }
        self.pixels.copy_from_slice(&src.pixels);
        Ok(())
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted_pixel_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|p| p[3] != 0).count()
    }

    /// Hex SHA-256 over the dimensions and pixel bytes, used for goldens.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_be_bytes());
        hasher.update(self.height.to_be_bytes());
        hasher.update(&self.pixels);
        hex::encode(hasher.finalize())
    }

    /// Encode the surface as a PNG screenshot.
    pub fn to_screenshot(&self) -> Result<Screenshot> {
        let png_data = raster::encode_png(self)?;
        Ok(Screenshot {
            width: self.width,
            height: self.height,
            png_data,
        })
    }
}

/// Resolves a string id to a drawing surface, like a DOM id lookup.
pub trait SurfaceLookup {
    fn surface_mut(&mut self, id: &str) -> Option<&mut Surface>;
}

/// Dimensions for a named surface (used by configuration).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceSpec {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

/// An id-keyed collection of surfaces.
#[derive(Debug, Default, Clone)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with one blank surface per spec.
    pub fn from_specs<'a>(specs: impl IntoIterator<Item = &'a SurfaceSpec>) -> Self {
        let mut reg = Self::new();
        for spec in specs {
            reg.insert(spec.id.clone(), Surface::new(spec.width, spec.height));
        }
        reg
    }

    /// Insert a surface, returning the one previously registered under `id`.
    pub fn insert(&mut self, id: impl Into<String>, surface: Surface) -> Option<Surface> {
        self.surfaces.insert(id.into(), surface)
    }

    pub fn get(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.surfaces.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SurfaceLookup for SurfaceRegistry {
    fn surface_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.get_mut(id)
    }
}
