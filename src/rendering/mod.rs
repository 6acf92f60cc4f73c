//! Software canvas: surfaces, a drawing context and its rasterizer

pub mod glyphs;
pub mod paint;
pub mod raster;
pub mod surface;

use base64::Engine as _;

pub use paint::{CompositeOp, Context2d, TextMetrics};
pub use raster::LineCap;
pub use surface::{Rgba, Surface, SurfaceLookup, SurfaceRegistry, SurfaceSpec};

/// A PNG-encoded capture of a surface.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// `data:` URL suitable for an `<img src>` attribute.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png_data)
        )
    }
}
