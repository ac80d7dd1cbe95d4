//! PNG export of a raster surface.
//!
//! Feature-gated behind `png` (default on) so builds that only need the
//! in-memory buffer avoid the `image` dependency.

use starfield_core::color::Rgb;
use starfield_core::error::StarfieldError;
use std::path::Path;

use crate::pixel::to_rgba8;
use crate::RasterContext;

/// Writes the buffer composited over `background` as a PNG.
///
/// Returns `StarfieldError::InvalidDimensions` for an empty buffer and
/// `StarfieldError::Io` on write failure.
pub fn write_png(context: &RasterContext, background: Rgb, path: &Path) -> Result<(), StarfieldError> {
    if context.width() == 0 || context.height() == 0 {
        return Err(StarfieldError::InvalidDimensions);
    }
    let rgba = to_rgba8(context, background);
    let img = image::RgbaImage::from_raw(context.width(), context.height(), rgba)
        .ok_or_else(|| StarfieldError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| StarfieldError::Io(e.to_string()))
}
