//! Host-facing traits: the drawing surface a starfield paints on, its 2-D
//! drawing context, and the discovery query that finds surfaces.
//!
//! The engine never creates or destroys a surface. It reads the containing
//! layout box on resize, sets the surface's pixel size from it, and draws
//! through the context. Either may be missing; callers treat that as a
//! silent no-op.

use serde::Serialize;

use crate::color::Rgba;

/// Size of the layout box containing a surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutBox {
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whole-pixel surface size for this box. Negative and non-finite
    /// extents collapse to 0.
    pub fn pixel_size(self) -> (u32, u32) {
        (to_pixels(self.width), to_pixels(self.height))
    }
}

fn to_pixels(extent: f64) -> u32 {
    if extent.is_finite() && extent > 0.0 {
        extent.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

/// Immediate-mode 2-D drawing context, the subset of a canvas context the
/// starfield uses.
pub trait DrawContext {
    /// Clears the rectangle to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Starts a new path, discarding any previous one.
    fn begin_path(&mut self);

    /// Adds a circular arc centered at (x, y) to the current path.
    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64);

    /// Sets the color used by the next [`fill`](Self::fill).
    fn set_fill_color(&mut self, color: Rgba);

    /// Fills the current path.
    fn fill(&mut self);
}

/// A drawing surface owned by the host.
pub trait Surface {
    type Context: DrawContext;

    /// Current pixel width.
    fn width(&self) -> u32;

    /// Current pixel height.
    fn height(&self) -> u32;

    /// Sets the pixel size. On a canvas this also clears it.
    fn set_size(&mut self, width: u32, height: u32);

    /// The containing layout box, or `None` if the surface is detached.
    fn layout_box(&self) -> Option<LayoutBox>;

    /// The 2-D drawing context, or `None` if the surface cannot provide one.
    fn context_mut(&mut self) -> Option<&mut Self::Context>;
}

/// Finds every surface tagged as a starfield.
pub trait SurfaceDiscovery {
    type Surface: Surface;

    /// Returns the surfaces matching `selector`, in document order.
    fn discover(&mut self, selector: &str) -> Vec<Self::Surface>;
}
