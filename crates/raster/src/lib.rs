#![deny(unsafe_code)]
//! Headless starfield surface.
//!
//! [`RasterSurface`] implements the core `Surface` trait on top of
//! [`RasterContext`], which rasterizes filled circles into a premultiplied
//! RGBA buffer with source-over blending. The CLI uses it to render PNG
//! snapshots without a browser.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use log::warn;
use starfield_core::color::Rgba;
use starfield_core::error::StarfieldError;
use starfield_core::surface::{DrawContext, LayoutBox, Surface, SurfaceDiscovery};

/// Largest buffer a raster surface allocates: 4096 x 4096 pixels.
pub const MAX_PIXELS: u64 = 4096 * 4096;

/// Checks that a `width` x `height` buffer is non-empty and within [`MAX_PIXELS`].
pub fn check_dimensions(width: u32, height: u32) -> Result<(), StarfieldError> {
    let area = u64::from(width) * u64::from(height);
    if area == 0 || area > MAX_PIXELS {
        return Err(StarfieldError::InvalidDimensions);
    }
    Ok(())
}

fn exceeds_limit(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) > MAX_PIXELS
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Circle {
    x: f64,
    y: f64,
    radius: f64,
}

/// CPU drawing context over a `width` x `height` premultiplied RGBA buffer.
///
/// Arcs are always filled as full circles. Edges are anti-aliased with a
/// one-pixel linear falloff.
#[derive(Debug, Clone)]
pub struct RasterContext {
    width: u32,
    height: u32,
    pixels: Vec<[f64; 4]>,
    path: Vec<Circle>,
    fill: Rgba,
}

impl RasterContext {
    /// A transparent buffer. Sizes over [`MAX_PIXELS`] give an empty 0 x 0 buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = if exceeds_limit(width, height) {
            warn!("raster {width}x{height} exceeds {MAX_PIXELS} pixels, left empty");
            (0, 0)
        } else {
            (width, height)
        };
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
            path: Vec::new(),
            fill: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 1.0,
            },
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA in [0, 1] at (x, y), or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f64; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Premultiplied pixels in row-major order.
    pub fn pixels(&self) -> &[[f64; 4]] {
        &self.pixels
    }

    /// Reallocates the buffer; like a canvas, resizing clears it.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = RasterContext {
            fill: self.fill,
            ..RasterContext::new(width, height)
        };
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn blend_circle(&mut self, circle: Circle) {
        if self.width == 0 || self.height == 0 || circle.radius <= 0.0 {
            return;
        }
        let reach = circle.radius + 0.5;
        let x0 = clamp_index(circle.x - reach, self.width);
        let x1 = clamp_index(circle.x + reach, self.width);
        let y0 = clamp_index(circle.y - reach, self.height);
        let y1 = clamp_index(circle.y + reach, self.height);

        let src = [
            f64::from(self.fill.r) / 255.0,
            f64::from(self.fill.g) / 255.0,
            f64::from(self.fill.b) / 255.0,
        ];
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = f64::from(px) + 0.5 - circle.x;
                let dy = f64::from(py) + 0.5 - circle.y;
                let coverage = (reach - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                let alpha = self.fill.a * coverage;
                if alpha <= 0.0 {
                    continue;
                }
                let i = self.index(px, py);
                let dst = &mut self.pixels[i];
                for c in 0..3 {
                    dst[c] = src[c] * alpha + dst[c] * (1.0 - alpha);
                }
                dst[3] = alpha + dst[3] * (1.0 - alpha);
            }
        }
    }
}

/// Index of the pixel containing `coord`, clamped to [0, extent - 1].
fn clamp_index(coord: f64, extent: u32) -> u32 {
    coord.floor().clamp(0.0, f64::from(extent - 1)) as u32
}

impl DrawContext for RasterContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let x0 = x.max(0.0).floor() as u32;
        let y0 = y.max(0.0).floor() as u32;
        let x1 = (x + width).ceil().clamp(0.0, f64::from(self.width)) as u32;
        let y1 = (y + height).ceil().clamp(0.0, f64::from(self.height)) as u32;
        for py in y0..y1 {
            for px in x0..x1 {
                let i = self.index(px, py);
                self.pixels[i] = [0.0; 4];
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, _start_angle: f64, _end_angle: f64) {
        self.path.push(Circle { x, y, radius });
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn fill(&mut self) {
        let path = std::mem::take(&mut self.path);
        for circle in &path {
            self.blend_circle(*circle);
        }
        self.path = path;
    }
}

/// A surface backed by a [`RasterContext`], sitting in an optional layout box.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    context: RasterContext,
    layout: Option<LayoutBox>,
}

impl RasterSurface {
    /// A zero-sized surface inside `layout`; the first resize adopts it.
    pub fn new(layout: Option<LayoutBox>) -> Self {
        Self {
            context: RasterContext::new(0, 0),
            layout,
        }
    }

    pub fn context(&self) -> &RasterContext {
        &self.context
    }
}

impl Surface for RasterSurface {
    type Context = RasterContext;

    fn width(&self) -> u32 {
        self.context.width
    }

    fn height(&self) -> u32 {
        self.context.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }

    fn layout_box(&self) -> Option<LayoutBox> {
        self.layout
    }

    fn context_mut(&mut self) -> Option<&mut RasterContext> {
        Some(&mut self.context)
    }
}

/// Discovery yielding one raster surface per configured layout box.
#[derive(Debug, Clone, Default)]
pub struct RasterDiscovery {
    layouts: Vec<LayoutBox>,
}

impl RasterDiscovery {
    pub fn new(layouts: Vec<LayoutBox>) -> Self {
        Self { layouts }
    }
}

impl SurfaceDiscovery for RasterDiscovery {
    type Surface = RasterSurface;

    fn discover(&mut self, _selector: &str) -> Vec<RasterSurface> {
        self.layouts
            .iter()
            .map(|&layout| RasterSurface::new(Some(layout)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield_core::color::Rgb;
    use starfield_core::{ManualScheduler, StarfieldConfig, StarfieldManager};
    use std::f64::consts::TAU;

    fn draw_circle(ctx: &mut RasterContext, x: f64, y: f64, r: f64, alpha: f64) {
        ctx.begin_path();
        ctx.arc(x, y, r, 0.0, TAU);
        ctx.set_fill_color(Rgb::new(255, 255, 255).with_alpha(alpha));
        ctx.fill();
    }

    #[test]
    fn new_context_is_transparent() {
        let ctx = RasterContext::new(4, 3);
        assert_eq!(ctx.pixels().len(), 12);
        assert!(ctx.pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn fill_covers_center_and_not_far_pixels() {
        let mut ctx = RasterContext::new(10, 10);
        draw_circle(&mut ctx, 5.0, 5.0, 2.0, 1.0);
        assert!((ctx.pixel(5, 5).unwrap()[3] - 1.0).abs() < 1e-12);
        assert_eq!(ctx.pixel(0, 0).unwrap()[3], 0.0);
        assert_eq!(ctx.pixel(9, 9).unwrap()[3], 0.0);
    }

    #[test]
    fn fill_blends_with_partial_alpha() {
        let mut ctx = RasterContext::new(4, 4);
        draw_circle(&mut ctx, 2.0, 2.0, 1.5, 0.5);
        let p = ctx.pixel(1, 1).unwrap();
        assert!((p[3] - 0.5).abs() < 1e-12, "alpha {}", p[3]);
        draw_circle(&mut ctx, 2.0, 2.0, 1.5, 0.5);
        let p = ctx.pixel(1, 1).unwrap();
        assert!((p[3] - 0.75).abs() < 1e-12, "alpha {}", p[3]);
    }

    #[test]
    fn circle_partly_off_canvas_is_clipped() {
        let mut ctx = RasterContext::new(4, 4);
        draw_circle(&mut ctx, -0.5, -0.5, 2.0, 1.0);
        draw_circle(&mut ctx, 50.0, 50.0, 2.0, 1.0);
        assert!(ctx.pixel(0, 0).unwrap()[3] > 0.0);
        assert_eq!(ctx.pixel(3, 3).unwrap()[3], 0.0);
    }

    #[test]
    fn clear_rect_resets_pixels() {
        let mut ctx = RasterContext::new(6, 6);
        draw_circle(&mut ctx, 3.0, 3.0, 3.0, 1.0);
        ctx.clear_rect(0.0, 0.0, 6.0, 6.0);
        assert!(ctx.pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn clear_rect_clamps_to_bounds() {
        let mut ctx = RasterContext::new(3, 3);
        ctx.clear_rect(-10.0, -10.0, 100.0, 100.0);
        ctx.clear_rect(5.0, 5.0, 1.0, 1.0);
    }

    #[test]
    fn zero_sized_context_ignores_drawing() {
        let mut ctx = RasterContext::new(0, 0);
        draw_circle(&mut ctx, 0.0, 0.0, 1.0, 1.0);
        ctx.clear_rect(0.0, 0.0, 1.0, 1.0);
        assert!(ctx.pixels().is_empty());
    }

    #[test]
    fn set_size_reallocates_and_clears() {
        let mut s = RasterSurface::new(Some(LayoutBox::new(8.0, 8.0)));
        s.set_size(8, 8);
        draw_circle(s.context_mut().unwrap(), 4.0, 4.0, 2.0, 1.0);
        s.set_size(5, 2);
        assert_eq!((s.width(), s.height()), (5, 2));
        assert!(s.context().pixels().iter().all(|p| *p == [0.0; 4]));
    }

    #[test]
    fn check_dimensions_accepts_surfaces_within_the_limit() {
        assert!(check_dimensions(640, 480).is_ok());
        assert!(check_dimensions(4096, 4096).is_ok());
    }

    #[test]
    fn check_dimensions_rejects_empty_and_oversized_surfaces() {
        for (w, h) in [(0, 10), (10, 0), (4097, 4096), (200_000, 200_000), (u32::MAX, 1)] {
            assert!(
                matches!(check_dimensions(w, h), Err(StarfieldError::InvalidDimensions)),
                "{w}x{h} accepted"
            );
        }
    }

    #[test]
    fn oversized_context_stays_empty_instead_of_allocating() {
        let ctx = RasterContext::new(u32::MAX, u32::MAX);
        assert_eq!((ctx.width(), ctx.height()), (0, 0));
        assert!(ctx.pixels().is_empty());
    }

    #[test]
    fn oversized_set_size_leaves_surface_empty_and_drawable() {
        let mut s = RasterSurface::new(Some(LayoutBox::new(1e12, 1.0)));
        s.set_size(u32::MAX, 1);
        assert_eq!((s.width(), s.height()), (0, 0));
        draw_circle(s.context_mut().unwrap(), 1.0, 0.5, 1.0, 1.0);
        s.context_mut().unwrap().clear_rect(0.0, 0.0, 1e12, 1.0);
    }

    #[test]
    fn wide_context_indexes_last_row_without_overflow() {
        let mut ctx = RasterContext::new(4096, 3);
        draw_circle(&mut ctx, 4095.5, 2.5, 0.5, 1.0);
        assert!(ctx.pixel(4095, 2).unwrap()[3] > 0.0);
        assert_eq!(ctx.pixel(0, 0).unwrap()[3], 0.0);
    }

    #[test]
    fn manager_renders_stars_into_raster() {
        let mut discovery = RasterDiscovery::new(vec![LayoutBox::new(200.0, 100.0)]);
        let mut sched = ManualScheduler::new();
        let mut manager = StarfieldManager::new(StarfieldConfig::default(), 42);
        manager.initialize_all(&mut discovery, &mut sched);
        manager.pump(&mut sched);

        let starfield = manager.iter().next().unwrap();
        assert_eq!(starfield.stars().len(), 10);
        let lit = starfield
            .surface()
            .context()
            .pixels()
            .iter()
            .filter(|p| p[3] > 0.0)
            .count();
        assert!(lit > 0, "no star reached the raster");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn alpha_stays_in_unit_interval(
                x in -5.0f64..25.0,
                y in -5.0f64..25.0,
                r in 0.0f64..4.0,
                alpha in 0.0f64..1.0,
                repeats in 1usize..6,
            ) {
                let mut ctx = RasterContext::new(20, 20);
                for _ in 0..repeats {
                    draw_circle(&mut ctx, x, y, r, alpha);
                }
                for p in ctx.pixels() {
                    prop_assert!((0.0..=1.0).contains(&p[3]));
                    for c in &p[..3] {
                        prop_assert!(*c <= p[3] + 1e-12);
                    }
                }
            }
        }
    }
}
