//! Conversion from the premultiplied raster buffer to RGBA8 bytes.
//!
//! Always available (no feature gate) so both PNG snapshots and any other
//! byte-oriented sink share the same compositing.

use starfield_core::color::Rgb;

use crate::RasterContext;

/// Composites the buffer over an opaque `background` and returns
/// `width * height * 4` bytes (R, G, B, 255).
pub fn to_rgba8(context: &RasterContext, background: Rgb) -> Vec<u8> {
    let bg = [
        f64::from(background.r) / 255.0,
        f64::from(background.g) / 255.0,
        f64::from(background.b) / 255.0,
    ];
    context
        .pixels()
        .iter()
        .flat_map(|p| {
            let inv = 1.0 - p[3];
            let channel = |c: usize| ((p[c] + bg[c] * inv).clamp(0.0, 1.0) * 255.0).round() as u8;
            [channel(0), channel(1), channel(2), 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield_core::surface::DrawContext;
    use std::f64::consts::TAU;

    #[test]
    fn to_rgba8_correct_length() {
        let ctx = RasterContext::new(8, 4);
        assert_eq!(to_rgba8(&ctx, Rgb::new(0, 0, 0)).len(), 8 * 4 * 4);
    }

    #[test]
    fn empty_buffer_shows_background() {
        let ctx = RasterContext::new(2, 2);
        let buf = to_rgba8(&ctx, Rgb::new(10, 20, 30));
        for px in buf.chunks_exact(4) {
            assert_eq!(px, [10, 20, 30, 255]);
        }
    }

    #[test]
    fn opaque_fill_hides_background() {
        let mut ctx = RasterContext::new(3, 3);
        ctx.begin_path();
        ctx.arc(1.5, 1.5, 3.0, 0.0, TAU);
        ctx.set_fill_color(Rgb::AMBER.with_alpha(1.0));
        ctx.fill();
        let buf = to_rgba8(&ctx, Rgb::new(0, 0, 0));
        assert_eq!(&buf[16..20], &[212, 165, 116, 255]);
    }

    #[test]
    fn half_alpha_mixes_with_background() {
        let mut ctx = RasterContext::new(1, 1);
        ctx.begin_path();
        ctx.arc(0.5, 0.5, 2.0, 0.0, TAU);
        ctx.set_fill_color(Rgb::new(255, 255, 255).with_alpha(0.5));
        ctx.fill();
        let buf = to_rgba8(&ctx, Rgb::new(0, 0, 0));
        assert_eq!(buf, vec![128, 128, 128, 255]);
    }
}
