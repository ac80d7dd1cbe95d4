//! A single star: spawn, per-frame drift and flicker, and drawing.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::config::StarfieldConfig;
use crate::prng::Xorshift64;
use crate::surface::DrawContext;

/// One animated point.
///
/// Radius and velocity are fixed for the star's lifetime; position and
/// opacity change every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub opacity: f64,
}

impl Star {
    /// Spawns a star uniformly inside a `width` x `height` surface.
    pub fn spawn(width: f64, height: f64, config: &StarfieldConfig, rng: &mut Xorshift64) -> Self {
        let position = DVec2::new(rng.next_f64() * width, rng.next_f64() * height);
        let radius = rng.next_f64() * config.max_radius;
        let velocity = DVec2::new(
            rng.next_centered(config.velocity_spread),
            rng.next_centered(config.velocity_spread),
        );
        let opacity = rng.next_range(config.initial_opacity_min, config.initial_opacity_max);
        Self {
            position,
            velocity,
            radius,
            opacity,
        }
    }

    /// Advances one frame: drift by the velocity, random-walk the opacity,
    /// then wrap the position back onto the surface.
    pub fn advance(
        &mut self,
        width: f64,
        height: f64,
        config: &StarfieldConfig,
        rng: &mut Xorshift64,
    ) {
        self.position += self.velocity;
        self.opacity = (self.opacity + rng.next_centered(config.flicker_step))
            .clamp(config.opacity_min, config.opacity_max);
        self.position = DVec2::new(
            wrap_coordinate(self.position.x, width),
            wrap_coordinate(self.position.y, height),
        );
    }

    /// Whether this star is large enough to get a halo.
    pub fn has_halo(&self, config: &StarfieldConfig) -> bool {
        self.radius > config.halo_threshold
    }

    /// Draws the star, and its halo if it has one, at its current position.
    pub fn draw<C: DrawContext + ?Sized>(&self, ctx: &mut C, config: &StarfieldConfig) {
        fill_circle(ctx, self.position, self.radius, config, self.opacity);
        if self.has_halo(config) {
            fill_circle(
                ctx,
                self.position,
                self.radius * config.halo_scale,
                config,
                self.opacity * config.halo_alpha,
            );
        }
    }
}

fn fill_circle<C: DrawContext + ?Sized>(
    ctx: &mut C,
    center: DVec2,
    radius: f64,
    config: &StarfieldConfig,
    alpha: f64,
) {
    ctx.begin_path();
    ctx.arc(center.x, center.y, radius, 0.0, TAU);
    ctx.set_fill_color(config.color.with_alpha(alpha));
    ctx.fill();
}

/// Number of stars for a surface: one per `area_per_star` square pixels,
/// rounded down and capped at `max_stars`.
pub fn star_count(width: u32, height: u32, config: &StarfieldConfig) -> usize {
    let area = f64::from(width) * f64::from(height);
    let count = (area / config.area_per_star).floor();
    if count.is_finite() && count > 0.0 {
        (count.min(config.max_stars as f64)) as usize
    } else {
        0
    }
}

/// Spawns a fresh batch sized by [`star_count`].
pub fn spawn_batch(
    width: u32,
    height: u32,
    config: &StarfieldConfig,
    rng: &mut Xorshift64,
) -> Vec<Star> {
    let (w, h) = (f64::from(width), f64::from(height));
    (0..star_count(width, height, config))
        .map(|_| Star::spawn(w, h, config, rng))
        .collect()
}

/// Wraps `value` onto the half-open range [0, extent), so a star leaving one
/// edge re-enters from the opposite one. A non-positive extent pins to 0.
pub fn wrap_coordinate(value: f64, extent: f64) -> f64 {
    if extent.is_nan() || extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    if (0.0..extent).contains(&value) {
        return value;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid may round up to `extent` for tiny negative inputs.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}
