//! Starfield tuning constants.
//!
//! [`StarfieldConfig::default`] reproduces the stock look: one star per 2000
//! square pixels capped at 1000, radii up to 1.5, drift under 0.15 px/frame,
//! a slow opacity flicker in [0.1, 0.8] and a faint halo on stars wider
//! than 1 px. Hosts may override any of them from a JSON params object.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::Rgb;
use crate::error::StarfieldError;

pub const DEFAULT_AREA_PER_STAR: f64 = 2000.0;
pub const DEFAULT_MAX_STARS: usize = 1000;
pub const DEFAULT_MAX_RADIUS: f64 = 1.5;
pub const DEFAULT_VELOCITY_SPREAD: f64 = 0.3;
pub const DEFAULT_INITIAL_OPACITY_MIN: f64 = 0.3;
pub const DEFAULT_INITIAL_OPACITY_MAX: f64 = 0.8;
pub const DEFAULT_OPACITY_MIN: f64 = 0.1;
pub const DEFAULT_OPACITY_MAX: f64 = 0.8;
pub const DEFAULT_FLICKER_STEP: f64 = 0.02;
/// Stars with a radius strictly above this get a halo.
pub const DEFAULT_HALO_THRESHOLD: f64 = 1.0;
pub const DEFAULT_HALO_SCALE: f64 = 2.0;
pub const DEFAULT_HALO_ALPHA: f64 = 0.2;
pub const DEFAULT_SELECTOR: &str = ".starfield-canvas";

/// Tuning knobs shared by every starfield a manager creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Surface area (square pixels) per star.
    pub area_per_star: f64,
    /// Hard cap on stars per surface.
    pub max_stars: usize,
    /// Radii are drawn uniformly from [0, max_radius).
    pub max_radius: f64,
    /// Velocity components are drawn from [-spread / 2, spread / 2).
    pub velocity_spread: f64,
    pub initial_opacity_min: f64,
    pub initial_opacity_max: f64,
    /// Opacity is clamped to [opacity_min, opacity_max] after every flicker.
    pub opacity_min: f64,
    pub opacity_max: f64,
    /// Width of the per-frame opacity random walk step.
    pub flicker_step: f64,
    pub halo_threshold: f64,
    /// Halo radius as a multiple of the star radius.
    pub halo_scale: f64,
    /// Halo alpha as a fraction of the star opacity.
    pub halo_alpha: f64,
    pub color: Rgb,
    /// Selector hosts use to find starfield surfaces.
    pub selector: String,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            area_per_star: DEFAULT_AREA_PER_STAR,
            max_stars: DEFAULT_MAX_STARS,
            max_radius: DEFAULT_MAX_RADIUS,
            velocity_spread: DEFAULT_VELOCITY_SPREAD,
            initial_opacity_min: DEFAULT_INITIAL_OPACITY_MIN,
            initial_opacity_max: DEFAULT_INITIAL_OPACITY_MAX,
            opacity_min: DEFAULT_OPACITY_MIN,
            opacity_max: DEFAULT_OPACITY_MAX,
            flicker_step: DEFAULT_FLICKER_STEP,
            halo_threshold: DEFAULT_HALO_THRESHOLD,
            halo_scale: DEFAULT_HALO_SCALE,
            halo_alpha: DEFAULT_HALO_ALPHA,
            color: Rgb::AMBER,
            selector: DEFAULT_SELECTOR.to_owned(),
        }
    }
}

impl StarfieldConfig {
    /// Builds a config from a JSON params object, then validates it.
    ///
    /// Missing keys and keys of the wrong JSON type fall back to defaults.
    /// A `color` string that is not a valid hex color is an error.
    pub fn from_json(params: &Value) -> Result<Self, StarfieldError> {
        let d = Self::default();
        let color = match params.get("color").and_then(Value::as_str) {
            Some(hex) => Rgb::from_hex(hex)?,
            None => d.color,
        };
        let config = Self {
            area_per_star: param_f64(params, "area_per_star", d.area_per_star),
            max_stars: param_usize(params, "max_stars", d.max_stars),
            max_radius: param_f64(params, "max_radius", d.max_radius),
            velocity_spread: param_f64(params, "velocity_spread", d.velocity_spread),
            initial_opacity_min: param_f64(params, "initial_opacity_min", d.initial_opacity_min),
            initial_opacity_max: param_f64(params, "initial_opacity_max", d.initial_opacity_max),
            opacity_min: param_f64(params, "opacity_min", d.opacity_min),
            opacity_max: param_f64(params, "opacity_max", d.opacity_max),
            flicker_step: param_f64(params, "flicker_step", d.flicker_step),
            halo_threshold: param_f64(params, "halo_threshold", d.halo_threshold),
            halo_scale: param_f64(params, "halo_scale", d.halo_scale),
            halo_alpha: param_f64(params, "halo_alpha", d.halo_alpha),
            color,
            selector: param_string(params, "selector", &d.selector),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks ranges that would otherwise break the area formula or the
    /// opacity clamp.
    pub fn validate(&self) -> Result<(), StarfieldError> {
        if !(self.area_per_star.is_finite() && self.area_per_star > 0.0) {
            return Err(StarfieldError::config(
                "area_per_star",
                "must be a positive finite number",
            ));
        }
        for (name, value) in [
            ("max_radius", self.max_radius),
            ("velocity_spread", self.velocity_spread),
            ("flicker_step", self.flicker_step),
            ("halo_threshold", self.halo_threshold),
            ("halo_scale", self.halo_scale),
            ("halo_alpha", self.halo_alpha),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(StarfieldError::config(name, "must be a non-negative finite number"));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity_min)
            || !(0.0..=1.0).contains(&self.opacity_max)
            || self.opacity_min > self.opacity_max
        {
            return Err(StarfieldError::config(
                "opacity_min",
                "opacity bounds must satisfy 0 <= opacity_min <= opacity_max <= 1",
            ));
        }
        if self.initial_opacity_min > self.initial_opacity_max
            || self.initial_opacity_min < self.opacity_min
            || self.initial_opacity_max > self.opacity_max
        {
            return Err(StarfieldError::config(
                "initial_opacity_min",
                "initial opacity range must lie within the opacity bounds",
            ));
        }
        if self.selector.trim().is_empty() {
            return Err(StarfieldError::config("selector", "must not be empty"));
        }
        Ok(())
    }

    /// Current values as a flat JSON object, in the same shape
    /// [`from_json`](Self::from_json) reads.
    pub fn params(&self) -> Value {
        json!({
            "area_per_star": self.area_per_star,
            "max_stars": self.max_stars,
            "max_radius": self.max_radius,
            "velocity_spread": self.velocity_spread,
            "initial_opacity_min": self.initial_opacity_min,
            "initial_opacity_max": self.initial_opacity_max,
            "opacity_min": self.opacity_min,
            "opacity_max": self.opacity_max,
            "flicker_step": self.flicker_step,
            "halo_threshold": self.halo_threshold,
            "halo_scale": self.halo_scale,
            "halo_alpha": self.halo_alpha,
            "color": self.color.to_hex(),
            "selector": self.selector,
        })
    }

    /// Schema describing every parameter: type, default and description.
    pub fn param_schema() -> Value {
        fn number(default: f64, description: &str) -> Value {
            json!({"type": "number", "default": default, "description": description})
        }
        json!({
            "area_per_star": number(DEFAULT_AREA_PER_STAR, "Square pixels of surface per star"),
            "max_stars": {
                "type": "integer",
                "default": DEFAULT_MAX_STARS,
                "description": "Maximum number of stars on one surface"
            },
            "max_radius": number(DEFAULT_MAX_RADIUS, "Upper bound of the star radius"),
            "velocity_spread": number(DEFAULT_VELOCITY_SPREAD, "Width of the per-axis velocity range"),
            "initial_opacity_min": number(DEFAULT_INITIAL_OPACITY_MIN, "Lowest opacity at spawn"),
            "initial_opacity_max": number(DEFAULT_INITIAL_OPACITY_MAX, "Highest opacity at spawn"),
            "opacity_min": number(DEFAULT_OPACITY_MIN, "Opacity floor while flickering"),
            "opacity_max": number(DEFAULT_OPACITY_MAX, "Opacity ceiling while flickering"),
            "flicker_step": number(DEFAULT_FLICKER_STEP, "Width of the per-frame opacity step"),
            "halo_threshold": number(DEFAULT_HALO_THRESHOLD, "Stars with a larger radius get a halo"),
            "halo_scale": number(DEFAULT_HALO_SCALE, "Halo radius relative to the star radius"),
            "halo_alpha": number(DEFAULT_HALO_ALPHA, "Halo alpha relative to the star opacity"),
            "color": {
                "type": "string",
                "default": Rgb::AMBER.to_hex(),
                "description": "Star hue as #rrggbb"
            },
            "selector": {
                "type": "string",
                "default": DEFAULT_SELECTOR,
                "description": "CSS selector for starfield canvases"
            }
        })
    }
}

fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}
