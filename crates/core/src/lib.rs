#![deny(unsafe_code)]
//! Core types for the starfield engine.
//!
//! A [`StarfieldManager`] finds starfield surfaces through a
//! [`SurfaceDiscovery`], binds one [`Starfield`] to each, and drives them
//! through a host [`FrameScheduler`]. Every frame a starfield clears its
//! surface, draws its [`Star`]s and then advances them. Hosts plug in by
//! implementing [`Surface`], [`DrawContext`] and [`FrameScheduler`]; the
//! [`headless`] module provides in-memory versions of all three.

pub mod color;
pub mod config;
pub mod error;
pub mod headless;
pub mod manager;
pub mod prng;
pub mod scheduler;
pub mod star;
pub mod starfield;
pub mod surface;

pub use color::{Rgb, Rgba};
pub use config::StarfieldConfig;
pub use error::StarfieldError;
pub use manager::StarfieldManager;
pub use prng::Xorshift64;
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use star::Star;
pub use starfield::{AnimationState, InstanceId, Starfield};
pub use surface::{DrawContext, LayoutBox, Surface, SurfaceDiscovery};
