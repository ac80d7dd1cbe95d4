//! One starfield bound to one surface.
//!
//! Lifecycle is `Unstarted -> Running -> Stopped`. Stopped is terminal: a
//! manager discards stopped instances and creates fresh ones on rescan.
//! While running, every frame renders the batch at its current positions,
//! then advances it, then requests the next frame.

use std::fmt;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::config::StarfieldConfig;
use crate::prng::Xorshift64;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::star::{spawn_batch, Star};
use crate::surface::{DrawContext, Surface};

/// Identity of a starfield within its manager. Never reused, so a frame
/// addressed to a discarded instance cannot reach its replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "starfield#{}", self.0)
    }
}

/// Animation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Unstarted,
    /// `pending` is the frame the host will deliver next, if scheduling
    /// succeeded.
    Running { pending: Option<FrameHandle> },
    Stopped,
}

/// A batch of stars animated on one surface.
pub struct Starfield<S: Surface> {
    id: InstanceId,
    surface: S,
    config: StarfieldConfig,
    stars: Vec<Star>,
    state: AnimationState,
    rng: Xorshift64,
    frames: u64,
}

impl<S: Surface> Starfield<S> {
    /// Binds a new, unstarted starfield to `surface`. No stars exist until
    /// the first resize.
    pub fn new(id: InstanceId, surface: S, config: StarfieldConfig, rng: Xorshift64) -> Self {
        Self {
            id,
            surface,
            config,
            stars: Vec::new(),
            state: AnimationState::Unstarted,
            rng,
            frames: 0,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    /// The current star batch.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnimationState::Running { .. })
    }

    /// Frames rendered since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sizes the surface, spawns the first batch and schedules the first
    /// frame. Only an unstarted starfield can start.
    pub fn start<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if self.state != AnimationState::Unstarted {
            debug!("{}: start ignored in state {:?}", self.id, self.state);
            return;
        }
        self.resize();
        let pending = self.schedule(scheduler);
        self.state = AnimationState::Running { pending };
        debug!(
            "{}: started with {} stars on {}x{}",
            self.id,
            self.stars.len(),
            self.surface.width(),
            self.surface.height()
        );
    }

    /// Runs one frame if `handle` is the frame this starfield is waiting for.
    ///
    /// Returns `false`, doing nothing, for stale or unexpected handles and
    /// when not running.
    pub fn on_frame<F: FrameScheduler + ?Sized>(
        &mut self,
        handle: FrameHandle,
        scheduler: &mut F,
    ) -> bool {
        match self.state {
            AnimationState::Running {
                pending: Some(expected),
            } if expected == handle => {}
            state => {
                trace!("{}: dropping frame {:?} in state {:?}", self.id, handle, state);
                return false;
            }
        }
        self.render();
        self.update();
        self.frames += 1;
        let pending = self.schedule(scheduler);
        self.state = AnimationState::Running { pending };
        true
    }

    /// Clears the surface and draws every star at its current position.
    /// Does nothing without a drawing context.
    pub fn render(&mut self) {
        let (width, height) = (
            f64::from(self.surface.width()),
            f64::from(self.surface.height()),
        );
        let Some(ctx) = self.surface.context_mut() else {
            trace!("{}: no drawing context, skipping render", self.id);
            return;
        };
        ctx.clear_rect(0.0, 0.0, width, height);
        for star in &self.stars {
            star.draw(ctx, &self.config);
        }
    }

    /// Advances every star by one frame.
    pub fn update(&mut self) {
        let (width, height) = (
            f64::from(self.surface.width()),
            f64::from(self.surface.height()),
        );
        for star in &mut self.stars {
            star.advance(width, height, &self.config, &mut self.rng);
        }
    }

    /// Adopts the containing layout box's size and replaces the whole batch.
    ///
    /// Works in any state and leaves the state unchanged. Without a layout
    /// box it does nothing and returns `false`.
    pub fn resize(&mut self) -> bool {
        let Some(layout) = self.surface.layout_box() else {
            debug!("{}: no layout box, resize skipped", self.id);
            return false;
        };
        let (width, height) = layout.pixel_size();
        self.surface.set_size(width, height);
        self.stars = spawn_batch(width, height, &self.config, &mut self.rng);
        debug!(
            "{}: resized to {}x{}, {} stars",
            self.id,
            width,
            height,
            self.stars.len()
        );
        true
    }

    /// Cancels the pending frame and stops for good. Safe to call in any
    /// state, any number of times.
    pub fn stop<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) {
        if let AnimationState::Running {
            pending: Some(handle),
        } = self.state
        {
            scheduler.cancel_frame(handle);
        }
        if self.state != AnimationState::Stopped {
            debug!("{}: stopped after {} frames", self.id, self.frames);
        }
        self.state = AnimationState::Stopped;
    }

    fn schedule<F: FrameScheduler + ?Sized>(&mut self, scheduler: &mut F) -> Option<FrameHandle> {
        let pending = scheduler.request_frame(self.id);
        if pending.is_none() {
            warn!("{}: host refused to schedule a frame", self.id);
        }
        pending
    }
}

impl<S: Surface + fmt::Debug> fmt::Debug for Starfield<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Starfield")
            .field("id", &self.id)
            .field("surface", &self.surface)
            .field("stars", &self.stars.len())
            .field("state", &self.state)
            .field("frames", &self.frames)
            .finish()
    }
}
