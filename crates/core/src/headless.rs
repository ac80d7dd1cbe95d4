//! In-memory host doubles.
//!
//! [`MemorySurface`] records every draw call instead of painting, so the
//! render order can be inspected. [`StaticDiscovery`] hands out a fixed set
//! of surfaces on every scan. Both back the test suites and the CLI's
//! `trace` command.

use serde::Serialize;

use crate::color::Rgba;
use crate::surface::{DrawContext, LayoutBox, Surface, SurfaceDiscovery};

/// One recorded call on a [`RecordingContext`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BeginPath,
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    SetFillColor {
        color: Rgba,
    },
    Fill,
}

/// A [`DrawContext`] that appends every call to a log.
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drains and returns the recorded calls.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of recorded `fill` calls.
    pub fn fill_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Fill))
            .count()
    }
}

impl DrawContext for RecordingContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        self.commands.push(DrawCommand::Arc {
            x,
            y,
            radius,
            start_angle,
            end_angle,
        });
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::SetFillColor { color });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }
}

/// A surface living entirely in memory.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    layout: Option<LayoutBox>,
    context: Option<RecordingContext>,
}

impl MemorySurface {
    /// A zero-sized surface inside a layout box of the given size; the first
    /// resize adopts the box size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: 0,
            height: 0,
            layout: Some(LayoutBox::new(width, height)),
            context: Some(RecordingContext::default()),
        }
    }

    /// A surface with no containing layout box.
    pub fn detached(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            layout: None,
            context: Some(RecordingContext::default()),
        }
    }

    /// Drops the drawing context, as a canvas that refuses `getContext`.
    pub fn without_context(mut self) -> Self {
        self.context = None;
        self
    }

    /// Replaces the containing layout box, e.g. to simulate a window resize.
    pub fn set_layout(&mut self, layout: Option<LayoutBox>) {
        self.layout = layout;
    }

    pub fn recorder(&self) -> Option<&RecordingContext> {
        self.context.as_ref()
    }

    pub fn recorder_mut(&mut self) -> Option<&mut RecordingContext> {
        self.context.as_mut()
    }
}

impl Surface for MemorySurface {
    type Context = RecordingContext;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn layout_box(&self) -> Option<LayoutBox> {
        self.layout
    }

    fn context_mut(&mut self) -> Option<&mut RecordingContext> {
        self.context.as_mut()
    }
}

/// Discovery that returns clones of a fixed set of surfaces on every scan,
/// regardless of the selector.
#[derive(Debug, Clone, Default)]
pub struct StaticDiscovery<S> {
    surfaces: Vec<S>,
    scans: usize,
}

impl<S: Surface + Clone> StaticDiscovery<S> {
    pub fn new(surfaces: Vec<S>) -> Self {
        Self { surfaces, scans: 0 }
    }

    /// Number of times [`discover`](SurfaceDiscovery::discover) ran.
    pub fn scans(&self) -> usize {
        self.scans
    }

    pub fn surfaces_mut(&mut self) -> &mut Vec<S> {
        &mut self.surfaces
    }
}

impl<S: Surface + Clone> SurfaceDiscovery for StaticDiscovery<S> {
    type Surface = S;

    fn discover(&mut self, _selector: &str) -> Vec<S> {
        self.scans += 1;
        self.surfaces.clone()
    }
}
