//! `<canvas>` elements as starfield surfaces.

use log::{trace, warn};
use starfield_core::color::Rgba;
use starfield_core::surface::{DrawContext, LayoutBox, Surface, SurfaceDiscovery};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

/// A canvas 2-D context.
pub struct CanvasContext {
    ctx: CanvasRenderingContext2d,
}

impl DrawContext for CanvasContext {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ctx.clear_rect(x, y, width, height);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64) {
        if let Err(e) = self.ctx.arc(x, y, radius, start_angle, end_angle) {
            trace!("arc rejected: {e:?}");
        }
    }

    fn set_fill_color(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }
}

/// A canvas element, sized from its parent element's layout box.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: Option<CanvasContext>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .map(|ctx| CanvasContext { ctx });
        if context.is_none() {
            warn!("canvas has no 2d context; it will stay blank");
        }
        Self { canvas, context }
    }
}

impl Surface for CanvasSurface {
    type Context = CanvasContext;

    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn layout_box(&self) -> Option<LayoutBox> {
        let parent = self.canvas.parent_element()?.dyn_into::<HtmlElement>().ok()?;
        Some(LayoutBox::new(
            f64::from(parent.offset_width()),
            f64::from(parent.offset_height()),
        ))
    }

    fn context_mut(&mut self) -> Option<&mut CanvasContext> {
        self.context.as_mut()
    }
}

/// Finds canvases with `document.querySelectorAll`.
pub struct DomDiscovery {
    document: Document,
}

impl DomDiscovery {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SurfaceDiscovery for DomDiscovery {
    type Surface = CanvasSurface;

    fn discover(&mut self, selector: &str) -> Vec<CanvasSurface> {
        let nodes = match self.document.query_selector_all(selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!("selector '{selector}' rejected: {e:?}");
                return Vec::new();
            }
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlCanvasElement>().ok())
            .map(CanvasSurface::new)
            .collect()
    }
}
