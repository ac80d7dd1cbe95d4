//! Browser bindings for the starfield engine.
//!
//! ```js
//! import init, { StarfieldHost } from "./starfield_wasm.js";
//! await init();
//! const host = StarfieldHost.mount(JSON.stringify({ color: "#d4a574" }));
//! // later, after the page re-renders its canvases:
//! host.initAll();
//! ```
//!
//! The host owns the manager and the `requestAnimationFrame` scheduler.
//! `mount` scans for `.starfield-canvas` elements (or the configured
//! selector), starts one starfield per canvas and resizes all of them on
//! every window `resize` event. Dropping the host (`free()` from JS) tears
//! it down like `dispose`.

mod canvas;
mod frame;
mod registration;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Once;

use log::warn;
use serde_json::Value;
use starfield_core::scheduler::FrameHandle;
use starfield_core::starfield::InstanceId;
use starfield_core::{StarfieldConfig, StarfieldManager};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

use canvas::{CanvasSurface, DomDiscovery};
use frame::{AnimationFrameScheduler, FrameSink};
use registration::Registration;

static LOGGER: Once = Once::new();

fn init_logging() {
    LOGGER.call_once(|| wasm_logger::init(wasm_logger::Config::new(log::Level::Info)));
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

struct HostInner {
    window: Window,
    document: Document,
    manager: RefCell<StarfieldManager<CanvasSurface>>,
    scheduler: RefCell<AnimationFrameScheduler<HostInner>>,
}

impl HostInner {
    fn initialize_all(&self) -> usize {
        let mut discovery = DomDiscovery::new(self.document.clone());
        let mut manager = self.manager.borrow_mut();
        let mut scheduler = self.scheduler.borrow_mut();
        manager.initialize_all(&mut discovery, &mut *scheduler)
    }

    fn resize_all(&self) {
        match self.manager.try_borrow_mut() {
            Ok(mut manager) => manager.resize_all(),
            Err(_) => warn!("resize during a manager update was skipped"),
        }
    }

    fn shutdown(&self) {
        let (Ok(mut manager), Ok(mut scheduler)) =
            (self.manager.try_borrow_mut(), self.scheduler.try_borrow_mut())
        else {
            warn!("shutdown during a manager update was skipped");
            return;
        };
        manager.shutdown(&mut *scheduler);
    }
}

impl FrameSink for HostInner {
    fn deliver(&self, target: InstanceId, handle: FrameHandle) {
        let (Ok(mut manager), Ok(mut scheduler)) =
            (self.manager.try_borrow_mut(), self.scheduler.try_borrow_mut())
        else {
            warn!("{target}: frame arrived during a manager update, dropped");
            return;
        };
        manager.on_frame(target, handle, &mut *scheduler);
    }
}

/// Owns every starfield on the page.
#[wasm_bindgen]
pub struct StarfieldHost {
    inner: Rc<HostInner>,
    on_resize: Option<Registration<Closure<dyn FnMut()>>>,
}

#[wasm_bindgen]
impl StarfieldHost {
    /// Creates an idle host. `params_json` is an optional JSON object of
    /// config overrides.
    #[wasm_bindgen(constructor)]
    pub fn new(params_json: Option<String>) -> Result<StarfieldHost, JsValue> {
        init_logging();
        let window = web_sys::window().ok_or_else(|| to_js("no global window"))?;
        let document = window.document().ok_or_else(|| to_js("window has no document"))?;
        let params = match params_json {
            Some(text) => serde_json::from_str::<Value>(&text).map_err(to_js)?,
            None => Value::Object(Default::default()),
        };
        let config = StarfieldConfig::from_json(&params).map_err(to_js)?;
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64;

        let inner = Rc::new_cyclic(|weak| HostInner {
            window: window.clone(),
            document,
            manager: RefCell::new(StarfieldManager::new(config, seed)),
            scheduler: RefCell::new(AnimationFrameScheduler::new(window, weak.clone())),
        });
        Ok(StarfieldHost {
            inner,
            on_resize: None,
        })
    }

    /// Creates a host, starts every starfield on the page and follows
    /// window resizes.
    pub fn mount(params_json: Option<String>) -> Result<StarfieldHost, JsValue> {
        let mut host = StarfieldHost::new(params_json)?;
        host.init_all();
        host.watch_resize()?;
        Ok(host)
    }

    /// Stops every running starfield and starts one per matching canvas.
    /// Returns the number of starfields now running.
    #[wasm_bindgen(js_name = initAll)]
    pub fn init_all(&self) -> usize {
        self.inner.initialize_all()
    }

    /// Re-fits every starfield to its parent element.
    #[wasm_bindgen(js_name = resizeAll)]
    pub fn resize_all(&self) {
        self.inner.resize_all();
    }

    /// Installs a window `resize` listener calling `resizeAll`. Idempotent.
    #[wasm_bindgen(js_name = watchResize)]
    pub fn watch_resize(&mut self) -> Result<(), JsValue> {
        if self.on_resize.is_some() {
            return Ok(());
        }
        let weak = Rc::downgrade(&self.inner);
        let listener = Closure::<dyn FnMut()>::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.resize_all();
            }
        });
        let window = self.inner.window.clone();
        window.add_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())?;
        self.on_resize = Some(Registration::new(listener, move |listener| {
            if let Err(e) = window
                .remove_event_listener_with_callback("resize", listener.as_ref().unchecked_ref())
            {
                warn!("could not remove resize listener: {e:?}");
            }
        }));
        Ok(())
    }

    /// Number of running starfields.
    pub fn count(&self) -> usize {
        self.inner.manager.borrow().len()
    }

    /// Stops every starfield and removes the resize listener.
    pub fn dispose(&mut self) {
        self.teardown();
    }
}

impl StarfieldHost {
    fn teardown(&mut self) {
        self.inner.shutdown();
        if let Some(mut listener) = self.on_resize.take() {
            listener.release();
        }
    }
}

impl Drop for StarfieldHost {
    fn drop(&mut self) {
        self.teardown();
    }
}
