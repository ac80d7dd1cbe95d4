//! `requestAnimationFrame` scheduling.
//!
//! Each request registers a closure that, when the browser fires it, hands
//! `(target, handle)` back to the host. Closures hold only weak references,
//! so a dropped host turns pending callbacks into no-ops. The scheduler owns
//! every closure and frees it on cancel or after it fires.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::warn;
use starfield_core::scheduler::{FrameHandle, FrameScheduler};
use starfield_core::starfield::InstanceId;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::registration::FrameClosures;

/// Receiver of fired animation frames.
pub trait FrameSink {
    fn deliver(&self, target: InstanceId, handle: FrameHandle);
}

type FrameStore = RefCell<FrameClosures<Closure<dyn FnMut()>>>;

pub struct AnimationFrameScheduler<H: FrameSink + 'static> {
    window: Window,
    host: Weak<H>,
    closures: Rc<FrameStore>,
}

impl<H: FrameSink + 'static> AnimationFrameScheduler<H> {
    pub fn new(window: Window, host: Weak<H>) -> Self {
        Self {
            window,
            host,
            closures: Rc::new(RefCell::new(FrameClosures::default())),
        }
    }
}

impl<H: FrameSink + 'static> FrameScheduler for AnimationFrameScheduler<H> {
    fn request_frame(&mut self, target: InstanceId) -> Option<FrameHandle> {
        let host = self.host.clone();
        let store = Rc::downgrade(&self.closures);
        let issued = Rc::new(Cell::new(None));
        let slot = Rc::clone(&issued);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let Some(handle) = slot.get() else {
                return;
            };
            if let Some(store) = store.upgrade() {
                match store.try_borrow_mut() {
                    Ok(mut closures) => closures.retire(handle),
                    Err(_) => warn!("{target}: frame closure store busy, not retired"),
                }
            }
            if let Some(host) = host.upgrade() {
                host.deliver(target, handle);
            }
        });
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => {
                let handle = handle_from_raf(id);
                issued.set(Some(handle));
                self.closures.borrow_mut().insert(handle, callback);
                Some(handle)
            }
            Err(e) => {
                warn!("requestAnimationFrame failed for {target}: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(e) = self.window.cancel_animation_frame(raf_id(handle)) {
            warn!("cancelAnimationFrame failed: {e:?}");
        }
        self.closures.borrow_mut().cancel(handle);
    }
}

/// `requestAnimationFrame` ids are positive `long`s.
fn handle_from_raf(id: i32) -> FrameHandle {
    FrameHandle(u64::from(id as u32))
}

fn raf_id(handle: FrameHandle) -> i32 {
    handle.0 as u32 as i32
}
