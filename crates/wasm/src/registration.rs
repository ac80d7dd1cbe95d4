//! Ownership of JS callbacks handed to the page.
//!
//! A `Closure` must outlive every JS reference to it. [`Registration`]
//! unregisters its value before dropping it. [`FrameClosures`] keeps one
//! closure per pending animation frame and frees it once the frame is
//! cancelled or has fired.

use std::collections::HashMap;

use starfield_core::scheduler::FrameHandle;

/// A value registered with the page, released exactly once: explicitly or
/// on drop.
pub struct Registration<T> {
    value: Option<T>,
    release: Box<dyn FnMut(T)>,
}

impl<T> Registration<T> {
    pub fn new(value: T, release: impl FnMut(T) + 'static) -> Self {
        Self {
            value: Some(value),
            release: Box::new(release),
        }
    }

    pub fn is_active(&self) -> bool {
        self.value.is_some()
    }

    pub fn release(&mut self) {
        if let Some(value) = self.value.take() {
            (self.release)(value);
        }
    }
}

impl<T> Drop for Registration<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Closures of in-flight animation frames.
///
/// A closure that is firing cannot be freed from inside its own call, so
/// [`FrameClosures::retire`] parks it until the next frame fires.
pub struct FrameClosures<C> {
    pending: HashMap<FrameHandle, C>,
    spent: Vec<C>,
}

impl<C> Default for FrameClosures<C> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            spent: Vec::new(),
        }
    }
}

impl<C> FrameClosures<C> {
    pub fn insert(&mut self, handle: FrameHandle, closure: C) {
        self.pending.insert(handle, closure);
    }

    /// Drops the closure of a frame that will never fire.
    pub fn cancel(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }

    /// Called as `handle` fires: frees closures of earlier frames and parks
    /// this one.
    pub fn retire(&mut self, handle: FrameHandle) {
        self.spent.clear();
        if let Some(closure) = self.pending.remove(&handle) {
            self.spent.push(closure);
        }
    }

    /// Closures still held, pending or parked.
    pub fn len(&self) -> usize {
        self.pending.len() + self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
