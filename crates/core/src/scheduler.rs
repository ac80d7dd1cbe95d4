//! Repaint-cadence scheduling.
//!
//! A starfield never runs its own timer. Each tick asks the host for one
//! callback before the next repaint, addressed to the instance by its
//! [`InstanceId`]; the host later hands the [`FrameHandle`] back through
//! [`StarfieldManager::on_frame`](crate::manager::StarfieldManager::on_frame).

use crate::starfield::InstanceId;

/// Opaque handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Host primitive providing "call me once before the next repaint".
pub trait FrameScheduler {
    /// Schedules one frame for `target`. Returns `None` if the host cannot
    /// schedule, in which case the animation simply stops advancing.
    fn request_frame(&mut self, target: InstanceId) -> Option<FrameHandle>;

    /// Cancels a previously scheduled frame. Unknown or already-fired handles
    /// are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// A frame waiting in a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFrame {
    pub handle: FrameHandle,
    pub target: InstanceId,
}

/// Scheduler driven explicitly by the caller, one "repaint" at a time.
///
/// Used by headless renders and tests: [`take_due`](Self::take_due) returns
/// every frame requested so far, and the caller dispatches them.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_handle: u64,
    pending: Vec<PendingFrame>,
    cancelled: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested and not yet taken or cancelled.
    pub fn pending(&self) -> &[PendingFrame] {
        &self.pending
    }

    /// Removes and returns all pending frames, in request order.
    pub fn take_due(&mut self) -> Vec<PendingFrame> {
        std::mem::take(&mut self.pending)
    }

    /// Number of frames cancelled while still pending.
    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self, target: InstanceId) -> Option<FrameHandle> {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push(PendingFrame { handle, target });
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let before = self.pending.len();
        self.pending.retain(|f| f.handle != handle);
        self.cancelled += before - self.pending.len();
    }
}
