//! Frame scheduling boundary
//!
//! The system never loops or sleeps on its own; it asks the host for
//! "one callback before the next repaint" and performs a tick when that
//! callback is delivered via [`SnowParticleSystem::on_frame`].
//!
//! [`SnowParticleSystem::on_frame`]: crate::system::SnowParticleSystem::on_frame

/// Opaque token for one scheduled frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FrameHandle(pub u64);

/// Host-provided "run this callback on the next frame" primitive.
pub trait FrameScheduler {
    /// Request one callback before the next repaint.
    fn schedule(&mut self) -> FrameHandle;
    /// Cancel a previously scheduled callback. Cancelling an already
    /// delivered or unknown handle is a no-op. The system additionally
    /// ignores stale handles on delivery, so a scheduler that cannot
    /// truly cancel (it may still fire) remains correct.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Scheduler for hosts that drive frames themselves: each `schedule` call
/// parks one handle which the host picks up and delivers when it decides
/// a frame has elapsed. Also the scheduler used throughout the tests.
#[derive(Default)]
pub struct ManualScheduler {
    next: u64,
    pending: Option<FrameHandle>,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The not-yet-delivered frame, if any.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Mark the pending frame as delivered and return its handle.
    pub fn take_pending(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    /// How many frames have been cancelled so far.
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}
