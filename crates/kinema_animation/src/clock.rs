//! Frame clock abstraction
//!
//! The scheduler does not own a render loop. It asks a [`FrameClock`] for the
//! next frame and the host calls [`AnimationScheduler::on_frame`] when that
//! frame arrives (vsync, `requestAnimationFrame`, a winit redraw, a test).
//!
//! [`AnimationScheduler::on_frame`]: crate::scheduler::AnimationScheduler::on_frame

/// Handle for one outstanding frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Source of frame callbacks
pub trait FrameClock {
    /// Ask for one frame callback
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request made with [`FrameClock::request_frame`]
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// A clock driven by hand
///
/// Records the pending request so headless hosts and tests can decide when to
/// deliver the next frame.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    pending: Option<FrameRequest>,
    requested: usize,
    cancelled: usize,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request waiting to be delivered, if any
    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Take the pending request, as a host does right before delivering it
    pub fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }

    pub fn request_count(&self) -> usize {
        self.requested
    }

    pub fn cancel_count(&self) -> usize {
        self.cancelled
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.cancelled += 1;
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}
