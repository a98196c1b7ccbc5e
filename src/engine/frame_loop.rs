// Cancellable repeating frame task.
//
// Works like a display-synced "call me again next frame" loop:
//   start()         → first frame pending, returns the only FrameHandle
//   begin_frame()   → consumes the pending request (false if none / stopped)
//   schedule_next() → the running frame asks for the next one
//   FrameHandle::stop() → cancels the pending request, refuses new ones
//
// Single threaded: the host's event loop polls wants_frame() and drives
// begin_frame() from its redraw callback, so Rc<Cell> is all the sharing
// needed.

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct LoopState {
    running: Cell<bool>,
    pending: Cell<bool>,
    frames: Cell<u64>,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    state: Rc<LoopState>,
}

/// Stop handle returned by [`FrameLoop::start`]. `stop` consumes it, so a
/// loop is cancelled at most once per start.
#[derive(Debug)]
pub struct FrameHandle {
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the loop with one frame pending.
    #[must_use = "dropping the handle leaves no way to stop the loop"]
    pub fn start(&self) -> FrameHandle {
        self.state.running.set(true);
        self.state.pending.set(true);
        FrameHandle {
            state: Rc::clone(&self.state),
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    /// True when a frame is due and the host should request a redraw.
    pub fn wants_frame(&self) -> bool {
        self.state.running.get() && self.state.pending.get()
    }

    /// Consume the pending frame request. Returns false if the loop is
    /// stopped or no frame was requested.
    pub fn begin_frame(&self) -> bool {
        if !self.wants_frame() {
            return false;
        }
        self.state.pending.set(false);
        self.state.frames.set(self.state.frames.get() + 1);
        true
    }

    /// Request the next frame. Ignored once stopped.
    pub fn schedule_next(&self) {
        if self.state.running.get() {
            self.state.pending.set(true);
        }
    }

    /// Frames begun since construction.
    pub fn frames(&self) -> u64 {
        self.state.frames.get()
    }
}

impl FrameHandle {
    pub fn stop(self) {
        self.state.running.set(false);
        self.state.pending.set(false);
    }
}
