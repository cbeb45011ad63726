//! Frames: the virtual call stack, kept as queue data.
//!
//! A [`Frame`] is attached to every queued entry. Returning from a frame
//! reports the outcome to its return callback and discards the work still
//! queued under the frame's [`FrameControl`]. Discarding is lazy: the control
//! bumps a generation counter, and entries queued under an older generation
//! are skipped when they reach the front of the queue.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::callback::ResultCallback;

/// The depth-scoped governor shared by every entry queued under one frame.
#[derive(Debug)]
pub struct FrameControl {
    depth: usize,
    generation: Cell<u32>,
}

impl FrameControl {
    /// Creates a governor for the given depth.
    #[must_use]
    pub fn new(depth: usize) -> Rc<Self> {
        Rc::new(Self {
            depth,
            generation: Cell::new(0),
        })
    }

    /// Returns the depth this governor was created for.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the current generation.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    /// Discards every entry queued under this governor so far.
    ///
    /// Entries queued afterwards are unaffected.
    pub fn discard(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
    }

    /// Returns true if work stamped with `generation` is still live.
    #[must_use]
    pub fn is_live(&self, generation: u32) -> bool {
        self.generation.get() == generation
    }
}

/// One level of the virtual call stack.
#[derive(Clone)]
pub struct Frame {
    depth: usize,
    return_callback: ResultCallback,
    control: Rc<FrameControl>,
}

impl Frame {
    /// Creates a frame.
    #[must_use]
    pub fn new(depth: usize, return_callback: ResultCallback, control: Rc<FrameControl>) -> Self {
        Self {
            depth,
            return_callback,
            control,
        }
    }

    /// Returns the depth of this frame (0 = top level).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the callback that receives this frame's outcome.
    #[must_use]
    pub fn return_callback(&self) -> &ResultCallback {
        &self.return_callback
    }

    /// Returns the governor for this frame.
    #[must_use]
    pub fn control(&self) -> &Rc<FrameControl> {
        &self.control
    }

    /// Ends the frame successfully with `result`.
    pub fn return_success(&self, result: i32) {
        self.return_callback.on_success(result);
        self.discard();
    }

    /// Ends the frame with a failure.
    pub fn return_failure(&self) {
        self.return_callback.on_failure();
        self.discard();
    }

    /// Drops the remaining queued work of this frame without reporting.
    pub fn discard(&self) {
        self.control.discard();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("depth", &self.depth)
            .field("control_depth", &self.control.depth)
            .field("generation", &self.control.generation())
            .finish_non_exhaustive()
    }
}
