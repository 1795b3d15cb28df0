//! Animation frame queue
//!
//! Widgets that need final layout before positioning themselves request a
//! one-shot callback for the next frame. The host (or a test) flushes the
//! queue with [`Document::run_animation_frames`](crate::Document::run_animation_frames).

use std::collections::VecDeque;

use crate::document::Document;

/// One-shot callback run on the next frame
pub type FrameCallback = Box<dyn FnOnce(&mut Document)>;

/// Handle for cancelling a requested frame callback
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Default)]
pub(crate) struct FrameQueue {
    next: u64,
    pending: VecDeque<(FrameHandle, FrameCallback)>,
}

impl FrameQueue {
    pub(crate) fn request(&mut self, callback: FrameCallback) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push_back((handle, callback));
        handle
    }

    pub(crate) fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    /// Take everything queued so far; callbacks requested while these run
    /// land in the next frame.
    pub(crate) fn take(&mut self) -> VecDeque<(FrameHandle, FrameCallback)> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_cancel() {
        let mut queue = FrameQueue::default();
        let a = queue.request(Box::new(|_| {}));
        let b = queue.request(Box::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(queue.len(), 2);

        assert!(queue.cancel(a));
        assert!(!queue.cancel(a));
        assert_eq!(queue.len(), 1);

        let taken = queue.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].0, b);
        assert_eq!(queue.len(), 0);
    }
}
