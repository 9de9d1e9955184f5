//! Latest-frame mailbox shared between a frame source and the renderer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::types::Frame;

/// Holds the most recent frame and a sequence number bumped on every publish.
///
/// Readers never wait for a new frame: they compare sequence numbers and
/// either take the newer frame or keep using what they already have.
#[derive(Debug, Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Arc<Frame>>>,
    sequence: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest frame. Returns its sequence number (starting at 1).
    pub fn publish(&self, frame: Frame) -> u64 {
        let frame = Arc::new(frame);
        match self.latest.lock() {
            Ok(mut latest) => {
                *latest = Some(frame);
                self.sequence.fetch_add(1, Ordering::AcqRel) + 1
            }
            Err(_) => self.sequence.load(Ordering::Acquire),
        }
    }

    /// Sequence number of the latest published frame (0 if none yet).
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }

    /// The latest frame, regardless of whether it was seen before.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest.lock().ok()?.clone()
    }

    /// The latest frame if it is newer than `seen`, with its sequence number.
    pub fn newer_than(&self, seen: u64) -> Option<(u64, Arc<Frame>)> {
        if self.sequence() <= seen {
            return None;
        }
        let latest = self.latest.lock().ok()?;
        let frame = latest.clone()?;
        Some((self.sequence.load(Ordering::Acquire), frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot() {
        let slot = FrameSlot::new();
        assert_eq!(slot.sequence(), 0);
        assert!(slot.latest().is_none());
        assert!(slot.newer_than(0).is_none());
    }

    #[test]
    fn test_publish_and_poll() {
        let slot = FrameSlot::new();
        let seq = slot.publish(Frame::rgb(vec![1, 2, 3], 1, 1));
        assert_eq!(seq, 1);

        let (seen, frame) = slot.newer_than(0).expect("new frame");
        assert_eq!(seen, 1);
        assert_eq!(frame.data, vec![1, 2, 3]);

        // Nothing newer until the next publish
        assert!(slot.newer_than(seen).is_none());
        assert!(slot.latest().is_some());

        slot.publish(Frame::rgb(vec![4, 5, 6], 1, 1));
        let (seen, frame) = slot.newer_than(seen).expect("second frame");
        assert_eq!(seen, 2);
        assert_eq!(frame.data, vec![4, 5, 6]);
    }
}
