//! Latest-pose handoff between the tracker thread and the control cycle
//!
//! The tracker may produce frames faster or slower than the serial round
//! trip. The slot holds at most one frame: a newer frame replaces an unread
//! one, and an empty slot means "nothing new", which makes the cycle hold its
//! previous command.

use super::source::PoseSource;
use crate::error::{Error, Result};
use crate::pose::landmarks::TrackerFrame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Default)]
struct SlotState {
    latest: Option<TrackerFrame>,
    closed: bool,
    published: u64,
    dropped: u64,
}

/// Single-slot, latest-wins frame buffer
#[derive(Default)]
pub struct PoseSlot {
    state: Mutex<SlotState>,
}

impl PoseSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, replacing any unread one
    ///
    /// Returns true if an unread frame was dropped.
    pub fn publish(&self, frame: TrackerFrame) -> bool {
        let mut state = self.state.lock();
        state.published += 1;
        let dropped = state.latest.replace(frame).is_some();
        if dropped {
            state.dropped += 1;
        }
        dropped
    }

    /// Take the latest frame, leaving the slot empty
    pub fn take(&self) -> Option<TrackerFrame> {
        self.state.lock().latest.take()
    }

    /// Mark the producer as finished
    pub fn close(&self) {
        self.state.lock().closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Frames published so far
    pub fn published(&self) -> u64 {
        self.state.lock().published
    }

    /// Frames overwritten before the cycle read them
    pub fn dropped(&self) -> u64 {
        self.state.lock().dropped
    }
}

/// Consumer side of a [`PoseSlot`]
///
/// Yields the latest frame, an empty frame when nothing new arrived, and
/// ends once the slot is closed and drained.
pub struct SlotSource {
    slot: Arc<PoseSlot>,
}

impl SlotSource {
    pub fn new(slot: Arc<PoseSlot>) -> Self {
        Self { slot }
    }
}

impl PoseSource for SlotSource {
    fn next_frame(&mut self) -> Result<Option<TrackerFrame>> {
        // Check before taking so a final frame published right before close
        // is still delivered
        let closed = self.slot.is_closed();
        match self.slot.take() {
            Some(frame) => Ok(Some(frame)),
            None if closed => Ok(None),
            None => Ok(Some(TrackerFrame::empty())),
        }
    }
}

/// Drive `source` into `slot` on a dedicated thread
///
/// The thread stops when the source ends, a non-recoverable source error
/// occurs, or `running` clears; the slot is closed on exit.
pub fn spawn_tracker_thread<S>(
    mut source: S,
    slot: Arc<PoseSlot>,
    running: Arc<AtomicBool>,
) -> Result<JoinHandle<()>>
where
    S: PoseSource + Send + 'static,
{
    thread::Builder::new()
        .name("pose-tracker".to_string())
        .spawn(move || {
            while running.load(Ordering::Relaxed) {
                match source.next_frame() {
                    Ok(Some(frame)) => {
                        if slot.publish(frame) {
                            log::trace!("Dropped stale tracker frame");
                        }
                    }
                    Ok(None) => {
                        log::info!("Tracker input ended");
                        break;
                    }
                    Err(Error::TrackerInput(e)) => {
                        log::warn!("Skipping malformed tracker frame: {}", e);
                    }
                    Err(e) => {
                        log::error!("Tracker input failed: {}", e);
                        break;
                    }
                }
            }
            slot.close();
            log::debug!(
                "Tracker thread exiting ({} published, {} dropped)",
                slot.published(),
                slot.dropped()
            );
        })
        .map_err(|e| Error::Other(format!("Failed to spawn tracker thread: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::source::ReplaySource;
    use crate::pose::landmarks::{Handedness, Landmark, LandmarkSet, LANDMARK_COUNT};

    fn frame_at(x: f64) -> TrackerFrame {
        let set = LandmarkSet::new(&[Landmark::new(x, 0.5); LANDMARK_COUNT]).unwrap();
        TrackerFrame::single(Handedness::Left, set)
    }

    #[test]
    fn test_latest_wins() {
        let slot = PoseSlot::new();
        assert!(!slot.publish(frame_at(0.1)));
        assert!(slot.publish(frame_at(0.2)));

        assert_eq!(slot.take(), Some(frame_at(0.2)));
        assert!(slot.take().is_none());
        assert_eq!(slot.published(), 2);
        assert_eq!(slot.dropped(), 1);
    }

    #[test]
    fn test_slot_source_holds_then_ends() {
        let slot = Arc::new(PoseSlot::new());
        let mut source = SlotSource::new(Arc::clone(&slot));

        assert_eq!(source.next_frame().unwrap(), Some(TrackerFrame::empty()));

        slot.publish(frame_at(0.3));
        slot.close();
        assert_eq!(source.next_frame().unwrap(), Some(frame_at(0.3)));
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_tracker_thread_drains_source() {
        let slot = Arc::new(PoseSlot::new());
        let running = Arc::new(AtomicBool::new(true));
        let source = ReplaySource::new(vec![frame_at(0.1), frame_at(0.2), frame_at(0.3)]);

        let handle = spawn_tracker_thread(source, Arc::clone(&slot), running).unwrap();
        handle.join().unwrap();

        assert!(slot.is_closed());
        assert_eq!(slot.published(), 3);
        assert_eq!(slot.take(), Some(frame_at(0.3)));
    }

    #[test]
    fn test_tracker_thread_stops_when_not_running() {
        let slot = Arc::new(PoseSlot::new());
        let running = Arc::new(AtomicBool::new(false));
        let source = ReplaySource::new(vec![frame_at(0.1)]);

        spawn_tracker_thread(source, Arc::clone(&slot), running)
            .unwrap()
            .join()
            .unwrap();

        assert!(slot.is_closed());
        assert_eq!(slot.published(), 0);
    }
}
