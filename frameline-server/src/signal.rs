//! Highlight/skip coordination channel
//!
//! The pin overlay, the thread list, and the player are independently
//! mounted views with no shared parent; this hub carries their intent
//! signals (hover a pin, jump from a thread, clear on pointer-leave) so an
//! interaction in one deterministically affects the others.
//!
//! Delivery is at-most-once, in-process fan-out to the listeners registered
//! at emission time. Nothing is queued for late subscribers and nothing is
//! persisted; each emission is a discrete, terminal broadcast. The hub is
//! owned by the room and handed to listeners explicitly.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Cross-view intent signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinSignal {
    /// A pin was hovered or clicked: the matching thread should light up
    HighlightThread { thread_id: Uuid },
    /// A thread was hovered: the matching pin should light up
    HighlightPin { thread_id: Uuid },
    /// Jump playback to a timeline percentage
    SkipTo { percentage: f64 },
    /// Pointer left: every highlight clears
    ResetHighlights,
}

/// Fan-out hub for [`PinSignal`]s, one per room
#[derive(Clone)]
pub struct SignalHub {
    tx: broadcast::Sender<PinSignal>,
}

impl SignalHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PinSignal> {
        self.tx.subscribe()
    }

    /// Emit to whoever is listening right now; an empty room is fine.
    pub fn emit(&self, signal: PinSignal) {
        let _ = self.tx.send(signal);
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Which family of highlight signals a tracker reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightLane {
    /// Thread list entries react to `HighlightThread`
    Thread,
    /// Timeline pins react to `HighlightPin`
    Pin,
}

/// Per-listener highlight state implementing the pulse protocol.
///
/// A highlight for another thread clears this tracker. A highlight for its
/// own thread clears it immediately and re-sets it on the next [`settle`],
/// so hovering the same pin twice restarts the animation instead of being
/// swallowed as a no-op.
///
/// [`settle`]: HighlightTracker::settle
#[derive(Debug)]
pub struct HighlightTracker {
    thread_id: Uuid,
    lane: HighlightLane,
    highlighted: bool,
    retrigger: bool,
}

impl HighlightTracker {
    pub fn new(thread_id: Uuid, lane: HighlightLane) -> Self {
        Self {
            thread_id,
            lane,
            highlighted: false,
            retrigger: false,
        }
    }

    /// Apply one observed signal.
    pub fn observe(&mut self, signal: PinSignal) {
        let target = match (self.lane, signal) {
            (HighlightLane::Thread, PinSignal::HighlightThread { thread_id }) => thread_id,
            (HighlightLane::Pin, PinSignal::HighlightPin { thread_id }) => thread_id,
            (_, PinSignal::ResetHighlights) => {
                self.highlighted = false;
                self.retrigger = false;
                return;
            }
            // Skip requests and the other lane's highlights are not ours
            _ => return,
        };

        self.highlighted = false;
        self.retrigger = target == self.thread_id;
    }

    /// The deferred half of the pulse: apply the pending re-trigger.
    pub fn settle(&mut self) {
        if self.retrigger {
            self.highlighted = true;
            self.retrigger = false;
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn thread_id(&self) -> Uuid {
        self.thread_id
    }

    pub fn lane(&self) -> HighlightLane {
        self.lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hub_fan_out() {
        let hub = SignalHub::default();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let id = Uuid::new_v4();
        hub.emit(PinSignal::HighlightThread { thread_id: id });

        assert_eq!(a.recv().await.unwrap(), PinSignal::HighlightThread { thread_id: id });
        assert_eq!(b.recv().await.unwrap(), PinSignal::HighlightThread { thread_id: id });
    }

    #[tokio::test]
    async fn test_late_listener_never_observes_emission() {
        let hub = SignalHub::default();
        hub.emit(PinSignal::ResetHighlights);

        let mut late = hub.subscribe();
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_exactly_one_listener_highlighted_after_settle() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let mut trackers: Vec<HighlightTracker> = ids
            .iter()
            .map(|id| HighlightTracker::new(*id, HighlightLane::Thread))
            .collect();

        let signal = PinSignal::HighlightThread { thread_id: ids[2] };
        for tracker in trackers.iter_mut() {
            tracker.observe(signal);
            tracker.settle();
        }

        let highlighted: Vec<bool> = trackers.iter().map(|t| t.is_highlighted()).collect();
        assert_eq!(highlighted, vec![false, false, true, false]);
    }

    #[test]
    fn test_pulse_clears_before_resetting() {
        let id = Uuid::new_v4();
        let mut tracker = HighlightTracker::new(id, HighlightLane::Pin);

        tracker.observe(PinSignal::HighlightPin { thread_id: id });
        // Cleared immediately so a repeated hover restarts the animation
        assert!(!tracker.is_highlighted());

        tracker.settle();
        assert!(tracker.is_highlighted());

        // Same pin hovered again: the pulse repeats
        tracker.observe(PinSignal::HighlightPin { thread_id: id });
        assert!(!tracker.is_highlighted());
        tracker.settle();
        assert!(tracker.is_highlighted());
    }

    #[test]
    fn test_reset_clears_everything() {
        let id = Uuid::new_v4();
        let mut tracker = HighlightTracker::new(id, HighlightLane::Thread);

        tracker.observe(PinSignal::HighlightThread { thread_id: id });
        tracker.settle();
        assert!(tracker.is_highlighted());

        tracker.observe(PinSignal::ResetHighlights);
        tracker.settle();
        assert!(!tracker.is_highlighted());
    }

    #[test]
    fn test_lanes_ignore_each_other() {
        let id = Uuid::new_v4();
        let mut pin_tracker = HighlightTracker::new(id, HighlightLane::Pin);

        pin_tracker.observe(PinSignal::HighlightThread { thread_id: id });
        pin_tracker.settle();
        assert!(!pin_tracker.is_highlighted());

        // Skip requests do not disturb highlight state
        pin_tracker.observe(PinSignal::HighlightPin { thread_id: id });
        pin_tracker.settle();
        assert!(pin_tracker.is_highlighted());
        pin_tracker.observe(PinSignal::SkipTo { percentage: 42.0 });
        assert!(pin_tracker.is_highlighted());
    }
}
