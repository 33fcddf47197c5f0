// crates/clapdeck-player/src/range_stop.rs
//
// The range-stop controller: stop playback frame-accurately at a target end
// position. One invocation walks Armed → Polling → Stopped:
//
//   Armed    target recorded, per-frame poll installed
//   Polling  each tick compares the resource position to the target
//   Stopped  position forced to exactly the target, published media-tagged,
//            resource paused, playing-range flag cleared
//
// The forced pause makes the resource emit a pause event of its own. To tell
// that apart from a user hitting pause, the controller sets a one-shot
// ignore-next-pause flag immediately before pausing; the flag is scoped to
// this instance (not ambient) and consumed by the very next pause event.
//
// At most one controller is active at a time — the player replaces the whole
// instance when arming a new range, which tears down the old poll with it.

use crate::arbiter::PUBLISH_EPSILON;
use crate::resource::MediaResource;
use crate::store::ClockStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Armed,
    Polling,
    Stopped,
}

#[derive(Debug)]
pub enum PollOutcome {
    /// Below the target — keep polling.
    Continue,
    /// Boundary reached: resource paused at the target. The pause event that
    /// follows is this controller's own.
    Finished,
}

pub struct RangeStop {
    target:            f64,
    phase:             Phase,
    ignore_next_pause: bool,
}

impl RangeStop {
    /// Arm for a target end position (already clamped by the caller).
    pub fn arm(target: f64) -> Self {
        Self { target, phase: Phase::Armed, ignore_next_pause: false }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    /// One per-frame poll tick. No-op once stopped.
    pub fn poll(
        &mut self,
        store: &mut ClockStore,
        resource: &mut dyn MediaResource,
    ) -> PollOutcome {
        match self.phase {
            Phase::Armed => self.phase = Phase::Polling,
            Phase::Polling => {}
            Phase::Stopped => return PollOutcome::Finished,
        }

        let pos = resource.position();
        if !pos.is_finite() || pos < self.target - PUBLISH_EPSILON {
            return PollOutcome::Continue;
        }

        // Boundary reached: land exactly on the target, then pause. The flag
        // goes up before the pause call so the resulting pause event cannot
        // race past it.
        self.ignore_next_pause = true;
        if let Err(e) = resource.set_position(self.target) {
            crate::clapdeck_log!("[range-stop] exact seek deferred: {e}");
        }
        store.publish_media_position(self.target);
        resource.pause();
        store.set_playing_range(false);
        self.phase = Phase::Stopped;
        PollOutcome::Finished
    }

    /// Classify a pause event. Returns true when the pause was this
    /// controller's own forced pause (flag consumed); false means the user
    /// paused and the caller should treat it as an interruption.
    pub fn consume_pause(&mut self) -> bool {
        std::mem::take(&mut self.ignore_next_pause)
    }
}
