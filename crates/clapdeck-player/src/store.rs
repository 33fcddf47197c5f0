// crates/clapdeck-player/src/store.rs
//
// The clock state store: the single published truth about the attached
// resource. Everything the UI renders (duration, position, scrub flag,
// sub-range, playing-range flag) lives here, together with the ownership tag
// naming which writer last set the position.
//
// Writes apply fully, then listeners run synchronously — a listener always
// observes the post-write state, never a half-applied one. Listeners receive
// a shared borrow only, so they can read but never re-enter a write.

/// Which writer last set `position`. Exactly one tag is current at any
/// instant; the arbitration rule in arbiter.rs is built on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeSource {
    Media,
    Timeline,
}

/// The published clock state.
#[derive(Clone, Debug)]
pub struct ClockState {
    /// Known duration in seconds; 0 until metadata settles.
    pub duration: f64,
    /// Current position, clamped into [0, duration] when duration is known.
    pub position: f64,
    /// True while the user is dragging the timeline.
    pub scrubbing: bool,
    pub last_writer: TimeSource,
    /// Sub-range bounds. When both are set, sub_in <= sub_out holds
    /// regardless of the order the user entered them.
    pub sub_in: Option<f64>,
    pub sub_out: Option<f64>,
    /// True while a range-stop playback (single section or queue) is running.
    pub playing_range: bool,
}

impl ClockState {
    fn idle() -> Self {
        Self {
            duration:      0.0,
            position:      0.0,
            scrubbing:     false,
            last_writer:   TimeSource::Media,
            sub_in:        None,
            sub_out:       None,
            playing_range: false,
        }
    }
}

pub type Listener = Box<dyn Fn(&ClockState)>;

pub struct ClockStore {
    state:     ClockState,
    listeners: Vec<Listener>,
}

impl Default for ClockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockStore {
    pub fn new() -> Self {
        Self { state: ClockState::idle(), listeners: Vec::new() }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Register a listener invoked synchronously after every write.
    pub fn subscribe(&mut self, f: impl Fn(&ClockState) + 'static) {
        self.listeners.push(Box::new(f));
    }

    fn notify(&self) {
        for l in &self.listeners {
            l(&self.state);
        }
    }

    /// Clamp a time into the valid position range. With no known duration the
    /// upper bound is open — only negatives are clipped.
    pub(crate) fn clamp(&self, t: f64) -> f64 {
        if self.state.duration > 0.0 {
            t.clamp(0.0, self.state.duration)
        } else {
            t.max(0.0)
        }
    }

    // ── Connection lifecycle ─────────────────────────────────────────────────

    /// Reset for a freshly attached resource: duration unknown again, position
    /// taken from the resource, ownership back with the media.
    pub fn reset_for(&mut self, position: f64) {
        self.state.duration = 0.0;
        self.state.position = if position.is_finite() { position.max(0.0) } else { 0.0 };
        self.state.last_writer = TimeSource::Media;
        self.state.playing_range = false;
        self.notify();
    }

    /// Duration is only ever overwritten with a usable value — transient
    /// NaN/0 readings from the resource never clear a known duration.
    pub fn set_duration(&mut self, d: f64) {
        if d.is_finite() && d > 0.0 && d != self.state.duration {
            self.state.duration = d;
            self.notify();
        }
    }

    // ── Position writers ─────────────────────────────────────────────────────

    /// Media-origin position write. The caller (bridge or range stop) has
    /// already decided this publication should happen; no gating here.
    pub fn publish_media_position(&mut self, t: f64) {
        self.state.last_writer = TimeSource::Media;
        self.state.position = self.clamp(t);
        self.notify();
    }

    /// Timeline-origin position write. Publishes intent only — pushing the
    /// value into the resource is the arbitration rule's job.
    pub fn set_position_from_timeline(&mut self, t: f64) {
        self.state.last_writer = TimeSource::Timeline;
        self.state.position = self.clamp(t);
        self.notify();
    }

    /// Hand position ownership back to the media without moving the position.
    /// Called by the publish gate once the resource has converged on the
    /// timeline's target.
    pub fn hand_back_to_media(&mut self) {
        self.state.last_writer = TimeSource::Media;
    }

    // ── Scrub flag ───────────────────────────────────────────────────────────

    pub fn begin_scrub(&mut self) {
        self.state.scrubbing = true;
        self.notify();
    }

    pub fn end_scrub(&mut self) {
        self.state.scrubbing = false;
        self.notify();
    }

    // ── Sub-range bounds ─────────────────────────────────────────────────────
    // The user can type or drag either bound first; whenever both are present
    // they are normalized so sub_in <= sub_out.

    pub fn set_sub_in(&mut self, t: Option<f64>) {
        self.state.sub_in = t.map(|v| self.clamp(v));
        self.normalize_sub_range();
        self.notify();
    }

    pub fn set_sub_out(&mut self, t: Option<f64>) {
        self.state.sub_out = t.map(|v| self.clamp(v));
        self.normalize_sub_range();
        self.notify();
    }

    pub fn set_sub_range(&mut self, a: Option<f64>, b: Option<f64>) {
        self.state.sub_in = a.map(|v| self.clamp(v));
        self.state.sub_out = b.map(|v| self.clamp(v));
        self.normalize_sub_range();
        self.notify();
    }

    fn normalize_sub_range(&mut self) {
        if let (Some(a), Some(b)) = (self.state.sub_in, self.state.sub_out) {
            if a > b {
                self.state.sub_in = Some(b);
                self.state.sub_out = Some(a);
            }
        }
    }

    // ── Range-playback flag ──────────────────────────────────────────────────

    pub fn set_playing_range(&mut self, playing: bool) {
        if self.state.playing_range != playing {
            self.state.playing_range = playing;
            self.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn timeline_write_unclamped_above_while_duration_unknown() {
        let mut store = ClockStore::new();
        store.set_position_from_timeline(5.0);
        assert_eq!(store.state().position, 5.0);
        assert_eq!(store.state().last_writer, TimeSource::Timeline);
    }

    #[test]
    fn timeline_write_clamped_to_known_duration() {
        let mut store = ClockStore::new();
        store.set_duration(10.0);
        store.set_position_from_timeline(15.0);
        assert_eq!(store.state().position, 10.0);
        store.set_position_from_timeline(-2.0);
        assert_eq!(store.state().position, 0.0);
    }

    #[test]
    fn sub_range_normalizes_either_entry_order() {
        let mut store = ClockStore::new();
        store.set_duration(100.0);

        store.set_sub_in(Some(7.0));
        store.set_sub_out(Some(3.0));
        assert_eq!(store.state().sub_in, Some(3.0));
        assert_eq!(store.state().sub_out, Some(7.0));

        store.set_sub_range(Some(40.0), Some(12.0));
        assert_eq!(store.state().sub_in, Some(12.0));
        assert_eq!(store.state().sub_out, Some(40.0));
    }

    #[test]
    fn sub_bounds_clamp_and_clear() {
        let mut store = ClockStore::new();
        store.set_duration(10.0);
        store.set_sub_out(Some(25.0));
        assert_eq!(store.state().sub_out, Some(10.0));
        store.set_sub_out(None);
        assert_eq!(store.state().sub_out, None);
    }

    #[test]
    fn transient_duration_readings_never_clear_a_known_value() {
        let mut store = ClockStore::new();
        store.set_duration(30.0);
        store.set_duration(f64::NAN);
        store.set_duration(0.0);
        assert_eq!(store.state().duration, 30.0);
    }

    #[test]
    fn listeners_observe_fully_applied_writes() {
        let mut store = ClockStore::new();
        let seen = Rc::new(Cell::new((0.0, TimeSource::Media)));
        let seen_in = Rc::clone(&seen);
        store.subscribe(move |s| seen_in.set((s.position, s.last_writer)));

        store.set_position_from_timeline(4.0);
        assert_eq!(seen.get(), (4.0, TimeSource::Timeline));

        store.publish_media_position(6.0);
        assert_eq!(seen.get(), (6.0, TimeSource::Media));
    }

    #[test]
    fn reset_reclaims_media_ownership() {
        let mut store = ClockStore::new();
        store.set_duration(20.0);
        store.set_position_from_timeline(8.0);
        store.set_playing_range(true);

        store.reset_for(1.5);
        let s = store.state();
        assert_eq!(s.duration, 0.0);
        assert_eq!(s.position, 1.5);
        assert_eq!(s.last_writer, TimeSource::Media);
        assert!(!s.playing_range);
    }
}
