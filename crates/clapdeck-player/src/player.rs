// crates/clapdeck-player/src/player.rs
//
// Player owns the whole service layer: the clock store, the sync loop, the
// active range-stop controller, the playback queue, and the one attached
// media resource. The UI talks to this and nothing else.
//
// Host contract:
//   - forward every resource event to handle_event()
//   - drive tick() from the generic per-frame callback, and
//     on_decoded_frame() from the decode-aligned one when tick_mode() asks
//     for it — passing the ResourceToken returned by connect_resource()
//
// The token is how stale callbacks die: reconnecting bumps the connection
// counter, so a callback scheduled against the previous resource no-ops
// instead of touching state it no longer owns.

use clapdeck_core::{SourceCatalog, VideoSource, VideoSubSection};

use crate::arbiter;
use crate::queue::SectionQueue;
use crate::range_stop::RangeStop;
use crate::resource::{MediaEvent, MediaResource};
use crate::store::{ClockState, ClockStore};
use crate::sync::{SyncLoop, TickMode};

/// Identifies one resource connection. Returned by connect_resource and
/// required by the frame entry points; a token from a previous connection
/// makes them no-ops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceToken(u64);

pub struct Player {
    store:      ClockStore,
    sync:       SyncLoop,
    resource:   Option<Box<dyn MediaResource>>,
    range_stop: Option<RangeStop>,
    queue:      Option<SectionQueue>,

    sources:  Vec<VideoSource>,
    selected: Option<usize>,

    connection: u64,
    /// Duration is often still unsettled right after connect; re-probe once
    /// on the next frame to catch late metadata.
    reprobe_duration: bool,
}

impl Player {
    pub fn new() -> Self {
        Self {
            store:            ClockStore::new(),
            sync:             SyncLoop::new(),
            resource:         None,
            range_stop:       None,
            queue:            None,
            sources:          Vec::new(),
            selected:         None,
            connection:       0,
            reprobe_duration: false,
        }
    }

    pub fn with_catalog(catalog: SourceCatalog) -> Self {
        let mut p = Self::new();
        p.set_sources(catalog.sources);
        p
    }

    // ── Published state ──────────────────────────────────────────────────────

    pub fn state(&self) -> &ClockState {
        self.store.state()
    }

    /// Register a listener invoked synchronously after every store write.
    pub fn subscribe(&mut self, f: impl Fn(&ClockState) + 'static) {
        self.store.subscribe(f);
    }

    pub fn sources(&self) -> &[VideoSource] {
        &self.sources
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_source(&self) -> Option<&VideoSource> {
        self.selected.and_then(|i| self.sources.get(i))
    }

    /// True while a queue run is in flight.
    pub fn queue_active(&self) -> bool {
        self.queue.is_some()
    }

    pub fn queue_cursor(&self) -> Option<usize> {
        self.queue.as_ref().map(|q| q.cursor())
    }

    /// The armed range-stop target, if any.
    pub fn range_target(&self) -> Option<f64> {
        self.range_stop.as_ref().map(|rs| rs.target())
    }

    // ── Catalog ──────────────────────────────────────────────────────────────

    pub fn set_sources(&mut self, sources: Vec<VideoSource>) {
        self.sources = sources;
        self.selected = if self.sources.is_empty() { None } else { Some(0) };
    }

    /// Switch the selected source. Sub-range, queue, and range wiring do not
    /// survive a source switch; the host is expected to follow up with
    /// connect_resource for the new url.
    pub fn select_source(&mut self, idx: usize) {
        if idx >= self.sources.len() || self.selected == Some(idx) {
            return;
        }
        self.selected = Some(idx);
        self.stop_sections();
        self.store.set_sub_range(None, None);
    }

    // ── Resource connection ──────────────────────────────────────────────────

    /// Attach a media resource, tearing down the previous bridge first — at
    /// most one bridge is ever live. Idempotent in the sense that connecting
    /// is always safe, whatever was attached before.
    pub fn connect_resource(&mut self, resource: Box<dyn MediaResource>) -> ResourceToken {
        self.sync.clear();
        self.range_stop = None;
        self.queue = None;
        self.connection += 1;

        let pos = arbiter::finite_or_zero(resource.position());
        self.resource = Some(resource);
        self.store.reset_for(pos);

        if let Some(res) = self.resource.as_deref() {
            self.sync.select_mode(res, self.connection);
        }
        self.update_duration();

        // Metadata may already be present (cached loads take this path).
        if self.resource.as_deref().is_some_and(|r| r.metadata_ready()) {
            self.on_loaded_metadata();
        }
        self.reprobe_duration = true;

        ResourceToken(self.connection)
    }

    pub fn disconnect(&mut self) {
        self.sync.clear();
        self.range_stop = None;
        self.queue = None;
        self.store.set_playing_range(false);
        self.resource = None;
        self.connection += 1;
    }

    /// Which frame callback the host should drive for this connection.
    pub fn tick_mode(&self) -> Option<TickMode> {
        self.sync.mode()
    }

    // ── Event bridge ─────────────────────────────────────────────────────────

    /// Entry point for every notification from the attached resource.
    pub fn handle_event(&mut self, ev: MediaEvent) {
        match ev {
            MediaEvent::LoadedMetadata => self.on_loaded_metadata(),
            MediaEvent::LoadedData | MediaEvent::CanPlay | MediaEvent::DurationChanged => {
                self.update_duration();
            }
            MediaEvent::Play => self.sync.start(),
            MediaEvent::Pause => self.on_pause(),
            MediaEvent::Ended => self.sync.stop(),
            // These fire while the user drags the element's own controls —
            // publish immediately so the timeline tracks the drag.
            MediaEvent::Seeking | MediaEvent::Seeked => {
                self.update_duration();
                self.publish_from_media();
            }
            MediaEvent::TimeUpdate => self.publish_from_media(),
        }
    }

    fn on_loaded_metadata(&mut self) {
        self.update_duration();
        // Publish the landing position immediately, bypassing the noise floor.
        if let Some(res) = self.resource.as_deref() {
            let pos = arbiter::finite_or_zero(res.position());
            self.store.publish_media_position(pos);
        }
        if self.resource.as_deref().is_some_and(|r| !r.is_paused() && !r.has_ended()) {
            self.sync.start();
        }
    }

    fn on_pause(&mut self) {
        self.sync.stop();

        let Some(rs) = self.range_stop.as_mut() else { return };
        if rs.consume_pause() {
            // Our own forced pause — the range stop completed. Chain to the
            // next queued section, if any.
            self.range_stop = None;
            let next = self.queue.as_mut().and_then(|q| q.advance().cloned());
            match next {
                Some(sec) => self.start_section(&sec),
                None => self.queue = None,
            }
        } else {
            // User interruption: cancel everything in flight.
            self.range_stop = None;
            self.queue = None;
            self.store.set_playing_range(false);
        }
    }

    /// Duration resolution with the seekable-end fallback: the reported
    /// duration is routinely NaN/0 right after load.
    fn update_duration(&mut self) {
        let Some(res) = self.resource.as_deref() else { return };
        let mut d = res.duration();
        if !d.is_finite() || d <= 0.0 {
            if let Some(end) = res.seekable_end() {
                d = end;
            }
        }
        self.store.set_duration(d); // the store ignores unusable values
    }

    fn publish_from_media(&mut self) {
        if let Some(res) = self.resource.as_deref() {
            arbiter::publish_from_media(&mut self.store, res);
        }
    }

    // ── Frame entry points ───────────────────────────────────────────────────

    /// Generic per-display-frame tick.
    pub fn tick(&mut self, token: ResourceToken) {
        if token.0 != self.connection {
            return; // stale callback from a replaced resource
        }
        if self.reprobe_duration {
            self.reprobe_duration = false;
            self.update_duration();
        }
        self.frame_step(TickMode::DisplayFrames, token);
    }

    /// Decode-frame-aligned tick, for hosts whose resource supports it.
    pub fn on_decoded_frame(&mut self, token: ResourceToken) {
        if token.0 != self.connection {
            return;
        }
        self.frame_step(TickMode::DecodedFrames, token);
    }

    fn frame_step(&mut self, mode: TickMode, token: ResourceToken) {
        if self.sync.accepts(mode, token.0) {
            self.publish_from_media();
        }
        // The range-stop poll rides the same callback mechanism the sync
        // loop selected for this connection.
        if self.sync.mode() == Some(mode) {
            self.poll_range_stop();
        }
    }

    fn poll_range_stop(&mut self) {
        if let (Some(rs), Some(res)) = (self.range_stop.as_mut(), self.resource.as_deref_mut()) {
            if !rs.is_stopped() {
                // A Finished poll pauses the resource; the queue advances
                // when that pause event comes back through handle_event.
                rs.poll(&mut self.store, res);
            }
        }
    }

    // ── Timeline controls ────────────────────────────────────────────────────

    pub fn begin_scrub(&mut self) {
        self.store.begin_scrub();
    }

    pub fn end_scrub(&mut self) {
        self.store.end_scrub();
    }

    /// Timeline-origin position write: publish intent, then let the
    /// arbitration rule decide whether the resource needs the seek.
    pub fn set_position_from_timeline(&mut self, t: f64) {
        self.store.set_position_from_timeline(t);
        if let Some(res) = self.resource.as_deref_mut() {
            arbiter::write_through(&self.store, res);
        }
    }

    pub fn set_sub_in(&mut self, t: Option<f64>) {
        self.store.set_sub_in(t);
    }

    pub fn set_sub_out(&mut self, t: Option<f64>) {
        self.store.set_sub_out(t);
    }

    pub fn set_sub_range(&mut self, a: Option<f64>, b: Option<f64>) {
        self.store.set_sub_range(a, b);
    }

    // ── Sub-section editing (selected source, by index) ──────────────────────

    pub fn add_section(&mut self, name: &str) -> Option<usize> {
        self.selected_source_mut().map(|s| s.add_section(name))
    }

    pub fn set_section_name(&mut self, idx: usize, name: &str) {
        if let Some(s) = self.selected_source_mut() {
            s.set_section_name(idx, name);
        }
    }

    pub fn set_section_tcin(&mut self, idx: usize, text: &str) {
        if let Some(s) = self.selected_source_mut() {
            s.set_section_tcin(idx, text);
        }
    }

    pub fn set_section_tcout(&mut self, idx: usize, text: &str) {
        if let Some(s) = self.selected_source_mut() {
            s.set_section_tcout(idx, text);
        }
    }

    pub fn remove_section(&mut self, idx: usize) {
        if let Some(s) = self.selected_source_mut() {
            s.remove_section(idx);
        }
    }

    fn selected_source_mut(&mut self) -> Option<&mut VideoSource> {
        self.selected.and_then(|i| self.sources.get_mut(i))
    }

    // ── Section playback ─────────────────────────────────────────────────────

    /// Play one sub-section of the selected source. Clears any running queue.
    pub fn play_section(&mut self, idx: usize) {
        let sec = self
            .selected_source()
            .and_then(|s| s.sub_sections.get(idx))
            .cloned();
        let Some(sec) = sec else { return };
        self.queue = None;
        self.start_section(&sec);
    }

    /// Play every valid sub-section of the selected source, in order.
    pub fn play_all_sections(&mut self) {
        let Some(src) = self.selected_source() else { return };
        self.queue = SectionQueue::from_sections(&src.sub_sections);
        let first = self.queue.as_ref().and_then(|q| q.current().cloned());
        if let Some(sec) = first {
            self.start_section(&sec);
        }
    }

    /// Explicitly stop any section/queue playback and clear its wiring.
    pub fn stop_sections(&mut self) {
        self.range_stop = None;
        self.queue = None;
        self.store.set_playing_range(false);
    }

    fn start_section(&mut self, sec: &VideoSubSection) {
        let Some((tcin, tcout)) = sec.bounds() else {
            // Invalid sections can't survive the queue filter, but skipping
            // here keeps a mid-queue surprise from killing the whole run.
            let next = self.queue.as_mut().and_then(|q| q.advance().cloned());
            match next {
                Some(n) => self.start_section(&n),
                None => self.queue = None,
            }
            return;
        };

        let start = self.store.clamp(tcin);
        let target = self.store.clamp(tcout);

        // Arming replaces — and thereby tears down — any prior controller.
        self.range_stop = Some(RangeStop::arm(target));
        self.store.set_playing_range(true);

        let Some(res) = self.resource.as_deref_mut() else {
            self.stop_sections();
            return;
        };
        if let Err(e) = res.set_position(start) {
            crate::clapdeck_log!("[player] section seek deferred: {e}");
        }
        self.store.publish_media_position(start);

        let play = self.resource.as_deref_mut().map(|r| r.play());
        if let Some(Err(e)) = play {
            crate::clapdeck_log!("[player] play rejected: {e}");
            self.stop_sections();
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}
