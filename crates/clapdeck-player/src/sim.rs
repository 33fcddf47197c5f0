// crates/clapdeck-player/src/sim.rs
//
// SimResource: a scripted media element for tests and headless demos.
// No wall clock — the harness advances playback explicitly and drains the
// pending events into Player::handle_event, standing in for the platform's
// event pump. Readiness, play rejection, and frame-callback support are all
// scriptable so every transient-error path has a lever.
//
// The handle is a cheap Rc clone: hand one to the player (boxed) and keep
// one in the harness for scripting and inspection.

use std::cell::RefCell;
use std::rc::Rc;

use crate::resource::{MediaError, MediaEvent, MediaResource};

struct SimState {
    position:        f64,
    duration:        f64, // NaN until metadata
    seekable_end:    Option<f64>,
    paused:          bool,
    ended:           bool,
    metadata_ready:  bool,
    seek_ready:      bool,
    reject_play:     bool,
    frame_callbacks: bool,
    events:          Vec<MediaEvent>,
}

#[derive(Clone)]
pub struct SimResource {
    inner: Rc<RefCell<SimState>>,
}

impl SimResource {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SimState {
                position:        0.0,
                duration:        f64::NAN,
                seekable_end:    None,
                paused:          true,
                ended:           false,
                metadata_ready:  false,
                seek_ready:      true,
                reject_play:     false,
                frame_callbacks: false,
                events:          Vec::new(),
            })),
        }
    }

    // ── Scripting levers ─────────────────────────────────────────────────────

    /// Metadata arrives: duration becomes known and the element is seekable
    /// to its end.
    pub fn load_metadata(&self, duration: f64) {
        let mut s = self.inner.borrow_mut();
        s.duration = duration;
        s.seekable_end = Some(duration);
        s.metadata_ready = true;
        s.events.push(MediaEvent::LoadedMetadata);
        s.events.push(MediaEvent::DurationChanged);
    }

    /// Model the just-after-load window: position/seekable known but the
    /// reported duration still unusable.
    pub fn load_with_unsettled_duration(&self, seekable_end: f64) {
        let mut s = self.inner.borrow_mut();
        s.duration = f64::NAN;
        s.seekable_end = Some(seekable_end);
        s.metadata_ready = true;
        s.events.push(MediaEvent::LoadedMetadata);
    }

    /// Late metadata settles the real duration without a reload.
    pub fn settle_duration(&self, duration: f64) {
        let mut s = self.inner.borrow_mut();
        s.duration = duration;
        s.seekable_end = Some(duration);
        s.events.push(MediaEvent::DurationChanged);
    }

    pub fn set_seek_ready(&self, ready: bool) {
        self.inner.borrow_mut().seek_ready = ready;
    }

    pub fn set_reject_play(&self, reject: bool) {
        self.inner.borrow_mut().reject_play = reject;
    }

    pub fn set_frame_callbacks(&self, supported: bool) {
        self.inner.borrow_mut().frame_callbacks = supported;
    }

    /// Move the playhead without any event, as the element's own clock does
    /// between frames.
    pub fn force_position(&self, t: f64) {
        self.inner.borrow_mut().position = t;
    }

    /// Advance playback by `dt` seconds of media time. No-op while paused or
    /// ended; emits Ended (and pauses) on reaching the end.
    pub fn advance(&self, dt: f64) {
        let mut s = self.inner.borrow_mut();
        if s.paused || s.ended {
            return;
        }
        s.position += dt;
        if s.duration.is_finite() && s.position >= s.duration {
            s.position = s.duration;
            s.ended = true;
            s.paused = true;
            // Platform ordering: pause fires first, then ended.
            s.events.push(MediaEvent::Pause);
            s.events.push(MediaEvent::Ended);
        }
    }

    /// The user presses play/pause on the element's own controls.
    pub fn user_play(&self) {
        let mut s = self.inner.borrow_mut();
        s.paused = false;
        s.ended = false;
        s.events.push(MediaEvent::Play);
    }

    pub fn user_pause(&self) {
        let mut s = self.inner.borrow_mut();
        if !s.paused {
            s.paused = true;
            s.events.push(MediaEvent::Pause);
        }
    }

    // ── Harness side ─────────────────────────────────────────────────────────

    /// Drain pending events, oldest first. The harness forwards them to
    /// Player::handle_event — the stand-in for the platform event pump.
    pub fn take_events(&self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.inner.borrow_mut().events)
    }

    pub fn pos(&self) -> f64 {
        self.inner.borrow().position
    }

    pub fn paused_now(&self) -> bool {
        self.inner.borrow().paused
    }

    pub fn ended_now(&self) -> bool {
        self.inner.borrow().ended
    }
}

impl Default for SimResource {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaResource for SimResource {
    fn position(&self) -> f64 {
        let s = self.inner.borrow();
        if s.metadata_ready { s.position } else { f64::NAN }
    }

    fn set_position(&mut self, secs: f64) -> Result<(), MediaError> {
        let mut s = self.inner.borrow_mut();
        if !s.seek_ready {
            return Err(MediaError::NotSeekable);
        }
        s.position = if s.duration.is_finite() {
            secs.clamp(0.0, s.duration)
        } else {
            secs.max(0.0)
        };
        if s.ended && s.position < s.duration {
            s.ended = false;
        }
        s.events.push(MediaEvent::Seeking);
        s.events.push(MediaEvent::Seeked);
        Ok(())
    }

    fn duration(&self) -> f64 {
        self.inner.borrow().duration
    }

    fn seekable_end(&self) -> Option<f64> {
        self.inner.borrow().seekable_end
    }

    fn play(&mut self) -> Result<(), MediaError> {
        let mut s = self.inner.borrow_mut();
        if s.reject_play {
            return Err(MediaError::PlayRejected("autoplay policy".into()));
        }
        s.paused = false;
        s.ended = false;
        s.events.push(MediaEvent::Play);
        Ok(())
    }

    fn pause(&mut self) {
        let mut s = self.inner.borrow_mut();
        if !s.paused {
            s.paused = true;
            s.events.push(MediaEvent::Pause);
        }
    }

    fn is_paused(&self) -> bool {
        self.inner.borrow().paused
    }

    fn has_ended(&self) -> bool {
        self.inner.borrow().ended
    }

    fn metadata_ready(&self) -> bool {
        self.inner.borrow().metadata_ready
    }

    fn supports_frame_callbacks(&self) -> bool {
        self.inner.borrow().frame_callbacks
    }
}
