// crates/clapdeck-player/src/resource.rs
//
// The seam to the platform's media element. The player never sees a concrete
// backend — it talks to one `MediaResource` at a time through this trait and
// receives the element's lifecycle notifications as `MediaEvent`s from the
// host's event pump.
//
// Readiness is allowed to lag: duration may be NaN/0 right after load, and
// seeks may fail until the element is seek-ready. Both are modeled here so
// the service layer can treat them as the transient states they are.

use thiserror::Error;

/// Errors a media resource may raise. All of them are transient from the
/// player's point of view: a failed seek is retried by the next write-through,
/// and a rejected play rolls state back to "not playing".
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("resource is not ready to seek")]
    NotSeekable,
    #[error("play request rejected: {0}")]
    PlayRejected(String),
}

/// Lifecycle/position notifications from the attached resource, in the order
/// the platform delivers them. The host forwards these to
/// `Player::handle_event` verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaEvent {
    LoadedMetadata,
    LoadedData,
    CanPlay,
    DurationChanged,
    Play,
    Pause,
    Ended,
    Seeking,
    Seeked,
    TimeUpdate,
}

/// One playable media element.
pub trait MediaResource {
    /// Current playback position in seconds. May be NaN before metadata.
    fn position(&self) -> f64;

    /// Seek. Fails with `NotSeekable` while the element is not seek-ready.
    fn set_position(&mut self, secs: f64) -> Result<(), MediaError>;

    /// Reported duration in seconds. NaN, infinite, or 0 until metadata —
    /// use `seekable_end` as the fallback until it settles.
    fn duration(&self) -> f64;

    /// End of the buffered/seekable range, if any.
    fn seekable_end(&self) -> Option<f64>;

    fn play(&mut self) -> Result<(), MediaError>;
    fn pause(&mut self);

    fn is_paused(&self) -> bool;
    fn has_ended(&self) -> bool;

    /// True once metadata (and therefore a usable position) is available.
    fn metadata_ready(&self) -> bool;

    /// True when the platform offers decode-frame-aligned callbacks for this
    /// element. Decides the tick mode for the whole connection.
    fn supports_frame_callbacks(&self) -> bool;
}
