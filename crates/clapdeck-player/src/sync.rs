// crates/clapdeck-player/src/sync.rs
//
// The frame sync loop: while the resource is actively playing, the store is
// republished from the resource once per frame, at the best resolution the
// platform offers.
//
// The tick mode is probed once per connection: decode-frame-aligned callbacks
// when the resource supports them (sample-accurate), otherwise the generic
// per-display-frame callback. The host registers whichever callback
// `Player::tick_mode` names and drives Player::on_decoded_frame or
// Player::tick from it; this struct only decides whether a given tick is
// live. Start is idempotent, stop is synchronous, and a connection bump
// invalidates every tick scheduled against the previous resource.

use crate::resource::MediaResource;

/// Which frame callback drives publication for the current connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickMode {
    /// Decode-frame-aligned callback — preferred when available.
    DecodedFrames,
    /// Generic per-display-frame callback.
    DisplayFrames,
}

pub struct SyncLoop {
    running:    bool,
    mode:       Option<TickMode>,
    connection: u64,
}

impl SyncLoop {
    pub fn new() -> Self {
        Self { running: false, mode: None, connection: 0 }
    }

    /// Capability probe, run once per resource connection. Also cancels any
    /// loop left running against the previous resource.
    pub fn select_mode(&mut self, resource: &dyn MediaResource, connection: u64) {
        self.running = false;
        self.connection = connection;
        self.mode = Some(if resource.supports_frame_callbacks() {
            TickMode::DecodedFrames
        } else {
            TickMode::DisplayFrames
        });
    }

    /// Drop the mode entirely (resource disconnected).
    pub fn clear(&mut self) {
        self.running = false;
        self.mode = None;
    }

    pub fn mode(&self) -> Option<TickMode> {
        self.mode
    }

    /// Idempotent — a second start while already running is a no-op.
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Is a tick of `mode` from connection `connection` live? Stale ticks
    /// scheduled against a since-replaced resource answer false and become
    /// no-ops at the call site.
    pub fn accepts(&self, mode: TickMode, connection: u64) -> bool {
        self.running && self.connection == connection && self.mode == Some(mode)
    }
}

impl Default for SyncLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimResource;

    #[test]
    fn mode_follows_resource_capability() {
        let mut sync = SyncLoop::new();
        let sim = SimResource::new();

        sync.select_mode(&sim, 1);
        assert_eq!(sync.mode(), Some(TickMode::DisplayFrames));

        sim.set_frame_callbacks(true);
        sync.select_mode(&sim, 2);
        assert_eq!(sync.mode(), Some(TickMode::DecodedFrames));
    }

    #[test]
    fn start_is_idempotent_and_stop_cancels() {
        let mut sync = SyncLoop::new();
        let sim = SimResource::new();
        sync.select_mode(&sim, 1);

        sync.start();
        sync.start();
        assert!(sync.accepts(TickMode::DisplayFrames, 1));

        sync.stop();
        assert!(!sync.accepts(TickMode::DisplayFrames, 1));
    }

    #[test]
    fn stale_connection_ticks_are_rejected() {
        let mut sync = SyncLoop::new();
        let sim = SimResource::new();

        sync.select_mode(&sim, 1);
        sync.start();
        assert!(sync.accepts(TickMode::DisplayFrames, 1));

        // Reconnect: old ticks die, and the loop is not running until the
        // new resource actually plays.
        sync.select_mode(&sim, 2);
        assert!(!sync.accepts(TickMode::DisplayFrames, 1));
        assert!(!sync.accepts(TickMode::DisplayFrames, 2));

        sync.start();
        assert!(sync.accepts(TickMode::DisplayFrames, 2));
        assert!(!sync.accepts(TickMode::DecodedFrames, 2));
    }
}
