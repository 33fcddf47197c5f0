// crates/clapdeck-player/src/arbiter.rs
//
// Clock-ownership arbitration. Two writers update the published position:
// the resource's own clock (advancing autonomously during playback) and the
// timeline (advancing from pointer input). Every write carries a TimeSource
// tag; these two functions are the only paths across the boundary, and the
// tolerance bands below are what keep them from ping-ponging:
//
//   timeline write ──► write_through ──► resource.set_position
//   resource event ──► publish_gate ──► store.publish_media_position
//
// A write-through would itself trigger resource events; the publish gate
// suppresses those until the resource has converged on the timeline's target,
// at which point ownership is handed back to the media.

use crate::resource::MediaResource;
use crate::store::{ClockStore, TimeSource};

/// Don't thrash the resource for discrepancies below this while idle.
pub const SEEK_TOLERANCE: f64 = 0.020;
/// During a drag the timeline must track exactly — every discrepancy seeks.
pub const SCRUB_SEEK_TOLERANCE: f64 = 0.0;
/// Once the resource is this close to a commanded target, ownership returns
/// to the media and its events publish normally again.
pub const HANDBACK_TOLERANCE: f64 = 0.030;
/// Noise floor for media-origin publications (~1 tick at 240 Hz). Position
/// deltas below this are redundant and skipped.
pub const PUBLISH_EPSILON: f64 = 1.0 / 240.0;

/// Timeline → resource write-through. Runs after every timeline-origin
/// position write; a no-op unless the timeline currently owns the clock.
///
/// Seek errors are swallowed: seeking before the resource is seek-ready is an
/// expected transient state, and the next timeline write retries anyway.
pub fn write_through(store: &ClockStore, resource: &mut dyn MediaResource) {
    let s = store.state();
    if s.last_writer != TimeSource::Timeline {
        return;
    }

    let tolerance = if s.scrubbing { SCRUB_SEEK_TOLERANCE } else { SEEK_TOLERANCE };
    let actual = finite_or_zero(resource.position());
    if (actual - s.position).abs() <= tolerance {
        return;
    }

    if let Err(e) = resource.set_position(s.position) {
        crate::clapdeck_log!("[arbiter] write-through seek deferred: {e}");
    }
}

/// Resource → store publication gate. Every media-origin position report
/// (event or frame tick) funnels through here.
///
/// Suppressed while scrubbing — the timeline is the UI's sole position owner
/// during a drag. Suppressed while the timeline owns the clock and the
/// resource is still catching up to the commanded seek; once within
/// HANDBACK_TOLERANCE the tag flips back to Media and publication resumes.
pub fn publish_from_media(store: &mut ClockStore, resource: &dyn MediaResource) {
    if store.state().scrubbing {
        return;
    }

    let actual = finite_or_zero(resource.position());

    if store.state().last_writer == TimeSource::Timeline {
        if (actual - store.state().position).abs() > HANDBACK_TOLERANCE {
            return; // still converging — don't fight the commanded seek
        }
        store.hand_back_to_media();
    }

    if (actual - store.state().position).abs() < PUBLISH_EPSILON {
        return;
    }
    store.publish_media_position(actual);
}

/// Positions read off a not-yet-ready resource may be NaN.
pub(crate) fn finite_or_zero(t: f64) -> f64 {
    if t.is_finite() { t } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimResource;
    use crate::store::ClockStore;

    fn fixture(duration: f64) -> (ClockStore, SimResource) {
        let mut store = ClockStore::new();
        store.set_duration(duration);
        let sim = SimResource::new();
        sim.load_metadata(duration);
        sim.take_events(); // connection bookkeeping isn't under test here
        (store, sim)
    }

    #[test]
    fn write_through_seeks_past_tolerance_only() {
        let (mut store, mut sim) = fixture(60.0);
        sim.force_position(10.0);

        // Within 20 ms: leave the resource alone.
        store.set_position_from_timeline(10.015);
        write_through(&store, &mut sim);
        assert_eq!(sim.pos(), 10.0);

        // Past it: seek.
        store.set_position_from_timeline(12.0);
        write_through(&store, &mut sim);
        assert_eq!(sim.pos(), 12.0);
    }

    #[test]
    fn scrubbing_tracks_exactly() {
        let (mut store, mut sim) = fixture(60.0);
        sim.force_position(10.0);
        store.begin_scrub();

        store.set_position_from_timeline(10.015);
        write_through(&store, &mut sim);
        assert_eq!(sim.pos(), 10.015);
    }

    #[test]
    fn write_through_is_inert_while_media_owns_the_clock() {
        let (mut store, mut sim) = fixture(60.0);
        sim.force_position(10.0);
        store.publish_media_position(3.0);
        write_through(&store, &mut sim);
        assert_eq!(sim.pos(), 10.0);
    }

    #[test]
    fn seek_not_ready_is_swallowed() {
        let (mut store, mut sim) = fixture(60.0);
        sim.set_seek_ready(false);
        store.set_position_from_timeline(5.0);
        write_through(&store, &mut sim); // must not panic or surface an error
        assert_eq!(store.state().position, 5.0);
    }

    #[test]
    fn publish_suppressed_while_scrubbing() {
        let (mut store, mut sim) = fixture(60.0);
        store.begin_scrub();
        store.set_position_from_timeline(4.0);
        sim.force_position(9.0);
        publish_from_media(&mut store, &sim);
        assert_eq!(store.state().position, 4.0);
        assert_eq!(store.state().last_writer, TimeSource::Timeline);
    }

    #[test]
    fn publish_waits_for_convergence_then_hands_back() {
        let (mut store, mut sim) = fixture(60.0);
        store.set_position_from_timeline(20.0);

        // Resource far from target: publication suppressed, tag unchanged.
        sim.force_position(5.0);
        publish_from_media(&mut store, &sim);
        assert_eq!(store.state().position, 20.0);
        assert_eq!(store.state().last_writer, TimeSource::Timeline);

        // Converged within 30 ms: ownership returns to the media.
        sim.force_position(20.02);
        publish_from_media(&mut store, &sim);
        assert_eq!(store.state().last_writer, TimeSource::Media);
        assert_eq!(store.state().position, 20.02);
    }

    #[test]
    fn noise_floor_skips_redundant_publications() {
        let (mut store, sim) = fixture(60.0);
        sim.force_position(8.0);
        publish_from_media(&mut store, &sim);
        assert_eq!(store.state().position, 8.0);

        sim.force_position(8.0 + PUBLISH_EPSILON / 2.0);
        publish_from_media(&mut store, &sim);
        assert_eq!(store.state().position, 8.0); // unchanged
    }

    #[test]
    fn no_oscillation_after_a_single_user_action() {
        // One timeline set, then a storm of media reports within the
        // tolerance band: the tag flips to Media exactly once and stays
        // there, and the write-through never re-seeks the resource.
        let (mut store, mut sim) = fixture(60.0);
        sim.force_position(15.0);

        store.set_position_from_timeline(15.01);
        write_through(&store, &mut sim);
        assert_eq!(sim.pos(), 15.0); // within 20 ms — left alone

        let mut flips = 0;
        let mut last = store.state().last_writer;
        for i in 0..20 {
            // tiny drift, all inside both tolerance bands
            sim.force_position(15.0 + (i % 2) as f64 * 0.002);
            write_through(&store, &mut sim);
            publish_from_media(&mut store, &sim);
            if store.state().last_writer != last {
                flips += 1;
                last = store.state().last_writer;
            }
        }
        assert_eq!(flips, 1, "ownership flipped {flips} times for one action");
        assert_eq!(store.state().last_writer, TimeSource::Media);
    }
}
