// crates/clapdeck-player/src/lib.rs
//
// The synchronization/service layer between one media resource and the
// timeline UI: clock-ownership arbitration, the frame sync driver, the
// range-stop controller, and the sub-section playback queue.
//
// Single-threaded and event-driven throughout. The host delivers resource
// events through Player::handle_event and drives Player::tick /
// Player::on_decoded_frame from its frame callbacks; nothing here spawns a
// thread or blocks.

pub mod arbiter;
pub mod helpers;
pub mod player;
pub mod queue;
pub mod range_stop;
pub mod resource;
pub mod sim;
pub mod store;
pub mod sync;

// Re-export the main public API so UI imports are simple.
pub use player::{Player, ResourceToken};
pub use resource::{MediaError, MediaEvent, MediaResource};
pub use store::{ClockState, TimeSource};
pub use sync::TickMode;
