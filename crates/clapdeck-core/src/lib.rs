// crates/clapdeck-core/src/lib.rs
// Pure data — no media handles, no scheduler state, no player runtime.
// Serializable via serde. Used by clapdeck-player and any UI consumer.

pub mod helpers;
pub mod sources;

// Re-export the main public API so player/UI imports are simple.
pub use sources::{SourceCatalog, VideoSource, VideoSubSection};
