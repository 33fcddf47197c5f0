// crates/clapdeck-core/src/helpers/mod.rs

pub mod timecode;
