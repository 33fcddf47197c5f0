// crates/clapdeck-player/src/helpers/mod.rs

pub mod log;
