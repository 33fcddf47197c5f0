// crates/clapdeck-player/src/helpers/log.rs
//
// Unified logging for the player crate.
//
// Transient resource errors (seek-before-ready, rejected play) are expected
// states, not failures, so they never surface as errors; they still need to
// be visible when debugging a host integration. All log calls go to a temp
// file so they survive hosts with no console attached.
//
// File: $TMPDIR/clapdeck.log — append-only, created on first write per session.
//
// Usage:
//   use crate::helpers::log::plog;
//   plog("[bridge] duration fallback to seekable end");
//
// Or use the macro for format string convenience:
//   clapdeck_log!("[arbiter] seek not ready: {e}");

use std::io::Write;

/// Write `msg` to the clapdeck log file in the OS temp directory.
/// Never panics; a failed write is dropped.
pub fn plog(msg: &str) {
    if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(std::env::temp_dir().join("clapdeck.log"))
    {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = writeln!(f, "[{ts}] {msg}");
    }
}

/// Convenience macro — formats like `eprintln!` but routes through `plog`.
#[macro_export]
macro_rules! clapdeck_log {
    ($($arg:tt)*) => {
        $crate::helpers::log::plog(&format!($($arg)*))
    };
}
