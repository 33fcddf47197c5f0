// crates/clapdeck-core/src/helpers/timecode.rs
//
// Textual timecode ↔ seconds. No state, no allocation on the parse path
// beyond the split itself.
//
// Timecodes are the persisted form of sub-section bounds; seconds are always
// derived on demand. A string that doesn't parse means "unset", never an
// error — callers get `None` and treat the bound as absent.

/// Parse a textual timecode into seconds.
///
/// Accepted forms:
///   - plain seconds: `"12"`, `"12.5"`
///   - `mm:ss[.frac]`
///   - `hh:mm:ss[.frac]`
///
/// A trailing `s` on the plain-seconds form is tolerated so that
/// [`format_timecode`] output round-trips.
///
/// Empty input, a non-numeric segment, or a wrong segment count all yield
/// `None`.
///
/// ```
/// use clapdeck_core::helpers::timecode::parse_timecode;
/// assert_eq!(parse_timecode("5"),         Some(5.0));
/// assert_eq!(parse_timecode("5.25"),      Some(5.25));
/// assert_eq!(parse_timecode("1:05"),      Some(65.0));
/// assert_eq!(parse_timecode("0:01:05.5"), Some(65.5));
/// assert_eq!(parse_timecode(""),          None);
/// assert_eq!(parse_timecode("abc"),       None);
/// assert_eq!(parse_timecode("1:2:3:4"),   None);
/// ```
pub fn parse_timecode(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Plain seconds, with or without the display suffix ("12.50s").
    if !s.contains(':') {
        let bare = s.strip_suffix('s').map(str::trim_end).unwrap_or(s);
        return parse_segment(bare);
    }

    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [mm, ss] => Some(parse_segment(mm)? * 60.0 + parse_segment(ss)?),
        [hh, mm, ss] => Some(
            parse_segment(hh)? * 3600.0 + parse_segment(mm)? * 60.0 + parse_segment(ss)?,
        ),
        _ => None,
    }
}

/// One numeric segment: digits with an optional `.digits` fraction.
/// Signs, exponents, and bare fractions (`".5"`, `"5."`) are rejected so a
/// segment can never parse to something negative or non-finite.
fn parse_segment(s: &str) -> Option<f64> {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(f) = frac {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    s.parse::<f64>().ok()
}

/// Format seconds for display: `m:ss.ff` when minutes are present, else
/// `ss.ffs`. Negative input is treated as zero.
///
/// ```
/// use clapdeck_core::helpers::timecode::format_timecode;
/// assert_eq!(format_timecode(0.0),    "00.00s");
/// assert_eq!(format_timecode(3.25),   "03.25s");
/// assert_eq!(format_timecode(65.5),   "1:05.50");
/// assert_eq!(format_timecode(754.2),  "12:34.20");
/// ```
pub fn format_timecode(t: f64) -> String {
    let total = t.max(0.0);
    let mm = (total / 60.0).floor() as u64;
    let ss = total - mm as f64 * 60.0;
    if mm > 0 {
        format!("{mm}:{ss:05.2}")
    } else {
        format!("{ss:05.2}s")
    }
}

/// Display form for an optional bound: `--` when unset or non-finite.
/// This is what timecode readouts show next to an empty in/out field.
pub fn format_opt_timecode(t: Option<f64>) -> String {
    match t {
        Some(v) if v.is_finite() => format_timecode(v),
        _ => "--".to_string(),
    }
}
