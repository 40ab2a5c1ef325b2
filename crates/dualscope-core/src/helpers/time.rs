// crates/dualscope-core/src/helpers/time.rs
//
// Time formatting for the scrub bar label.

/// Format seconds as `M:SS.ss`, or `H:MM:SS.ss` past one hour.
///
/// Negative and non-finite inputs render as `0:00.00`.
///
/// ```
/// use dualscope_core::helpers::time::format_timecode;
/// assert_eq!(format_timecode(0.0),     "0:00.00");
/// assert_eq!(format_timecode(56.95),   "0:56.95");
/// assert_eq!(format_timecode(113.9),   "1:53.90");
/// assert_eq!(format_timecode(3723.5),  "1:02:03.50");
/// assert_eq!(format_timecode(-4.0),    "0:00.00");
/// ```
pub fn format_timecode(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    // Work in whole hundredths so 59.999 doesn't print as "0:60.00".
    let total_cs = (secs * 100.0).round() as u64;
    let cs = total_cs % 100;
    let s  = (total_cs / 100) % 60;
    let m  = (total_cs / 6000) % 60;
    let h  = total_cs / 360_000;
    if h > 0 {
        format!("{h}:{m:02}:{s:02}.{cs:02}")
    } else {
        format!("{m}:{s:02}.{cs:02}")
    }
}

/// `current / total` pair shown next to the scrub bar.
///
/// ```
/// use dualscope_core::helpers::time::format_position;
/// assert_eq!(format_position(5.0, Some(100.0)), "0:05.00 / 1:40.00");
/// assert_eq!(format_position(5.0, None),        "0:05.00 / --:--");
/// ```
pub fn format_position(current: f64, total: Option<f64>) -> String {
    match total {
        Some(d) => format!("{} / {}", format_timecode(current), format_timecode(d)),
        None    => format!("{} / --:--", format_timecode(current)),
    }
}
