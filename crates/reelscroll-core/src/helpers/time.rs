// crates/reelscroll-core/src/helpers/time.rs
//
// Human-readable durations for the card overlay.

/// Format a duration in seconds as a compact label.
///
/// | Range    | Format    | Example   |
/// |----------|-----------|-----------|
/// | ≥ 3600 s | `H:MM:SS` | `1:04:35` |
/// | < 3600 s | `M:SS`    | `0:07`    |
///
/// ```
/// use reelscroll_core::helpers::time::format_duration;
/// assert_eq!(format_duration(7.9),    "0:07");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    if total >= 3600 {
        format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
    } else {
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// `position / duration` as a progress fraction in `[0, 1]`.
pub fn progress(position: f64, duration: f64) -> f32 {
    if duration > 0.0 {
        ((position % duration) / duration).clamp(0.0, 1.0) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_durations_clamp_to_zero() {
        assert_eq!(format_duration(-4.0), "0:00");
    }

    #[test]
    fn progress_wraps_on_loop() {
        assert!((progress(12.5, 10.0) - 0.25).abs() < 1e-6);
        assert_eq!(progress(3.0, 0.0), 0.0);
    }
}
