// crates/reelscroll-media/src/helpers/seek.rs
//
// Seek wrappers with soft-fail behaviour. A failed seek leaves the demuxer
// wherever it was; callers that care about exact position drop pre-roll
// frames by PTS.

use ffmpeg_the_third as ffmpeg;

/// Seek `ictx` to the keyframe at or before `target_secs`.
///
/// Returns `true` on success or when `target_secs` is 0 (a fresh context is
/// already at the start, and `max_ts = 0` seeks fail with EPERM on Windows).
pub fn seek_to_secs(
    ictx: &mut ffmpeg::format::context::Input,
    target_secs: f64,
    label: &str,
) -> bool {
    if target_secs <= 0.0 {
        return true;
    }

    let seek_ts = (target_secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64;
    match ictx.seek(seek_ts, ..=seek_ts) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[seek] soft-fail in {label} at {target_secs:.3}s: {e}");
            false
        }
    }
}

/// Jump back to the first keyframe of a context that already hit EOF.
pub fn rewind(ictx: &mut ffmpeg::format::context::Input, label: &str) -> bool {
    match ictx.seek(0, ..) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("[seek] rewind failed in {label}: {e}");
            false
        }
    }
}
