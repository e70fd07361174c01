// crates/reelscroll-ui/src/helpers/log.rs
//
// Unified logging for the UI crate.
//
// Release builds use `windows_subsystem = "windows"`, so a double-clicked
// launch has no console and `eprintln!` output vanishes. Log lines go to an
// append-only file in the OS temp dir instead: %TEMP%\reelscroll.log.
//
//   feed_log!("[loader] {n} videos from {source}");

use std::io::Write;

const LOG_FILE: &str = "reelscroll.log";

/// Append `msg` to the log file. Never panics; a failed write is dropped.
pub fn vlog(msg: &str) {
    if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(std::env::temp_dir().join(LOG_FILE))
    {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let _ = writeln!(f, "[{ts}] {msg}");
    }
    #[cfg(debug_assertions)]
    eprintln!("{msg}");
}

/// Formats like `eprintln!` but routes through `vlog`.
#[macro_export]
macro_rules! feed_log {
    ($($arg:tt)*) => {
        $crate::helpers::log::vlog(&format!($($arg)*))
    };
}
