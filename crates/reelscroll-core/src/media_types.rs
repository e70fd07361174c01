// crates/reelscroll-core/src/media_types.rs
//
// Types that flow across the channel between reelscroll-media and reelscroll-ui.
// No egui, no ffmpeg — just plain data.

use std::path::PathBuf;
use uuid::Uuid;

/// Results sent from the MediaWorker probe threads to the UI.
pub enum MediaResult {
    /// Stream opened and metadata read — the item is playable.
    Metadata  { id: Uuid, duration: f64, width: u32, height: u32 },
    /// First frame, shown until playback frames arrive.
    Poster    { id: Uuid, width: u32, height: u32, data: Vec<u8> },
    AudioPath { id: Uuid, path: PathBuf },
    /// The item could not be opened or decoded.
    Error     { id: Uuid, msg: String },
}

/// A decoded frame from the playback pipeline.
pub struct PlaybackFrame {
    pub id:         Uuid,
    /// Seconds since playback of this item (re)started. Keeps increasing
    /// across loop restarts so the UI clock never has to wrap.
    pub present_at: f64,
    /// Position inside the source file; used as the resume point on pause.
    pub source_ts:  f64,
    pub width:      u32,
    pub height:     u32,
    pub data:       Vec<u8>, // RGBA
}
