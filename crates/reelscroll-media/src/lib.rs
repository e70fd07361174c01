// crates/reelscroll-media/src/lib.rs
//
// No egui dependency — communicates with reelscroll-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `mod mymodule;` below
//   3. Call it from worker.rs (probe or a new MediaWorker method)

pub mod audio;
pub mod decode;
pub mod probe;
pub mod worker;

mod helpers;

// Re-export the main public API so reelscroll-ui imports are simple.
pub use worker::MediaWorker;
pub use reelscroll_core::media_types::{MediaResult, PlaybackFrame};

/// Widest frame the playback pipeline produces. Cards are at most a window
/// wide, so decoding above this only costs memory bandwidth.
pub const PLAYBACK_MAX_W: u32 = 720;

/// Widest poster frame produced by the probe.
pub const POSTER_MAX_W: u32 = 480;
