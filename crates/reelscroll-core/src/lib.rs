// crates/reelscroll-core/src/lib.rs
//
// Feed data and playback policy shared by reelscroll-media and reelscroll-ui.
// No egui, no ffmpeg — everything here is plain data or pure logic.

pub mod commands;
pub mod helpers;
pub mod manifest;
pub mod media_types;
pub mod nav;
pub mod playback;
pub mod state;
