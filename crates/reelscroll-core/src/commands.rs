// crates/reelscroll-core/src/commands.rs
//
// Every user action and visibility signal is expressed as a FeedCommand.
// Modules emit these; app.rs processes them after the UI pass.

use crate::manifest::ManifestSource;
use crate::playback::IntersectionEntry;

#[derive(Debug, Clone)]
pub enum FeedCommand {
    // ── Manifest ─────────────────────────────────────────────────────────────
    /// Fetch the current manifest source again and rebuild the feed.
    ReloadManifest,
    /// Switch to a different manifest and rebuild the feed.
    OpenManifest(ManifestSource),

    // ── Visibility signals ───────────────────────────────────────────────────
    /// Items that crossed the visibility threshold this frame.
    Intersections(Vec<IntersectionEntry>),
    /// The feed scroll offset changed.
    Scrolled { offset: f32, viewport_height: f32 },

    // ── Playback ─────────────────────────────────────────────────────────────
    /// Pause / resume the item currently chosen to play.
    TogglePause,
    SetVolume(f32),
    ToggleMute,

    // ── Navigation ───────────────────────────────────────────────────────────
    SelectTab(usize),
    DismissNotice,
}
