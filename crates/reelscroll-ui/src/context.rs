// crates/reelscroll-ui/src/context.rs
//
// AppContext owns the runtime handles that are not part of FeedState.
// ReelScrollApp holds one of these plus a FeedState and its modules.
//
//   AppContext
//     ├── media_worker        — probe threads + playback decode thread
//     ├── manifest_rx         — in-flight manifest load, if any
//     ├── cache: CacheContext — poster and live-frame textures
//     ├── playback            — controller + active decode tracking
//     ├── audio_stream        — rodio OutputStream (must outlive all sinks)
//     └── audio_sinks         — per-item Sink map (audio_module only)

use std::collections::HashMap;
use std::time::Instant;

use crossbeam_channel::Receiver;
use eframe::egui;
use rodio::{OutputStream, Sink};
use uuid::Uuid;

use reelscroll_core::media_types::PlaybackFrame;
use reelscroll_core::playback::PlaybackController;
use reelscroll_core::state::FeedState;
use reelscroll_media::{MediaResult, MediaWorker};

use crate::feed_log;
use crate::loader::ManifestLoad;

// ── CacheContext ──────────────────────────────────────────────────────────────

pub struct CacheContext {
    /// First decoded frame of each item, shown while it is not playing.
    pub poster_cache: HashMap<Uuid, egui::TextureHandle>,

    /// Latest playback frame per item. Kept after pause so the card keeps
    /// showing where the video stopped.
    pub frame_cache: HashMap<Uuid, egui::TextureHandle>,

    /// Next playback frame, held until its presentation time is due.
    pub pending_pb_frame: Option<PlaybackFrame>,
}

impl CacheContext {
    fn new() -> Self {
        Self {
            poster_cache:     HashMap::new(),
            frame_cache:      HashMap::new(),
            pending_pb_frame: None,
        }
    }

    /// Texture to draw for `id`: live frame first, then poster.
    pub fn texture_for(&self, id: Uuid) -> Option<&egui::TextureHandle> {
        self.frame_cache.get(&id).or_else(|| self.poster_cache.get(&id))
    }

    /// Drop every texture. Called when the feed is rebuilt.
    pub fn clear_all(&mut self) {
        self.poster_cache.clear();
        self.frame_cache.clear();
        self.pending_pb_frame = None;
    }
}

// ── PlaybackContext ───────────────────────────────────────────────────────────

pub struct PlaybackContext {
    /// Decides which item plays; sized to the current feed.
    pub controller: PlaybackController,

    /// Item the decode thread is working on. `None` while everything is paused.
    pub active: Option<Uuid>,

    /// Wall-clock origin of the active item's presentation clock. Set when
    /// its first frame arrives so decoder start-up latency is not counted.
    pub started_at: Option<Instant>,

    /// Source position of the last frame shown for the active item.
    pub last_source_ts: Option<f64>,
}

impl PlaybackContext {
    fn new() -> Self {
        Self {
            controller:     PlaybackController::new(0),
            active:         None,
            started_at:     None,
            last_source_ts: None,
        }
    }

    /// Seconds on the active item's presentation clock.
    pub fn clock(&self) -> Option<f64> {
        self.started_at.map(|t| t.elapsed().as_secs_f64())
    }

    /// Start over for a feed of `len` items.
    pub fn reset(&mut self, len: usize) {
        self.controller     = PlaybackController::new(len);
        self.active         = None;
        self.started_at     = None;
        self.last_source_ts = None;
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub media_worker: MediaWorker,

    /// Receiver for the manifest load started by the last (re)load.
    /// Replaced on every reload, so a superseded load is simply never read.
    pub manifest_rx: Option<Receiver<ManifestLoad>>,

    pub cache: CacheContext,

    pub playback: PlaybackContext,

    // ── Audio (rodio 0.21) ───────────────────────────────────────────────────
    // Created lazily by audio_module on its first tick. Dropping the stream
    // silences every sink.
    pub audio_stream: Option<OutputStream>,
    pub audio_sinks:  HashMap<Uuid, Sink>,
}

impl AppContext {
    pub fn new(media_worker: MediaWorker) -> Self {
        Self {
            media_worker,
            manifest_rx:  None,
            cache:        CacheContext::new(),
            playback:     PlaybackContext::new(),
            audio_stream: None,
            audio_sinks:  HashMap::new(),
        }
    }

    /// Drain the MediaWorker result channel into FeedState and the texture
    /// caches. Results for items that no longer exist (a reload raced the
    /// probe) are ignored by the id lookups.
    pub fn ingest_media_results(&mut self, state: &mut FeedState, ctx: &egui::Context) {
        while let Ok(result) = self.media_worker.rx.try_recv() {
            match result {
                MediaResult::Metadata { id, duration, width, height } => {
                    state.mark_ready(id, duration, width, height);
                    ctx.request_repaint();
                }

                MediaResult::Poster { id, width, height, data } => {
                    if state.item(id).is_none() { continue; }
                    let tex = ctx.load_texture(
                        format!("poster-{id}"),
                        egui::ColorImage::from_rgba_unmultiplied(
                            [width as usize, height as usize], &data,
                        ),
                        egui::TextureOptions::LINEAR,
                    );
                    self.cache.poster_cache.insert(id, tex);
                    ctx.request_repaint();
                }

                MediaResult::AudioPath { id, path } => {
                    match state.item_mut(id) {
                        Some(item) => item.audio_path = Some(path),
                        // Item was dropped by a reload while its audio was
                        // being extracted.
                        None => state.pending_audio_cleanup.push(path),
                    }
                }

                MediaResult::Error { id, msg } => {
                    feed_log!("[media] {id}: {msg}");
                    state.mark_failed(id, msg);
                    ctx.request_repaint();
                }
            }
        }
    }
}
