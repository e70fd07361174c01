// crates/reelscroll-ui/src/modules/audio_module.rs
//
// AudioModule keeps one looping rodio sink per item that has played, and
// makes sure only the item the video module is decoding is audible.
// Non-rendering; tick() runs every frame after commands are processed.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStreamBuilder, Sink};
use uuid::Uuid;

use reelscroll_core::state::{FeedItem, FeedState};

use crate::context::AppContext;
use crate::feed_log;

/// Frames to wait after opening the output stream before connecting sinks.
/// Some backends register their session asynchronously and drop the first
/// samples of a sink created on the same frame.
const STREAM_WARMUP_TICKS: u8 = 5;

pub struct AudioModule {
    stream_warmup_ticks: u8,
    stream_failed:       bool,
    /// Item whose sink was last started; a change means the new one has to
    /// be re-seeked to the video position.
    audible:             Option<Uuid>,
    /// Items whose WAV could not be opened. Not retried until the next feed.
    broken:              HashSet<Uuid>,
}

impl AudioModule {
    pub fn new() -> Self {
        Self {
            stream_warmup_ticks: 0,
            stream_failed:       false,
            audible:             None,
            broken:              HashSet::new(),
        }
    }

    /// Forget all per-feed state. Called when the feed is rebuilt.
    pub fn reset(&mut self, ctx: &mut AppContext) {
        ctx.audio_sinks.clear();
        self.audible = None;
        self.broken.clear();
    }

    pub fn tick(&mut self, state: &FeedState, ctx: &mut AppContext) {
        if ctx.audio_stream.is_none() && !self.stream_failed {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    feed_log!("[audio] output stream ready");
                    ctx.audio_stream = Some(stream);
                    self.stream_warmup_ticks = STREAM_WARMUP_TICKS;
                }
                Err(e) => {
                    feed_log!("[audio] no output device, playing silent: {e}");
                    self.stream_failed = true;
                }
            }
        }
        if self.stream_warmup_ticks > 0 {
            self.stream_warmup_ticks -= 1;
            return;
        }

        // Sinks of items dropped from the feed.
        ctx.audio_sinks.retain(|id, _| state.item(*id).is_some());

        let active = ctx.playback.active;
        for (id, sink) in &ctx.audio_sinks {
            if Some(*id) != active && !sink.is_paused() {
                sink.pause();
            }
        }

        let Some(item) = active.and_then(|id| state.item(id)) else {
            self.audible = None;
            return;
        };
        if !ctx.audio_sinks.contains_key(&item.id) {
            let Some(sink) = self.open_sink(item, ctx) else { return };
            ctx.audio_sinks.insert(item.id, sink);
        }
        let Some(sink) = ctx.audio_sinks.get(&item.id) else { return };

        if self.audible != Some(item.id) || sink.is_paused() {
            // Line the soundtrack up with the frame the video resumes from.
            let at = if item.duration > 0.0 { item.position % item.duration } else { item.position };
            if let Err(e) = sink.try_seek(Duration::from_secs_f64(at.max(0.0))) {
                feed_log!("[audio] seek to {at:.2}s failed for '{}': {e}", item.title);
            }
            sink.play();
            self.audible = Some(item.id);
        }
        sink.set_volume(state.output_volume());
    }

    fn open_sink(&mut self, item: &FeedItem, ctx: &AppContext) -> Option<Sink> {
        if self.broken.contains(&item.id) {
            return None;
        }
        let stream = ctx.audio_stream.as_ref()?;
        // Still extracting, or the item has no soundtrack.
        let path = item.audio_path.as_ref()?;

        let decoder = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|f| Decoder::new_looped(BufReader::new(f)).map_err(|e| e.to_string()));
        match decoder {
            Ok(source) => {
                let sink = Sink::connect_new(&stream.mixer());
                sink.pause();
                sink.append(source);
                feed_log!("[audio] sink created for '{}'", item.title);
                Some(sink)
            }
            Err(e) => {
                feed_log!("[audio] {}: {e}", path.display());
                self.broken.insert(item.id);
                None
            }
        }
    }
}
