// crates/reelscroll-ui/src/modules/video_module.rs
//
// VideoModule turns PlayerCommands into decode-thread starts and stops, and
// consumes playback frames on their presentation clock. No panel.
//
// The controller emits a full pause sweep before every play, often several
// times per frame while scrolling. Only the net result of a batch reaches
// the decode thread, so an item that stays the target keeps decoding.

use std::time::{Duration, Instant};

use eframe::egui;
use uuid::Uuid;

use reelscroll_core::media_types::PlaybackFrame;
use reelscroll_core::playback::PlayerCommand;
use reelscroll_core::state::{FeedItem, FeedState};

use crate::context::AppContext;
use crate::feed_log;

/// Show a frame at most this early.
const EARLY_SLACK: f64 = 1.0 / 60.0;
/// Frames older than this relative to the clock are skipped.
const LATE_SLACK:  f64 = 1.0 / 30.0;

pub struct VideoModule;

impl VideoModule {
    /// Item left playing after applying `cmds` on top of the current one.
    fn net_target(current: Option<usize>, len: usize, cmds: &[PlayerCommand]) -> Option<usize> {
        let mut playing = vec![false; len];
        if let Some(i) = current.filter(|i| *i < len) {
            playing[i] = true;
        }
        for cmd in cmds {
            match *cmd {
                PlayerCommand::Pause(i) if i < len => playing[i] = false,
                PlayerCommand::Play(i)  if i < len => playing[i] = true,
                _ => {}
            }
        }
        playing.iter().position(|p| *p)
    }

    /// The item at `target`, unless it failed to load. Playing a failed item
    /// is a no-op.
    fn playable(state: &FeedState, target: Option<usize>) -> Option<&FeedItem> {
        let item = state.items.get(target?)?;
        if item.is_failed() {
            feed_log!("[video] not playing '{}': item failed to load", item.title);
            return None;
        }
        Some(item)
    }

    /// Apply one batch of controller output.
    pub fn apply(cmds: Vec<PlayerCommand>, state: &mut FeedState, ctx: &mut AppContext) {
        if cmds.is_empty() {
            return;
        }
        let current = ctx.playback.active
            .and_then(|id| state.item(id))
            .map(|item| item.index);
        let target = Self::net_target(current, state.items.len(), &cmds);
        if target == current {
            return;
        }

        Self::pause_active(state, ctx);

        let Some(item) = Self::playable(state, target) else { return };
        feed_log!("[video] play #{} '{}' from {:.2}s", item.index, item.title, item.position);
        ctx.media_worker.start_playback(item.id, item.url.clone(), item.position);
        ctx.playback.active         = Some(item.id);
        ctx.playback.started_at     = None;
        ctx.playback.last_source_ts = Some(item.position);
        ctx.cache.pending_pb_frame  = None;
    }

    /// Stop the decode thread and remember where the active item was.
    pub fn pause_active(state: &mut FeedState, ctx: &mut AppContext) {
        let Some(id) = ctx.playback.active.take() else { return };
        ctx.media_worker.stop_playback();
        if let (Some(item), Some(ts)) = (state.item_mut(id), ctx.playback.last_source_ts) {
            item.position = ts;
        }
        ctx.playback.started_at     = None;
        ctx.playback.last_source_ts = None;
        ctx.cache.pending_pb_frame  = None;
    }

    /// The active item turned out to be unplayable after it was started.
    pub fn tick(state: &mut FeedState, ctx: &mut AppContext) {
        let failed = ctx.playback.active
            .and_then(|id| state.item(id))
            .map(|item| item.is_failed())
            .unwrap_or(false);
        if failed {
            Self::pause_active(state, ctx);
        }
    }

    /// Clock-gated frame consumption. Call once per frame before the UI pass.
    ///
    /// The decode thread runs ahead up to the frame channel's capacity. One
    /// frame is held in a pending slot and only promoted to the texture cache
    /// once the active item's clock reaches its presentation time.
    pub fn poll_playback(state: &mut FeedState, ctx: &mut AppContext, egui_ctx: &egui::Context) {
        let Some(active) = ctx.playback.active else { return };

        if ctx.cache.pending_pb_frame.as_ref().is_some_and(|f| f.id != active) {
            ctx.cache.pending_pb_frame = None;
        }
        if ctx.cache.pending_pb_frame.is_none() {
            ctx.cache.pending_pb_frame = Self::next_for(ctx, active);
        }
        let Some(first) = ctx.cache.pending_pb_frame.as_ref() else {
            // Decoder still opening; check again shortly.
            egui_ctx.request_repaint_after(Duration::from_millis(8));
            return;
        };

        // The clock starts when the first frame shows up, so open and seek
        // latency never count as playback time.
        if ctx.playback.started_at.is_none() {
            let now = Instant::now();
            ctx.playback.started_at = Some(
                now.checked_sub(Duration::from_secs_f64(first.present_at.max(0.0)))
                    .unwrap_or(now),
            );
        }
        let Some(clock) = ctx.playback.clock() else { return };

        // Skip frames that are already overdue.
        while ctx.cache.pending_pb_frame.as_ref().is_some_and(|f| f.present_at < clock - LATE_SLACK) {
            match Self::next_for(ctx, active) {
                Some(newer) => ctx.cache.pending_pb_frame = Some(newer),
                None        => break,
            }
        }

        let due = ctx.cache.pending_pb_frame.as_ref()
            .is_some_and(|f| f.present_at <= clock + EARLY_SLACK);
        if due {
            if let Some(f) = ctx.cache.pending_pb_frame.take() {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [f.width as usize, f.height as usize], &f.data,
                );
                match ctx.cache.frame_cache.get_mut(&f.id) {
                    Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        let tex = egui_ctx.load_texture(
                            format!("pb-{}", f.id), image, egui::TextureOptions::LINEAR,
                        );
                        ctx.cache.frame_cache.insert(f.id, tex);
                    }
                }
                ctx.playback.last_source_ts = Some(f.source_ts);
                if let Some(item) = state.item_mut(f.id) {
                    item.position = f.source_ts;
                }
                ctx.cache.pending_pb_frame = Self::next_for(ctx, active);
            }
        }
        egui_ctx.request_repaint();
    }

    /// Next frame from the channel that belongs to `active`.
    fn next_for(ctx: &AppContext, active: Uuid) -> Option<PlaybackFrame> {
        while let Ok(f) = ctx.media_worker.pb_rx.try_recv() {
            if f.id == active {
                return Some(f);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscroll_core::playback::PlaybackController;

    #[test]
    fn pause_sweep_then_same_play_is_a_no_op() {
        let mut pc = PlaybackController::new(3);
        pc.start();
        let cmds = pc.on_scroll(30.0, 800.0);
        assert_eq!(VideoModule::net_target(Some(0), 3, &cmds), Some(0));
    }

    #[test]
    fn batch_resolves_to_last_play() {
        let cmds = [
            PlayerCommand::Pause(0), PlayerCommand::Pause(1), PlayerCommand::Play(1),
            PlayerCommand::Pause(0), PlayerCommand::Pause(1), PlayerCommand::Play(0),
        ];
        assert_eq!(VideoModule::net_target(None, 2, &cmds), Some(0));
    }

    #[test]
    fn hold_pauses_everything() {
        let cmds = [PlayerCommand::Pause(2)];
        assert_eq!(VideoModule::net_target(Some(2), 3, &cmds), None);
    }

    #[test]
    fn batch_targeting_a_failed_item_starts_nothing() {
        use reelscroll_core::manifest::VideoDescriptor;

        let mut state = FeedState::default();
        state.begin_load();
        state.apply_manifest(Ok(vec![
            VideoDescriptor { title: "Good".into(), url: "good.mp4".into() },
            VideoDescriptor { title: "Broken".into(), url: "broken.mp4".into() },
        ]));
        let broken = state.items[1].id;
        state.mark_failed(broken, "could not open".into());

        let mut pc = PlaybackController::new(2);
        pc.start();
        let cmds = pc.on_scroll(800.0, 800.0);
        let target = VideoModule::net_target(Some(0), 2, &cmds);
        assert_eq!(target, Some(1));
        assert!(VideoModule::playable(&state, target).is_none());
        assert_eq!(VideoModule::playable(&state, Some(0)).map(|i| i.index), Some(0));
        assert!(VideoModule::playable(&state, None).is_none());
    }

    #[test]
    fn out_of_range_commands_are_ignored() {
        let cmds = [PlayerCommand::Pause(0), PlayerCommand::Play(7)];
        assert_eq!(VideoModule::net_target(Some(0), 2, &cmds), None);
    }
}
