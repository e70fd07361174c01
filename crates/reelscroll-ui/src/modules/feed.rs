// crates/reelscroll-ui/src/modules/feed.rs
//
// The scrolling feed. Every card is exactly one viewport tall; the scroll
// area snaps to the nearest card once the user lets go.
//
// Each frame this module reports two independent signals to app.rs:
//   - FeedCommand::Intersections for cards that crossed the visibility threshold
//   - FeedCommand::Scrolled whenever the offset (or viewport height) changed
// It never starts or stops playback itself.

use std::time::{Duration, Instant};

use egui::{Align2, Color32, FontId, Key, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};

use reelscroll_core::commands::FeedCommand;
use reelscroll_core::helpers::geometry::fit_size;
use reelscroll_core::helpers::time::{format_duration, progress};
use reelscroll_core::playback::{intersection_ratio, scroll_index, Span, VisibilityWatcher};
use reelscroll_core::state::{FeedItem, FeedState, LoadStatus};

use super::{FeedPanel, FeedView};
use crate::helpers::format::fit_head;
use crate::theme::{ACCENT, BG_0, OVERLAY, TEXT, TEXT_DIM};

/// How long the offset must stay still before snapping.
const SNAP_IDLE: Duration = Duration::from_millis(160);
const OVERLAY_H: f32 = 64.0;
const TITLE_PX:  f32 = 15.0;

pub struct FeedModule {
    watcher:    VisibilityWatcher,
    /// (generation, item count) the watcher was last sized for.
    synced:     (u64, usize),
    /// (offset, viewport height) last reported as Scrolled.
    last:       Option<(f32, f32)>,
    last_moved: Option<Instant>,
    /// Card to jump to on the next frame (snap, keyboard, new feed).
    scroll_to:  Option<usize>,
}

impl FeedModule {
    pub fn new() -> Self {
        Self {
            watcher:    VisibilityWatcher::new(0),
            synced:     (0, 0),
            last:       None,
            last_moved: None,
            scroll_to:  None,
        }
    }

    /// Start over whenever the feed is rebuilt (a load begins, then items
    /// arrive).
    fn sync_feed(&mut self, state: &FeedState) {
        let key = (state.generation, state.items.len());
        if self.synced == key {
            return;
        }
        self.synced = key;
        self.watcher.reset(state.items.len());
        self.last       = None;
        self.last_moved = None;
        self.scroll_to  = Some(0);
    }

    fn handle_keys(&mut self, ui: &Ui, state: &FeedState, current: usize) {
        let focused = ui.ctx().memory(|m| m.focused().is_some());
        if keyboard_blocked(state, focused) {
            return;
        }
        let len = state.items.len();
        let (next, prev) = ui.input(|i| (
            i.key_pressed(Key::ArrowDown) || i.key_pressed(Key::PageDown) || i.key_pressed(Key::J),
            i.key_pressed(Key::ArrowUp)   || i.key_pressed(Key::PageUp)   || i.key_pressed(Key::K),
        ));
        if next {
            self.scroll_to = Some((current + 1).min(len.saturating_sub(1)));
        } else if prev {
            self.scroll_to = Some(current.saturating_sub(1));
        }
    }

    fn feed_ui(&mut self, ui: &mut Ui, state: &FeedState, view: &FeedView<'_>, cmd: &mut Vec<FeedCommand>) {
        let len = state.items.len();
        let vh  = ui.available_height().max(1.0);
        let vw  = ui.available_width();

        let current = self.last
            .map(|(off, h)| nearest_card(off, h, len))
            .unwrap_or(0);
        self.handle_keys(ui, state, current);

        let mut area = egui::ScrollArea::vertical()
            .id_salt("feed_scroll")
            .auto_shrink([false; 2])
            .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::AlwaysHidden);
        if let Some(idx) = self.scroll_to.take() {
            area = area.vertical_scroll_offset(idx as f32 * vh);
        }

        let out = area.show_viewport(ui, |ui, viewport| {
            let (content, _) = ui.allocate_exact_size(Vec2::new(vw, vh * len as f32), Sense::hover());
            let vp = Span::new(viewport.min.y, viewport.height());

            let mut ratios = Vec::with_capacity(len);
            for item in &state.items {
                let top   = item.index as f32 * vh;
                let ratio = intersection_ratio(Span::new(top, vh), vp);
                ratios.push((item.index, ratio));
                if ratio <= 0.0 {
                    continue;
                }
                let rect = Rect::from_min_size(content.min + Vec2::new(0.0, top), Vec2::new(vw, vh));
                let resp = ui.interact(rect, ui.id().with(("card", item.id)), Sense::click());
                let is_target = view.playing == Some(item.index);
                if resp.clicked() && is_target {
                    cmd.push(FeedCommand::TogglePause);
                }
                paint_card(ui, rect, item, view, is_target);
            }

            let entries = self.watcher.observe_all(ratios);
            if !entries.is_empty() {
                cmd.push(FeedCommand::Intersections(entries));
            }
        });

        let offset = out.state.offset.y;
        if self.last != Some((offset, vh)) {
            self.last       = Some((offset, vh));
            self.last_moved = Some(Instant::now());
            cmd.push(FeedCommand::Scrolled { offset, viewport_height: vh });
            return;
        }

        // Snap once the offset has settled between two cards.
        let target = nearest_card(offset, vh, len) as f32 * vh;
        if (offset - target).abs() > 0.5 {
            let idle = self.last_moved.map(|t| t.elapsed() >= SNAP_IDLE).unwrap_or(true);
            let held = ui.input(|i| i.pointer.any_down());
            if idle && !held {
                self.scroll_to = Some(nearest_card(offset, vh, len));
            }
            ui.ctx().request_repaint_after(SNAP_IDLE);
        }
    }
}

impl FeedPanel for FeedModule {
    fn ui(&mut self, ui: &mut Ui, state: &FeedState, view: &FeedView<'_>, cmd: &mut Vec<FeedCommand>) {
        self.sync_feed(state);

        match &state.load {
            LoadStatus::Idle | LoadStatus::Loading => {
                ui.vertical_centered(|ui| {
                    ui.add_space((ui.available_height() / 2.0 - 30.0).max(0.0));
                    ui.add(egui::Spinner::new().size(28.0).color(ACCENT));
                    ui.label(RichText::new("Loading videos…").color(TEXT_DIM));
                });
            }
            LoadStatus::Failed(msg) => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new(msg).size(15.0).color(TEXT_DIM));
                });
            }
            LoadStatus::Ready => self.feed_ui(ui, state, view, cmd),
        }
    }
}

/// A focused text field or an open notice owns the keyboard.
fn keyboard_blocked(state: &FeedState, focused: bool) -> bool {
    focused || state.notice.is_some()
}

/// Card nearest to `offset`, clamped to the feed.
fn nearest_card(offset: f32, viewport_height: f32, len: usize) -> usize {
    scroll_index(offset, viewport_height)
        .unwrap_or(0)
        .min(len.saturating_sub(1))
}

fn paint_card(ui: &Ui, rect: Rect, item: &FeedItem, view: &FeedView<'_>, is_target: bool) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, BG_0);

    if item.is_failed() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            fit_head(&item.failure_label(), rect.width() - 32.0, TITLE_PX * 0.55),
            FontId::proportional(TITLE_PX),
            ACCENT,
        );
        return;
    }

    match view.cache.texture_for(item.id) {
        Some(tex) => {
            let [tw, th] = tex.size();
            let (w, h) = fit_size(tw as f32, th as f32, rect.width(), rect.height());
            painter.image(
                tex.id(),
                Rect::from_center_size(rect.center(), Vec2::new(w, h)),
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        None => {
            let spin = Rect::from_center_size(rect.center(), Vec2::splat(28.0));
            egui::Spinner::new().size(28.0).color(ACCENT).paint_at(ui, spin);
        }
    }

    if is_target && view.held {
        paint_paused_glyph(&painter, rect.center());
    }

    // ── Title overlay ─────────────────────────────────────────────────────────
    let band = Rect::from_min_max(Pos2::new(rect.min.x, rect.max.y - OVERLAY_H), rect.max);
    painter.rect_filled(band, 0.0, OVERLAY);
    painter.text(
        band.left_center() + Vec2::new(14.0, -8.0),
        Align2::LEFT_CENTER,
        fit_head(&item.title, band.width() - 96.0, TITLE_PX * 0.55),
        FontId::proportional(TITLE_PX),
        TEXT,
    );

    if item.duration > 0.0 {
        let label = match view.position.filter(|_| is_target) {
            Some(pos) => format!(
                "{} / {}",
                format_duration(pos % item.duration),
                format_duration(item.duration),
            ),
            None => format_duration(item.duration),
        };
        painter.text(
            band.right_center() + Vec2::new(-14.0, -8.0),
            Align2::RIGHT_CENTER,
            label,
            FontId::monospace(12.0),
            TEXT_DIM,
        );
    }

    if is_target {
        if let Some(pos) = view.position {
            let frac = progress(pos, item.duration);
            let y    = band.max.y - 3.0;
            painter.line_segment(
                [Pos2::new(band.min.x, y), Pos2::new(band.max.x, y)],
                Stroke::new(3.0, Color32::from_white_alpha(40)),
            );
            painter.line_segment(
                [Pos2::new(band.min.x, y), Pos2::new(band.min.x + band.width() * frac, y)],
                Stroke::new(3.0, ACCENT),
            );
        }
    }
}

fn paint_paused_glyph(painter: &egui::Painter, center: Pos2) {
    painter.circle_filled(center, 36.0, Color32::from_black_alpha(140));
    let r = 14.0;
    painter.add(egui::Shape::convex_polygon(
        vec![
            center + Vec2::new(-r * 0.6, -r),
            center + Vec2::new(r, 0.0),
            center + Vec2::new(-r * 0.6, r),
        ],
        Color32::WHITE,
        Stroke::NONE,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_card_clamps_to_feed() {
        assert_eq!(nearest_card(0.0, 800.0, 3), 0);
        assert_eq!(nearest_card(410.0, 800.0, 3), 1);
        assert_eq!(nearest_card(9000.0, 800.0, 3), 2);
        assert_eq!(nearest_card(-900.0, 800.0, 3), 0);
        assert_eq!(nearest_card(100.0, 800.0, 0), 0);
    }

    #[test]
    fn open_notice_blocks_feed_keys() {
        let mut state = FeedState::default();
        assert!(!keyboard_blocked(&state, false));
        assert!(keyboard_blocked(&state, true));
        state.notice = Some("This feature is not implemented in this version".into());
        assert!(keyboard_blocked(&state, false));
    }

    #[test]
    fn new_feed_scrolls_to_top_and_resizes_watcher() {
        use reelscroll_core::manifest::VideoDescriptor;

        let mut feed = FeedModule::new();
        let mut state = FeedState::default();
        state.begin_load();
        feed.sync_feed(&state);
        assert_eq!(feed.scroll_to, Some(0));
        assert!(feed.last.is_none());

        feed.scroll_to = None;
        feed.sync_feed(&state);
        assert_eq!(feed.scroll_to, None);

        state.apply_manifest(Ok(vec![
            VideoDescriptor { title: "A".into(), url: "a.mp4".into() },
            VideoDescriptor { title: "B".into(), url: "b.mp4".into() },
        ]));
        feed.sync_feed(&state);
        assert!(feed.watcher.observe(1, 1.0).is_some());
    }
}
