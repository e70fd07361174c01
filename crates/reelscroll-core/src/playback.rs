// crates/reelscroll-core/src/playback.rs
//
// Visibility-driven playback policy.
//
// Two independent signals decide which feed item plays:
//   - intersection entries (an item crossed the 50 % visible threshold)
//   - raw scroll offsets  (index = floor(scroll_top / viewport_h + 0.5))
//
// Both pause every item before playing the target, so the rule is simply
// last-writer-wins with mutual exclusion by pause-all. The controller only
// emits PlayerCommands; video_module/audio_module in the UI crate apply them.

/// Fraction of an item that must be inside the viewport to count as visible.
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerCommand {
    Pause(usize),
    Play(usize),
}

/// One threshold-crossing report for the item at `index`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub index:           usize,
    pub ratio:           f32,
    pub is_intersecting: bool,
}

/// A vertical extent in scroll-content coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top:    f32,
    pub height: f32,
}

impl Span {
    pub fn new(top: f32, height: f32) -> Self { Self { top, height } }
    pub fn bottom(&self) -> f32 { self.top + self.height }
}

/// Fraction of `item` that lies inside `viewport`, in `[0, 1]`.
///
/// ```
/// use reelscroll_core::playback::{intersection_ratio, Span};
/// let vp = Span::new(0.0, 100.0);
/// assert_eq!(intersection_ratio(Span::new(50.0, 100.0), vp), 0.5);
/// assert_eq!(intersection_ratio(Span::new(200.0, 100.0), vp), 0.0);
/// ```
pub fn intersection_ratio(item: Span, viewport: Span) -> f32 {
    if item.height <= 0.0 {
        return 0.0;
    }
    let top    = item.top.max(viewport.top);
    let bottom = item.bottom().min(viewport.bottom());
    ((bottom - top).max(0.0) / item.height).clamp(0.0, 1.0)
}

/// Index of the card nearest the top of the viewport, rounding at the
/// half-way point. `None` for a degenerate viewport or an offset more than
/// half a card above the first item.
///
/// ```
/// use reelscroll_core::playback::scroll_index;
/// assert_eq!(scroll_index(0.0, 800.0),   Some(0));
/// assert_eq!(scroll_index(399.0, 800.0), Some(0));
/// assert_eq!(scroll_index(400.0, 800.0), Some(1));
/// ```
pub fn scroll_index(scroll_top: f32, viewport_height: f32) -> Option<usize> {
    if viewport_height <= 0.0 || !scroll_top.is_finite() {
        return None;
    }
    let idx = (scroll_top / viewport_height + 0.5).floor();
    if idx < 0.0 { None } else { Some(idx as usize) }
}

// ── VisibilityWatcher ─────────────────────────────────────────────────────────

/// Per-item threshold tracker. Fed raw ratios every frame, reports only the
/// items whose visible/not-visible state changed (plus every item on its
/// first observation).
pub struct VisibilityWatcher {
    threshold: f32,
    /// `Some(above)` once an item has been observed.
    above:     Vec<Option<bool>>,
}

impl VisibilityWatcher {
    pub fn new(len: usize) -> Self {
        Self::with_threshold(len, VISIBILITY_THRESHOLD)
    }

    pub fn with_threshold(len: usize, threshold: f32) -> Self {
        Self { threshold, above: vec![None; len] }
    }

    /// Forget every observation, e.g. after the feed is rebuilt.
    pub fn reset(&mut self, len: usize) {
        self.above = vec![None; len];
    }

    pub fn observe(&mut self, index: usize, ratio: f32) -> Option<IntersectionEntry> {
        let slot = self.above.get_mut(index)?;
        let now_above = ratio >= self.threshold;
        if *slot == Some(now_above) {
            return None;
        }
        *slot = Some(now_above);
        Some(IntersectionEntry { index, ratio, is_intersecting: ratio > 0.0 })
    }

    pub fn observe_all<I>(&mut self, ratios: I) -> Vec<IntersectionEntry>
    where
        I: IntoIterator<Item = (usize, f32)>,
    {
        ratios.into_iter()
            .filter_map(|(index, ratio)| self.observe(index, ratio))
            .collect()
    }
}

// ── PlaybackController ────────────────────────────────────────────────────────

pub struct PlaybackController {
    len:     usize,
    playing: Option<usize>,
    /// The user paused the current target. Visibility events that land on the
    /// same item keep it paused; landing anywhere else clears the hold.
    held:    bool,
}

impl PlaybackController {
    pub fn new(len: usize) -> Self {
        Self { len, playing: None, held: false }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Item currently chosen to play (it may be held paused by the user).
    pub fn playing(&self) -> Option<usize> { self.playing }

    pub fn is_held(&self) -> bool { self.held }

    /// Autoplay the first item right after the feed is built.
    pub fn start(&mut self) -> Vec<PlayerCommand> {
        let mut out = Vec::new();
        if self.len > 0 {
            self.held = false;
            self.play(0, &mut out);
        }
        out
    }

    /// Handle a batch of intersection reports. Every entry at or above the
    /// threshold pauses everything and plays itself, in batch order.
    pub fn on_intersections(&mut self, entries: &[IntersectionEntry]) -> Vec<PlayerCommand> {
        let mut out = Vec::new();
        for entry in entries {
            if entry.is_intersecting && entry.ratio >= VISIBILITY_THRESHOLD {
                self.pause_all(&mut out);
                self.play(entry.index, &mut out);
            }
        }
        out
    }

    /// Handle a scroll event on the feed container.
    pub fn on_scroll(&mut self, scroll_top: f32, viewport_height: f32) -> Vec<PlayerCommand> {
        let mut out = Vec::new();
        let Some(index) = scroll_index(scroll_top, viewport_height) else {
            return out;
        };
        self.pause_all(&mut out);
        self.play(index, &mut out);
        out
    }

    /// User play/pause on the current target.
    pub fn toggle_hold(&mut self) -> Vec<PlayerCommand> {
        let Some(index) = self.playing else { return Vec::new() };
        self.held = !self.held;
        if self.held {
            vec![PlayerCommand::Pause(index)]
        } else {
            vec![PlayerCommand::Play(index)]
        }
    }

    fn pause_all(&self, out: &mut Vec<PlayerCommand>) {
        out.extend((0..self.len).map(PlayerCommand::Pause));
    }

    fn play(&mut self, index: usize, out: &mut Vec<PlayerCommand>) {
        if index >= self.len {
            self.playing = None;
            self.held    = false;
            return;
        }
        if self.held && self.playing == Some(index) {
            return;
        }
        self.held    = false;
        self.playing = Some(index);
        out.push(PlayerCommand::Play(index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plays(cmds: &[PlayerCommand]) -> Vec<usize> {
        cmds.iter()
            .filter_map(|c| match c { PlayerCommand::Play(i) => Some(*i), _ => None })
            .collect()
    }

    fn entry(index: usize, ratio: f32) -> IntersectionEntry {
        IntersectionEntry { index, ratio, is_intersecting: ratio > 0.0 }
    }

    #[test]
    fn start_plays_first_item() {
        let mut pc = PlaybackController::new(3);
        assert_eq!(pc.start(), vec![PlayerCommand::Play(0)]);
        assert_eq!(pc.playing(), Some(0));
    }

    #[test]
    fn start_on_empty_feed_does_nothing() {
        let mut pc = PlaybackController::new(0);
        assert!(pc.start().is_empty());
        assert_eq!(pc.playing(), None);
    }

    #[test]
    fn scroll_pauses_everything_then_plays_rounded_index() {
        let mut pc = PlaybackController::new(3);
        let cmds = pc.on_scroll(1250.0, 800.0);
        assert_eq!(&cmds[..3], &[
            PlayerCommand::Pause(0), PlayerCommand::Pause(1), PlayerCommand::Pause(2),
        ]);
        assert_eq!(plays(&cmds), vec![2]);
        assert_eq!(pc.playing(), Some(2));
    }

    #[test]
    fn scroll_past_the_end_leaves_everything_paused() {
        let mut pc = PlaybackController::new(2);
        pc.start();
        let cmds = pc.on_scroll(5000.0, 800.0);
        assert_eq!(cmds.len(), 2);
        assert!(plays(&cmds).is_empty());
        assert_eq!(pc.playing(), None);
    }

    #[test]
    fn scroll_with_zero_viewport_is_ignored() {
        let mut pc = PlaybackController::new(2);
        pc.start();
        assert!(pc.on_scroll(100.0, 0.0).is_empty());
        assert_eq!(pc.playing(), Some(0));
    }

    #[test]
    fn intersection_below_threshold_is_ignored() {
        let mut pc = PlaybackController::new(3);
        pc.start();
        assert!(pc.on_intersections(&[entry(1, 0.3)]).is_empty());
        assert_eq!(pc.playing(), Some(0));
    }

    #[test]
    fn last_visible_entry_in_a_batch_wins() {
        let mut pc = PlaybackController::new(3);
        let cmds = pc.on_intersections(&[entry(1, 0.6), entry(0, 0.1), entry(2, 0.5)]);
        assert_eq!(plays(&cmds), vec![1, 2]);
        assert_eq!(pc.playing(), Some(2));
        // every play is preceded by a full pause sweep
        assert_eq!(cmds.len(), 2 * (3 + 1));
    }

    #[test]
    fn at_most_one_item_plays_after_each_event() {
        let mut pc = PlaybackController::new(4);
        let mut playing = [false; 4];
        let mut apply = |cmds: Vec<PlayerCommand>| {
            for c in cmds {
                match c {
                    PlayerCommand::Pause(i) => playing[i] = false,
                    PlayerCommand::Play(i)  => playing[i] = true,
                }
            }
            playing.iter().filter(|p| **p).count()
        };
        assert!(apply(pc.start()) <= 1);
        assert!(apply(pc.on_scroll(900.0, 800.0)) <= 1);
        assert!(apply(pc.on_intersections(&[entry(3, 1.0), entry(2, 0.7)])) <= 1);
        assert!(apply(pc.on_scroll(-1000.0, 800.0)) <= 1);
    }

    #[test]
    fn held_item_stays_paused_until_scrolled_away() {
        let mut pc = PlaybackController::new(3);
        pc.start();
        assert_eq!(pc.toggle_hold(), vec![PlayerCommand::Pause(0)]);
        assert!(pc.is_held());

        // Visibility re-reports the same item: still paused.
        assert!(plays(&pc.on_scroll(10.0, 800.0)).is_empty());
        assert!(pc.is_held());

        // Moving to another item clears the hold.
        assert_eq!(plays(&pc.on_scroll(800.0, 800.0)), vec![1]);
        assert!(!pc.is_held());
    }

    #[test]
    fn toggle_hold_resumes() {
        let mut pc = PlaybackController::new(1);
        pc.start();
        pc.toggle_hold();
        assert_eq!(pc.toggle_hold(), vec![PlayerCommand::Play(0)]);
    }

    #[test]
    fn ratio_of_partially_visible_item() {
        let vp = Span::new(100.0, 800.0);
        assert_eq!(intersection_ratio(Span::new(500.0, 800.0), vp), 0.5);
        assert_eq!(intersection_ratio(Span::new(100.0, 800.0), vp), 1.0);
        assert_eq!(intersection_ratio(Span::new(0.0, 0.0), vp), 0.0);
    }

    #[test]
    fn scroll_index_rounds_half_up() {
        assert_eq!(scroll_index(1199.0, 800.0), Some(1));
        assert_eq!(scroll_index(1200.0, 800.0), Some(2));
        assert_eq!(scroll_index(-300.0, 800.0), Some(0));
        assert_eq!(scroll_index(-500.0, 800.0), None);
        assert_eq!(scroll_index(f32::NAN, 800.0), None);
    }

    #[test]
    fn watcher_reports_first_observation_and_crossings_only() {
        let mut w = VisibilityWatcher::new(2);
        let first = w.observe_all([(0, 1.0), (1, 0.0)]);
        assert_eq!(first.len(), 2);
        assert!(w.observe_all([(0, 0.9), (1, 0.2)]).is_empty());

        let crossed = w.observe_all([(0, 0.4), (1, 0.6)]);
        assert_eq!(crossed, vec![
            IntersectionEntry { index: 0, ratio: 0.4, is_intersecting: true },
            IntersectionEntry { index: 1, ratio: 0.6, is_intersecting: true },
        ]);
    }

    #[test]
    fn watcher_ignores_unknown_indices_and_resets() {
        let mut w = VisibilityWatcher::new(1);
        assert!(w.observe(5, 1.0).is_none());
        assert!(w.observe(0, 1.0).is_some());
        w.reset(1);
        assert!(w.observe(0, 1.0).is_some());
    }
}
