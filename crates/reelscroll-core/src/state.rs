// crates/reelscroll-core/src/state.rs
// Feed data — no egui, no ffmpeg, no runtime handles.
// Only FeedSettings is persisted; the feed itself is rebuilt from the
// manifest on every launch.
use std::path::PathBuf;
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use crate::manifest::{resolve_media_url, ManifestSource, VideoDescriptor};
use crate::nav::NavBar;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// Manifest could not be loaded; the message is shown in place of the feed.
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemStatus {
    /// Metadata not probed yet.
    Pending,
    Ready,
    Failed(String),
}

/// One video card in the feed.
#[derive(Clone, Debug)]
pub struct FeedItem {
    pub id:         Uuid,
    pub index:      usize,
    pub title:      String,
    /// Descriptor URL resolved against the manifest location.
    pub url:        String,
    pub status:     ItemStatus,
    pub duration:   f64,
    pub video_size: Option<(u32, u32)>,
    pub audio_path: Option<PathBuf>,
    /// Source position to resume from the next time this item plays.
    pub position:   f64,
}

impl FeedItem {
    pub fn new(index: usize, descriptor: &VideoDescriptor, source: &ManifestSource) -> Self {
        Self {
            id:         Uuid::new_v4(),
            index,
            title:      descriptor.title.clone(),
            url:        resolve_media_url(source, &descriptor.url),
            status:     ItemStatus::Pending,
            duration:   0.0,
            video_size: None,
            audio_path: None,
            position:   0.0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, ItemStatus::Failed(_))
    }

    /// Text shown in place of the video when it cannot be loaded.
    pub fn failure_label(&self) -> String {
        format!("Could not load video: {}", self.title)
    }
}

/// User settings that survive restarts (eframe storage).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub manifest_source: ManifestSource,
    pub volume:          f32,
    pub muted:           bool,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            manifest_source: ManifestSource::default(),
            volume:          1.0,
            muted:           false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FeedState {
    pub settings: FeedSettings,
    pub load:     LoadStatus,
    pub items:    Vec<FeedItem>,
    pub nav:      NavBar,
    /// Placeholder notice from an unimplemented tab, shown until dismissed.
    pub notice:   Option<String>,
    /// (item_id, media_url) waiting to be handed to the media worker.
    pub pending_probes:        Vec<(Uuid, String)>,
    /// Temp WAVs of items dropped by a reload.
    pub pending_audio_cleanup: Vec<PathBuf>,
    /// Bumped on every load so views can drop per-feed bookkeeping.
    pub generation: u64,
}

impl FeedState {
    pub fn new(settings: FeedSettings) -> Self {
        Self { settings, ..Default::default() }
    }

    /// Drop the current feed and show the loading indicator.
    pub fn begin_load(&mut self) {
        self.pending_audio_cleanup.extend(
            self.items.drain(..).filter_map(|item| item.audio_path),
        );
        self.pending_probes.clear();
        self.generation += 1;
        self.load = LoadStatus::Loading;
    }

    /// Build the feed from a loaded manifest, or record why it failed.
    /// Returns the number of items created.
    pub fn apply_manifest(&mut self, result: Result<Vec<VideoDescriptor>, String>) -> usize {
        match result {
            Ok(videos) => {
                let source = &self.settings.manifest_source;
                self.items = videos.iter()
                    .enumerate()
                    .map(|(index, d)| FeedItem::new(index, d, source))
                    .collect();
                self.pending_probes = self.items.iter()
                    .map(|item| (item.id, item.url.clone()))
                    .collect();
                self.load = LoadStatus::Ready;
            }
            Err(msg) => {
                self.items.clear();
                self.load = LoadStatus::Failed(msg);
            }
        }
        self.items.len()
    }

    pub fn item(&self, id: Uuid) -> Option<&FeedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn item_mut(&mut self, id: Uuid) -> Option<&mut FeedItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn mark_ready(&mut self, id: Uuid, duration: f64, width: u32, height: u32) {
        if let Some(item) = self.item_mut(id) {
            item.status   = ItemStatus::Ready;
            item.duration = duration;
            if width > 0 && height > 0 {
                item.video_size = Some((width, height));
            }
        }
    }

    pub fn mark_failed(&mut self, id: Uuid, msg: String) {
        if let Some(item) = self.item_mut(id) {
            item.status = ItemStatus::Failed(msg);
        }
    }

    /// Effective audio gain after mute.
    pub fn output_volume(&self) -> f32 {
        if self.settings.muted { 0.0 } else { self.settings.volume }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors(n: usize) -> Vec<VideoDescriptor> {
        (0..n).map(|i| VideoDescriptor {
            title: format!("Video {i}"),
            url:   format!("clip{i}.mp4"),
        }).collect()
    }

    #[test]
    fn manifest_of_n_descriptors_builds_n_items_in_order() {
        let mut state = FeedState::default();
        state.begin_load();
        assert_eq!(state.load, LoadStatus::Loading);

        assert_eq!(state.apply_manifest(Ok(descriptors(4))), 4);
        assert_eq!(state.load, LoadStatus::Ready);
        let titles: Vec<_> = state.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Video 0", "Video 1", "Video 2", "Video 3"]);
        assert!(state.items.iter().enumerate().all(|(n, i)| i.index == n));
        assert_eq!(state.pending_probes.len(), 4);
        assert_eq!(state.pending_probes[2].0, state.items[2].id);
    }

    #[test]
    fn failure_replaces_loading_with_error() {
        let mut state = FeedState::default();
        state.begin_load();
        state.apply_manifest(Err("Error: connection refused".into()));
        assert_eq!(state.load, LoadStatus::Failed("Error: connection refused".into()));
        assert!(state.items.is_empty());
        assert!(state.pending_probes.is_empty());
    }

    #[test]
    fn reload_queues_audio_cleanup() {
        let mut state = FeedState::default();
        state.apply_manifest(Ok(descriptors(2)));
        state.items[1].audio_path = Some(PathBuf::from("/tmp/reelscroll_audio_x.wav"));
        state.begin_load();
        assert!(state.items.is_empty());
        assert_eq!(state.pending_audio_cleanup.len(), 1);
        assert_eq!(state.generation, 1);
    }

    #[test]
    fn item_status_transitions() {
        let mut state = FeedState::default();
        state.apply_manifest(Ok(descriptors(2)));
        let (a, b) = (state.items[0].id, state.items[1].id);
        state.mark_ready(a, 12.0, 1080, 1920);
        state.mark_failed(b, "no video stream".into());
        assert_eq!(state.items[0].status, ItemStatus::Ready);
        assert_eq!(state.items[0].video_size, Some((1080, 1920)));
        assert!(state.items[1].is_failed());
        assert_eq!(state.items[1].failure_label(), "Could not load video: Video 1");
    }

    #[test]
    fn mute_zeroes_output_volume() {
        let mut state = FeedState::default();
        state.settings.volume = 0.7;
        assert_eq!(state.output_volume(), 0.7);
        state.settings.muted = true;
        assert_eq!(state.output_volume(), 0.0);
    }

    #[test]
    fn settings_deserialize_with_missing_fields() {
        let s: FeedSettings = serde_json::from_str(r#"{"muted": true}"#).unwrap();
        assert!(s.muted);
        assert_eq!(s.volume, 1.0);
        assert_eq!(s.manifest_source, ManifestSource::default());
    }
}
