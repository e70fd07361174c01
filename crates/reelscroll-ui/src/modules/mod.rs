// crates/reelscroll-ui/src/modules/mod.rs
//
// Module registry. Panels implement FeedPanel and are called from app.rs;
// video_module and audio_module have no panel and are ticked directly.

pub mod audio_module;
pub mod feed;
pub mod nav;
pub mod toolbar;
pub mod video_module;

use egui::Ui;
use reelscroll_core::commands::FeedCommand;
use reelscroll_core::state::FeedState;

use crate::context::CacheContext;

/// Read-only runtime view handed to panels alongside FeedState.
pub struct FeedView<'a> {
    pub cache:   &'a CacheContext,
    /// Index chosen to play, if any.
    pub playing: Option<usize>,
    /// The chosen item is held paused by the user.
    pub held:    bool,
    /// Source position of the playing item's last shown frame.
    pub position: Option<f64>,
}

/// Panels read state and emit commands; they never mutate state directly.
pub trait FeedPanel {
    fn ui(
        &mut self,
        ui:    &mut Ui,
        state: &FeedState,
        view:  &FeedView<'_>,
        cmd:   &mut Vec<FeedCommand>,
    );
}
