// crates/reelscroll-ui/src/app.rs
use eframe::egui;
use serde::{Deserialize, Serialize};

use reelscroll_core::commands::FeedCommand;
use reelscroll_core::manifest::ManifestSource;
use reelscroll_core::state::{FeedSettings, FeedState, LoadStatus};
use reelscroll_media::audio::cleanup_audio_temp;
use reelscroll_media::MediaWorker;

use crate::context::AppContext;
use crate::feed_log;
use crate::loader::spawn_manifest_load;
use crate::modules::{
    audio_module::AudioModule,
    feed::FeedModule,
    nav::{show_notice, NavModule},
    toolbar::ToolbarModule,
    video_module::VideoModule,
    FeedPanel, FeedView,
};
use crate::theme::{configure_style, BG_0, BG_1};

#[derive(Serialize, Deserialize)]
struct AppStorage {
    settings: FeedSettings,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct ReelScrollApp {
    state:        FeedState,
    context:      AppContext,
    toolbar:      ToolbarModule,
    feed:         FeedModule,
    nav:          NavModule,
    audio:        AudioModule,
    /// Commands emitted this frame, processed after the UI pass.
    pending_cmds: Vec<FeedCommand>,
}

impl ReelScrollApp {
    /// `manifest` (from the command line) overrides the remembered source.
    pub fn new(cc: &eframe::CreationContext<'_>, manifest: Option<ManifestSource>) -> Self {
        configure_style(&cc.egui_ctx);
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let mut settings = cc.storage
            .and_then(|s| eframe::get_value::<AppStorage>(s, eframe::APP_KEY))
            .map(|d| d.settings)
            .unwrap_or_default();
        if let Some(source) = manifest {
            settings.manifest_source = source;
        }
        feed_log!("[app] starting with manifest {}", settings.manifest_source);

        let mut app = Self {
            state:        FeedState::new(settings),
            context:      AppContext::new(MediaWorker::new()),
            toolbar:      ToolbarModule::new(),
            feed:         FeedModule::new(),
            nav:          NavModule,
            audio:        AudioModule::new(),
            pending_cmds: Vec::new(),
        };
        app.begin_manifest_load(&cc.egui_ctx);
        app
    }

    /// Tear down the current feed and fetch the manifest again.
    fn begin_manifest_load(&mut self, ctx: &egui::Context) {
        VideoModule::pause_active(&mut self.state, &mut self.context);
        self.audio.reset(&mut self.context);
        self.context.cache.clear_all();
        self.context.playback.reset(0);
        self.state.begin_load();

        let source = self.state.settings.manifest_source.clone();
        self.context.manifest_rx = Some(spawn_manifest_load(source, ctx.clone()));
    }

    fn process_command(&mut self, cmd: FeedCommand, ctx: &egui::Context) {
        match cmd {
            // ── Manifest ─────────────────────────────────────────────────────
            FeedCommand::ReloadManifest => {
                self.begin_manifest_load(ctx);
            }
            FeedCommand::OpenManifest(source) => {
                self.state.settings.manifest_source = source;
                self.begin_manifest_load(ctx);
            }

            // ── Visibility signals ───────────────────────────────────────────
            FeedCommand::Intersections(entries) => {
                let cmds = self.context.playback.controller.on_intersections(&entries);
                VideoModule::apply(cmds, &mut self.state, &mut self.context);
            }
            FeedCommand::Scrolled { offset, viewport_height } => {
                let cmds = self.context.playback.controller.on_scroll(offset, viewport_height);
                VideoModule::apply(cmds, &mut self.state, &mut self.context);
            }

            // ── Playback ─────────────────────────────────────────────────────
            FeedCommand::TogglePause => {
                let cmds = self.context.playback.controller.toggle_hold();
                VideoModule::apply(cmds, &mut self.state, &mut self.context);
            }
            FeedCommand::SetVolume(v) => {
                self.state.settings.volume = v.clamp(0.0, 1.0);
            }
            FeedCommand::ToggleMute => {
                self.state.settings.muted = !self.state.settings.muted;
            }

            // ── Navigation ───────────────────────────────────────────────────
            FeedCommand::SelectTab(i) => {
                if let Some(notice) = self.state.nav.select(i) {
                    feed_log!("[nav] {} selected: {notice}", self.state.nav.active_tab().label());
                    self.state.notice = Some(notice.to_string());
                }
            }
            FeedCommand::DismissNotice => {
                self.state.notice = None;
            }
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        for path in self.state.pending_audio_cleanup.drain(..) {
            cleanup_audio_temp(&path);
        }

        // ── Manifest load ─────────────────────────────────────────────────────
        let loaded = self.context.manifest_rx.as_ref().and_then(|rx| match rx.try_recv() {
            Ok(result) => Some(result),
            Err(crossbeam_channel::TryRecvError::Empty) => None,
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                Some(Err("Error: manifest loader stopped unexpectedly".to_string()))
            }
        });
        if let Some(result) = loaded {
            self.context.manifest_rx = None;
            let n = self.state.apply_manifest(result);
            self.context.playback.reset(n);
            if self.state.load == LoadStatus::Ready {
                let cmds = self.context.playback.controller.start();
                VideoModule::apply(cmds, &mut self.state, &mut self.context);
            }
        }

        let pending: Vec<_> = self.state.pending_probes.drain(..).collect();
        for (id, url) in pending {
            self.context.media_worker.probe(id, url);
        }

        // ── Playback frame consumption (clock-gated) ──────────────────────────
        VideoModule::poll_playback(&mut self.state, &mut self.context, ctx);

        self.context.ingest_media_results(&mut self.state, ctx);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) {
            self.pending_cmds.push(FeedCommand::ReloadManifest);
        }
        // Letters and Space belong to a focused text field.
        if ctx.memory(|m| m.focused().is_some()) || self.state.notice.is_some() {
            return;
        }
        let (mute, pause) = ctx.input(|i| (i.key_pressed(egui::Key::M), i.key_pressed(egui::Key::Space)));
        if mute {
            self.pending_cmds.push(FeedCommand::ToggleMute);
        }
        if pause {
            self.pending_cmds.push(FeedCommand::TogglePause);
        }
    }

    fn shutdown(&mut self) {
        VideoModule::pause_active(&mut self.state, &mut self.context);
        self.context.media_worker.shutdown();
        self.context.audio_sinks.clear();
        let owned = self.state.items.iter().filter_map(|i| i.audio_path.as_ref());
        for path in owned.chain(self.state.pending_audio_cleanup.iter()) {
            cleanup_audio_temp(path);
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for ReelScrollApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &AppStorage {
            settings: self.state.settings.clone(),
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);
        self.poll_media(ctx);

        let controller = &self.context.playback.controller;
        let playing    = controller.playing();
        let view = FeedView {
            cache:    &self.context.cache,
            playing,
            held:     controller.is_held(),
            position: playing
                .and_then(|i| self.state.items.get(i))
                .filter(|item| item.duration > 0.0)
                .map(|item| item.position),
        };

        egui::TopBottomPanel::top("toolbar_panel")
            .frame(egui::Frame::new().fill(BG_1).inner_margin(egui::Margin::symmetric(8, 4)))
            .show(ctx, |ui| {
                self.toolbar.ui(ui, &self.state, &view, &mut self.pending_cmds);
            });

        egui::TopBottomPanel::bottom("nav_panel")
            .exact_height(56.0)
            .frame(egui::Frame::new().fill(BG_1))
            .show(ctx, |ui| {
                self.nav.ui(ui, &self.state, &view, &mut self.pending_cmds);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(BG_0))
            .show(ctx, |ui| {
                self.feed.ui(ui, &self.state, &view, &mut self.pending_cmds);
            });

        show_notice(ctx, self.state.notice.as_deref(), &mut self.pending_cmds);

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<FeedCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx);
        }

        VideoModule::tick(&mut self.state, &mut self.context);
        self.audio.tick(&self.state, &mut self.context);
    }
}
