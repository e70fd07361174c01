// crates/reelscroll-ui/src/modules/toolbar.rs
//
// Top bar: manifest source, reload / open, mute and volume.

use egui::{Key, RichText, Ui};
use rfd::FileDialog;

use reelscroll_core::commands::FeedCommand;
use reelscroll_core::manifest::ManifestSource;
use reelscroll_core::state::{FeedState, LoadStatus};

use super::{FeedPanel, FeedView};
use crate::helpers::format::fit_tail;
use crate::theme::{ACCENT, TEXT_DIM};

const VOL_W: f32 = 70.0;

pub struct ToolbarModule {
    /// Text of the "open URL" field while it is shown.
    url_draft: Option<String>,
    focus_url: bool,
}

impl ToolbarModule {
    pub fn new() -> Self { Self { url_draft: None, focus_url: false } }

    fn url_row(&mut self, ui: &mut Ui, cmd: &mut Vec<FeedCommand>) {
        let Some(draft) = self.url_draft.as_mut() else { return };
        let mut close = false;
        ui.horizontal(|ui| {
            let resp = ui.add(
                egui::TextEdit::singleline(draft)
                    .hint_text("https://…/videos.json or a local path")
                    .desired_width(ui.available_width() - 60.0),
            );
            if std::mem::take(&mut self.focus_url) {
                resp.request_focus();
            }
            let submit = resp.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter));
            if (submit || ui.button("Open").clicked()) && !draft.trim().is_empty() {
                cmd.push(FeedCommand::OpenManifest(ManifestSource::parse(draft.trim())));
                close = true;
            }
            if ui.input(|i| i.key_pressed(Key::Escape)) {
                close = true;
            }
        });
        if close {
            self.url_draft = None;
        }
    }
}

impl FeedPanel for ToolbarModule {
    fn ui(&mut self, ui: &mut Ui, state: &FeedState, _view: &FeedView<'_>, cmd: &mut Vec<FeedCommand>) {
        ui.horizontal(|ui| {
            ui.set_min_height(30.0);
            ui.label(RichText::new("▶ ReelScroll").strong().size(15.0).color(ACCENT));
            ui.separator();

            // Right-aligned controls first so the source label gets what's left.
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let mut vol = state.settings.volume;
                let slider = egui::Slider::new(&mut vol, 0.0..=1.0).show_value(false);
                if ui.add_sized([VOL_W, 18.0], slider).changed() {
                    cmd.push(FeedCommand::SetVolume(vol));
                }

                let mute_icon = if state.settings.muted || state.settings.volume == 0.0 { "🔇" } else { "🔊" };
                if ui.button(mute_icon).on_hover_text("Mute (M)").clicked() {
                    cmd.push(FeedCommand::ToggleMute);
                }

                ui.separator();

                if ui.button("🔗").on_hover_text("Open manifest URL").clicked() {
                    if self.url_draft.take().is_none() {
                        self.url_draft = Some(String::new());
                        self.focus_url = true;
                    }
                }
                if ui.button("📂").on_hover_text("Open manifest file").clicked() {
                    if let Some(path) = FileDialog::new()
                        .add_filter("Manifest", &["json"])
                        .pick_file()
                    {
                        cmd.push(FeedCommand::OpenManifest(ManifestSource::Path(path)));
                    }
                }
                let loading = state.load == LoadStatus::Loading;
                if ui.add_enabled(!loading, egui::Button::new("⟳"))
                    .on_hover_text("Reload (F5)")
                    .clicked()
                {
                    cmd.push(FeedCommand::ReloadManifest);
                }

                let source = state.settings.manifest_source.to_string();
                let label  = fit_tail(&source, ui.available_width() - 8.0, 7.0);
                ui.with_layout(egui::Layout::left_to_right(egui::Align::Center), |ui| {
                    ui.label(RichText::new(label).size(12.0).color(TEXT_DIM))
                        .on_hover_text(source);
                });
            });
        });

        self.url_row(ui, cmd);
    }
}
