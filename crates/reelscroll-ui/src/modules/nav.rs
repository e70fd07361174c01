// crates/reelscroll-ui/src/modules/nav.rs
//
// Bottom tab bar and the placeholder notice shown by tabs that have no
// destination yet.

use egui::{Color32, RichText, Sense, Stroke, Ui, Vec2};

use reelscroll_core::commands::FeedCommand;
use reelscroll_core::state::FeedState;

use super::{FeedPanel, FeedView};
use crate::theme::{ACCENT, BG_2, BORDER, TEXT, TEXT_DIM};

pub struct NavModule;

impl FeedPanel for NavModule {
    fn ui(&mut self, ui: &mut Ui, state: &FeedState, _view: &FeedView<'_>, cmd: &mut Vec<FeedCommand>) {
        let tabs  = state.nav.tabs();
        let tab_w = ui.available_width() / tabs.len().max(1) as f32;
        let tab_h = ui.available_height();

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            for (i, tab) in tabs.iter().enumerate() {
                let (rect, resp) = ui.allocate_exact_size(Vec2::new(tab_w, tab_h), Sense::click());
                let active = state.nav.is_active(i);
                let color = if active {
                    ACCENT
                } else if resp.hovered() {
                    TEXT
                } else {
                    TEXT_DIM
                };

                let painter = ui.painter();
                painter.text(
                    rect.center() - Vec2::new(0.0, 8.0),
                    egui::Align2::CENTER_CENTER,
                    tab.icon(),
                    egui::FontId::proportional(18.0),
                    color,
                );
                painter.text(
                    rect.center() + Vec2::new(0.0, 12.0),
                    egui::Align2::CENTER_CENTER,
                    tab.label(),
                    egui::FontId::proportional(11.0),
                    color,
                );
                if active {
                    painter.line_segment(
                        [rect.left_top() + Vec2::new(tab_w * 0.3, 1.0),
                         rect.right_top() - Vec2::new(tab_w * 0.3, -1.0)],
                        Stroke::new(2.0, ACCENT),
                    );
                }

                if resp.clicked() {
                    cmd.push(FeedCommand::SelectTab(i));
                }
            }
        });
    }
}

/// Centered card over a dimmed feed. OK or Escape dismisses it.
pub fn show_notice(ctx: &egui::Context, notice: Option<&str>, cmd: &mut Vec<FeedCommand>) {
    let Some(text) = notice else { return };

    let screen = ctx.viewport_rect();
    let scrim = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("notice_scrim"),
    ));
    scrim.rect_filled(screen, 0.0, Color32::from_black_alpha(150));

    const CARD_W: f32 = 300.0;
    const CARD_H: f32 = 130.0;
    let card = egui::Rect::from_center_size(screen.center(), egui::vec2(CARD_W, CARD_H));

    egui::Area::new(egui::Id::new("notice_card"))
        .order(egui::Order::Tooltip)
        .fixed_pos(card.min)
        .show(ctx, |ui| {
            ui.set_min_size(card.size());
            ui.set_max_size(card.size());
            ui.painter().rect(
                card,
                egui::CornerRadius::same(8),
                BG_2,
                Stroke::new(1.0, BORDER),
                egui::StrokeKind::Inside,
            );

            let mut child = ui.new_child(egui::UiBuilder::new().max_rect(card.shrink(18.0)));
            child.vertical_centered(|ui| {
                ui.label(RichText::new(text).size(13.0).color(TEXT));
                ui.add_space(14.0);
                let ok = egui::Button::new(RichText::new("OK").strong().color(Color32::WHITE))
                    .fill(ACCENT)
                    .min_size(egui::vec2(90.0, 28.0));
                if ui.add(ok).clicked() {
                    cmd.push(FeedCommand::DismissNotice);
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        cmd.push(FeedCommand::DismissNotice);
    }
}
