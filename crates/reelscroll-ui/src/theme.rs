// crates/reelscroll-ui/src/theme.rs
use egui::{Context, Color32, Stroke, Visuals, Style};

// ── Palette ──────────────────────────────────────────────────────────────────
pub const ACCENT:        Color32 = Color32::from_rgb(254,  73, 128);
pub const ACCENT_DIM:    Color32 = Color32::from_rgb(170,  40,  82);
pub const ACCENT_HOVER:  Color32 = Color32::from_rgb(255, 120, 160);

pub const BG_0:          Color32 = Color32::from_rgb(  0,   0,   0);
pub const BG_1:          Color32 = Color32::from_rgb( 16,  16,  18);
pub const BG_2:          Color32 = Color32::from_rgb( 28,  28,  32);
pub const BG_3:          Color32 = Color32::from_rgb( 44,  44,  50);

pub const TEXT:          Color32 = Color32::from_rgb(240, 240, 245);
pub const TEXT_DIM:      Color32 = Color32::from_rgb(140, 140, 150);
pub const BORDER:        Color32 = Color32::from_rgb( 50,  50,  58);

/// Translucent band behind the title overlay.
pub const OVERLAY:       Color32 = Color32::from_black_alpha(150);

pub fn configure_style(ctx: &Context) {
    let mut style = Style::default();

    style.spacing.item_spacing     = egui::vec2(6.0, 4.0);
    style.spacing.button_padding   = egui::vec2(8.0, 4.0);
    style.spacing.scroll.bar_width = 4.0;

    let cr = egui::CornerRadius::same(6);

    let mut v = Visuals::dark();
    v.panel_fill       = BG_1;
    v.window_fill      = BG_2;
    v.extreme_bg_color = BG_0;
    v.window_stroke    = Stroke::new(1.0, BORDER);

    v.selection.bg_fill = ACCENT;
    v.selection.stroke  = Stroke::new(1.0, Color32::WHITE);
    v.hyperlink_color   = ACCENT_HOVER;

    v.widgets.inactive.bg_fill       = BG_3;
    v.widgets.inactive.weak_bg_fill  = BG_2;
    v.widgets.inactive.fg_stroke     = Stroke::new(1.0, TEXT);
    v.widgets.inactive.corner_radius = cr;

    v.widgets.hovered.bg_fill        = BG_3;
    v.widgets.hovered.bg_stroke      = Stroke::new(1.0, ACCENT_DIM);
    v.widgets.hovered.fg_stroke      = Stroke::new(1.5, ACCENT_HOVER);
    v.widgets.hovered.corner_radius  = cr;

    v.widgets.active.bg_fill         = ACCENT_DIM;
    v.widgets.active.bg_stroke       = Stroke::new(1.0, ACCENT);
    v.widgets.active.fg_stroke       = Stroke::new(2.0, Color32::WHITE);
    v.widgets.active.corner_radius   = cr;

    v.override_text_color = Some(TEXT);

    ctx.set_visuals(v);
    ctx.set_style(style);
}
