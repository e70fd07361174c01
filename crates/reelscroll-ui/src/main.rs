#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use mimalloc::MiMalloc;

use reelscroll_core::manifest::ManifestSource;

mod app;
mod context;
mod helpers;
mod loader;
mod modules;
mod theme;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> eframe::Result {
    ffmpeg_the_third::init().expect("FFmpeg init failed");
    ffmpeg_the_third::format::network::init();

    // `reelscroll [MANIFEST]`: a URL or a path to a JSON manifest.
    let manifest = std::env::args().nth(1).map(|arg| ManifestSource::parse(&arg));

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title("ReelScroll")
            .with_inner_size([420.0, 820.0])
            .with_min_inner_size([280.0, 480.0])
            .with_resizable(true),
        ..Default::default()
    };

    eframe::run_native(
        "ReelScroll",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::ReelScrollApp::new(cc, manifest)))),
    )
}
