#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = doodle_tank::Config::from_env();
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 560.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Doodle Tank",
        native_options,
        Box::new(|cc| Ok(Box::new(doodle_tank::DoodleApp::new(cc, config)))),
    )
}

// Web builds start `DoodleApp` from the page bootstrap instead.
#[cfg(target_arch = "wasm32")]
fn main() {}
