use std::sync::mpsc;

mod app;
mod clipboard;
mod config;
mod controller;
mod error;
mod guide;
mod hotkeys;
mod search;
mod storage;
mod tracking;
mod ui;
mod watcher;

use app::GuideApp;
use config::Settings;
use tracking::scroll::BASE_TITLE;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = Settings::load();

    let (hotkey_tx, hotkey_rx) = mpsc::channel();
    let _hotkey_manager = match hotkeys::register(hotkey_tx) {
        Ok(manager) => Some(manager),
        Err(e) => {
            log::warn!("Global hotkey unavailable: {}", e);
            None
        }
    };

    let _tray_icon = build_tray();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(BASE_TITLE)
            .with_icon(ui::icon::icon_data())
            .with_resizable(true)
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Odoo Docker Guide",
        options,
        Box::new(|cc| Ok(Box::new(GuideApp::new(cc, hotkey_rx, settings)))),
    )?;

    Ok(())
}

// The Linux tray needs a GTK main loop that eframe does not run.
#[cfg(not(target_os = "linux"))]
fn build_tray() -> Option<tray_icon::TrayIcon> {
    let image = ui::icon::render();
    let (width, height) = image.dimensions();

    let icon = match tray_icon::Icon::from_rgba(image.into_raw(), width, height) {
        Ok(icon) => icon,
        Err(e) => {
            log::warn!("Invalid tray icon: {}", e);
            return None;
        }
    };

    match tray_icon::TrayIconBuilder::new()
        .with_tooltip("Odoo Docker Guide")
        .with_icon(icon)
        .build()
    {
        Ok(tray) => Some(tray),
        Err(e) => {
            log::warn!("Tray icon unavailable: {}", e);
            None
        }
    }
}

#[cfg(target_os = "linux")]
fn build_tray() -> Option<()> {
    log::debug!("Tray icon disabled on Linux");
    None
}
