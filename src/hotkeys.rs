use std::sync::mpsc;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};

use crate::controller::UiEvent;

/// System-wide hotkeys delivered to the UI thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    ShowGuide,
}

/// Registers Ctrl+Super+G and forwards presses on `tx`. The manager must
/// outlive the app for the hotkey to stay registered.
pub fn register(
    tx: mpsc::Sender<HotkeyEvent>,
) -> Result<GlobalHotKeyManager, global_hotkey::Error> {
    let manager = GlobalHotKeyManager::new()?;
    let show_hotkey = HotKey::new(Some(Modifiers::SUPER | Modifiers::CONTROL), Code::KeyG);
    manager.register(show_hotkey)?;

    let show_id = show_hotkey.id();
    std::thread::spawn(move || {
        while let Ok(event) = GlobalHotKeyEvent::receiver().recv() {
            if event.id != show_id || event.state != HotKeyState::Pressed {
                continue;
            }
            if tx.send(HotkeyEvent::ShowGuide).is_err() {
                break;
            }
        }
    });

    Ok(manager)
}

/// In-window shortcuts: Ctrl/Cmd+K focuses search, Escape dismisses overlays.
pub fn map_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<UiEvent> {
    match key {
        egui::Key::K if modifiers.command || modifiers.ctrl || modifiers.mac_cmd => {
            Some(UiEvent::FocusSearch)
        }
        egui::Key::Escape => Some(UiEvent::Escape),
        _ => None,
    }
}

/// Shortcut events from this frame's input.
pub fn collect(ctx: &egui::Context) -> Vec<UiEvent> {
    ctx.input(|input| {
        input
            .events
            .iter()
            .filter_map(|event| match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } => map_key(*key, *modifiers),
                _ => None,
            })
            .collect()
    })
}
