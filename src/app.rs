use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clipboard::SystemClipboard;
use crate::config::{self, Settings};
use crate::controller::{GuideController, UiEvent};
use crate::guide;
use crate::hotkeys::{self, HotkeyEvent};
use crate::storage;
use crate::ui::toast::ToastKind;
use crate::ui::{self, SearchPanel};
use crate::watcher::GuideWatcher;

const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct GuideApp {
    controller: GuideController,
    search_panel: SearchPanel,

    hotkey_receiver: mpsc::Receiver<HotkeyEvent>,
    guide_path: Option<PathBuf>,
    watcher: Option<GuideWatcher>,
    window_title: String,
}

impl GuideApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        hotkey_rx: mpsc::Receiver<HotkeyEvent>,
        settings: Settings,
    ) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let guide_path = settings.guide_path.clone();
        let document = guide::load(guide_path.as_deref());
        let store = storage::open_store(config::data_dir());

        let watcher = guide_path.as_deref().and_then(|path| match GuideWatcher::spawn(path) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                log::warn!("Guide changes will not be picked up: {}", e);
                None
            }
        });

        let controller =
            GuideController::new(settings, document, store, Arc::new(SystemClipboard::new()));
        log::info!(
            "Guide ready: {} sections, {} steps, {} min read",
            controller.document().sections.len(),
            controller.steps().total(),
            controller.reading_time_minutes()
        );

        Self {
            controller,
            search_panel: SearchPanel::new(),
            hotkey_receiver: hotkey_rx,
            guide_path,
            watcher,
            window_title: String::new(),
        }
    }

    fn reload_if_changed(&mut self, now: Instant) {
        let (Some(watcher), Some(path)) = (&self.watcher, &self.guide_path) else {
            return;
        };
        if !watcher.changed() {
            return;
        }
        match guide::load_file(path) {
            Ok(document) => {
                self.controller.reload(document);
                self.controller.notify("Guide reloaded", ToastKind::Info, now);
            }
            Err(e) => log::error!("{}; keeping the current guide", e),
        }
    }
}

impl eframe::App for GuideApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        while let Ok(event) = self.hotkey_receiver.try_recv() {
            match event {
                HotkeyEvent::ShowGuide => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                    self.controller.dispatch(UiEvent::FocusSearch, now);
                }
            }
        }

        self.reload_if_changed(now);
        self.controller.poll(now);

        for event in hotkeys::collect(ctx) {
            self.controller.dispatch(event, now);
        }

        let mut events = Vec::new();
        let narrow = ctx.screen_rect().width() < ui::nav::NARROW_WIDTH;
        let focus_search = self.controller.take_focus_request();
        let scroll_target = self.controller.take_pending_scroll();

        let top_bar = ui::nav::top_bar(ctx, &self.controller, focus_search, narrow, &mut events);
        let toc = ui::nav::toc(ctx, &self.controller, narrow, &mut events);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::guide_view::show(ui, &self.controller, scroll_target.as_ref(), &mut events);
        });

        ui::guide_view::back_to_top(ctx, &self.controller, &mut events);
        self.search_panel
            .show(ctx, top_bar.search_rect, self.controller.outcome(), &mut events);

        if narrow && self.controller.menu_open() {
            let over_menu = toc.as_ref().is_some_and(|r| r.contains_pointer())
                || top_bar.menu_button.as_ref().is_some_and(|r| r.contains_pointer());
            if !over_menu && ctx.input(|i| i.pointer.any_click()) {
                events.push(UiEvent::CloseMenu);
            }
        }

        for event in events {
            self.controller.dispatch(event, now);
        }

        if let Some(confetti) = self.controller.confetti() {
            confetti.paint(ctx, now);
        }
        ui::toast::show(ctx, self.controller.notifier(), now);

        let title = self.controller.scroll().window_title();
        if title != self.window_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.window_title = title;
        }

        if self.controller.is_animating(now) {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_POLL);
        }
    }
}
