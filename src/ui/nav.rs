use crate::controller::{GuideController, UiEvent};

/// Below this width the table of contents becomes a toggled menu.
pub const NARROW_WIDTH: f32 = 900.0;

pub struct TopBar {
    pub search_rect: egui::Rect,
    pub menu_button: Option<egui::Response>,
}

pub fn top_bar(
    ctx: &egui::Context,
    controller: &GuideController,
    focus_search: bool,
    narrow: bool,
    events: &mut Vec<UiEvent>,
) -> TopBar {
    egui::TopBottomPanel::top("nav")
        .show_separator_line(controller.scroll().nav_elevated())
        .show(ctx, |ui| {
            let mut menu_button = None;
            let mut search_rect = egui::Rect::NOTHING;

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if narrow {
                    let button = ui.selectable_label(controller.menu_open(), "☰");
                    if button.clicked() {
                        events.push(UiEvent::ToggleMenu);
                    }
                    menu_button = Some(button);
                }
                ui.label(egui::RichText::new("🐳 Odoo Docker Guide").strong().size(16.0));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let mut query = controller.query().to_string();
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut query)
                            .hint_text("Search (Ctrl+K)")
                            .desired_width(240.0),
                    );
                    if focus_search {
                        response.request_focus();
                    }
                    if response.changed() {
                        events.push(UiEvent::QueryChanged(query));
                    }
                    search_rect = response.rect;
                });
            });
            ui.add_space(4.0);
            ui.add(
                egui::ProgressBar::new(controller.scroll().percent() / 100.0)
                    .desired_height(3.0)
                    .fill(egui::Color32::from_rgb(0xB8, 0x5C, 0x39)),
            );

            TopBar {
                search_rect,
                menu_button,
            }
        })
        .inner
}

/// Table of contents. Returns the panel response when it is shown.
pub fn toc(
    ctx: &egui::Context,
    controller: &GuideController,
    narrow: bool,
    events: &mut Vec<UiEvent>,
) -> Option<egui::Response> {
    if narrow && !controller.menu_open() {
        return None;
    }

    let panel = egui::SidePanel::left("toc")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.label(egui::RichText::new("Contents").strong());
            ui.separator();

            for section in &controller.document().sections {
                let Some(id) = section.id.as_deref() else {
                    continue;
                };
                let active = controller.active_section() == Some(id);
                if ui.selectable_label(active, section.title()).clicked() {
                    events.push(UiEvent::NavigateTo(id.to_string()));
                }
            }

            ui.add_space(12.0);
            let steps = controller.steps();
            ui.add(egui::ProgressBar::new(steps.ratio()).text(steps.stats_label()));
        });

    Some(panel.response)
}
