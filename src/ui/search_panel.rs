use egui_extras::{Column, TableBuilder};

use crate::controller::UiEvent;
use crate::search::{Highlighted, QueryOutcome};

const MARK: egui::Color32 = egui::Color32::from_rgb(0xDE, 0xC4, 0xAD);

/// Results dropdown under the search box, with arrow-key selection.
#[derive(Default)]
pub struct SearchPanel {
    selected: usize,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self { selected: 0 }
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        below: egui::Rect,
        outcome: &QueryOutcome,
        events: &mut Vec<UiEvent>,
    ) {
        let QueryOutcome::Results(matches) = outcome else {
            self.selected = 0;
            return;
        };

        if self.selected >= matches.len() {
            self.selected = matches.len().saturating_sub(1);
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowUp) && self.selected > 0 {
                self.selected -= 1;
            }
            if i.key_pressed(egui::Key::ArrowDown) && self.selected + 1 < matches.len() {
                self.selected += 1;
            }
            if i.key_pressed(egui::Key::Enter) {
                if let Some(found) = matches.get(self.selected) {
                    events.push(UiEvent::NavigateTo(found.id.clone()));
                }
            }
        });

        egui::Area::new(egui::Id::new("search_results"))
            .fixed_pos(below.left_bottom() + egui::vec2(0.0, 4.0))
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_width(480.0);

                    if matches.is_empty() {
                        ui.label(egui::RichText::new("No results found").weak());
                        return;
                    }

                    TableBuilder::new(ui)
                        .id_salt("search_results_table")
                        .striped(true)
                        .sense(egui::Sense::click())
                        .cell_layout(egui::Layout::top_down(egui::Align::Min))
                        .column(Column::remainder())
                        .max_scroll_height(360.0)
                        .body(|body| {
                            body.rows(44.0, matches.len(), |mut row| {
                                let index = row.index();
                                let found = &matches[index];
                                row.set_selected(index == self.selected);

                                row.col(|ui| {
                                    let style = ui.style().clone();
                                    let title = layout(&found.title, &style, true);
                                    ui.add(egui::Label::new(title).truncate());
                                    let mut excerpt = layout(&found.excerpt, &style, false);
                                    if found.truncated {
                                        excerpt.append("...", 0.0, plain_format(&style, false));
                                    }
                                    ui.add(egui::Label::new(excerpt).truncate());
                                });

                                if row.response().clicked() {
                                    self.selected = index;
                                    events.push(UiEvent::NavigateTo(found.id.clone()));
                                }
                            });
                        });
                });
            });
    }
}

fn plain_format(style: &egui::Style, strong: bool) -> egui::TextFormat {
    egui::TextFormat {
        font_id: egui::TextStyle::Body.resolve(style),
        color: if strong {
            style.visuals.strong_text_color()
        } else {
            style.visuals.weak_text_color()
        },
        ..Default::default()
    }
}

fn layout(text: &Highlighted, style: &egui::Style, strong: bool) -> egui::text::LayoutJob {
    let mut job = egui::text::LayoutJob::default();
    for span in &text.spans {
        let mut format = plain_format(style, strong);
        if span.marked {
            format.background = MARK;
            format.color = style.visuals.strong_text_color();
        }
        job.append(&span.text, 0.0, format);
    }
    job
}
