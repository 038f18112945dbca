use crate::controller::{GuideController, ScrollTarget, UiEvent};
use crate::guide::{Block, CodeBlock, FaqItem, Section, Step};
use crate::tracking::ScrollMetrics;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(0xB8, 0x5C, 0x39);
const DONE: egui::Color32 = egui::Color32::from_rgb(0x7A, 0x9E, 0x7E);

/// Renders the guide body and reports scroll geometry and user actions.
pub fn show(
    ui: &mut egui::Ui,
    controller: &GuideController,
    target: Option<&ScrollTarget>,
    events: &mut Vec<UiEvent>,
) {
    let mut area = egui::ScrollArea::vertical()
        .id_salt("guide")
        .auto_shrink([false, false]);
    if target == Some(&ScrollTarget::Top) {
        area = area.vertical_scroll_offset(0.0);
    }

    let output = area.show(ui, |ui| {
        ui.set_max_width(ui.available_width().min(820.0));
        let origin = ui.min_rect().top();
        let mut anchors = Vec::new();

        intro(ui, controller);

        for section in &controller.document().sections {
            let response = section_heading(ui, section);
            if let Some(id) = &section.id {
                anchors.push((id.clone(), response.rect.top() - origin));
                if matches!(target, Some(ScrollTarget::Section(wanted)) if wanted == id) {
                    response.scroll_to_me(Some(egui::Align::TOP));
                }
            }
            for block in &section.blocks {
                block_ui(ui, controller, block, events);
            }
            ui.add_space(24.0);
        }

        anchors
    });

    let metrics = ScrollMetrics {
        offset: output.state.offset.y,
        content_height: output.content_size.y,
        viewport_height: output.inner_rect.height(),
    };
    if metrics != controller.scroll().metrics() {
        events.push(UiEvent::Scrolled(metrics));
    }
    events.push(UiEvent::SectionLayout(output.inner));
}

pub fn back_to_top(ctx: &egui::Context, controller: &GuideController, events: &mut Vec<UiEvent>) {
    if !controller.scroll().back_to_top_visible() {
        return;
    }
    egui::Area::new(egui::Id::new("back_to_top"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -72.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            if ui.button("↑ Top").on_hover_text("Back to top").clicked() {
                events.push(UiEvent::BackToTop);
            }
        });
}

fn intro(ui: &mut egui::Ui, controller: &GuideController) {
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label(
            egui::RichText::new(format!("{} min read", controller.reading_time_minutes())).weak(),
        );
        ui.separator();
        ui.label(egui::RichText::new(controller.steps().stats_label()).weak());
    });
    ui.add_space(8.0);
}

fn section_heading(ui: &mut egui::Ui, section: &Section) -> egui::Response {
    let title = section.heading.as_deref().unwrap_or_default();
    let size = if section.id.is_none() && section.heading.is_some() { 28.0 } else { 22.0 };
    ui.label(egui::RichText::new(title).size(size).strong().color(ACCENT))
}

fn block_ui(
    ui: &mut egui::Ui,
    controller: &GuideController,
    block: &Block,
    events: &mut Vec<UiEvent>,
) {
    match block {
        Block::Heading { level, text } => {
            ui.add_space(6.0);
            let size = if *level <= 3 { 18.0 } else { 16.0 };
            ui.label(egui::RichText::new(text).size(size).strong());
        }
        Block::Paragraph(text) => {
            ui.label(text);
        }
        Block::List { start, items } => {
            let mut number = start.unwrap_or(1);
            for item in items {
                let nested = item.starts_with("  ");
                let marker = if start.is_some() && !nested {
                    number += 1;
                    format!("{}.", number - 1)
                } else {
                    "•".to_string()
                };
                ui.horizontal_wrapped(|ui| {
                    ui.add_space(if nested { 28.0 } else { 8.0 });
                    ui.label(format!("{} {}", marker, item.trim_start()));
                });
            }
        }
        Block::Code(code) => code_block(ui, controller, code, events),
        Block::Step(step) => step_ui(ui, controller, step, events),
        Block::Faq(faq) => faq_ui(ui, controller, faq, events),
        Block::Rule => {
            ui.separator();
        }
    }
    ui.add_space(4.0);
}

fn code_block(
    ui: &mut egui::Ui,
    controller: &GuideController,
    code: &CodeBlock,
    events: &mut Vec<UiEvent>,
) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            let language = code.language.as_deref().unwrap_or("text");
            ui.label(egui::RichText::new(language).small().weak());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let collapsed = controller.is_collapsed(code.index);
                if ui.small_button(if collapsed { "Expand" } else { "Collapse" }).clicked() {
                    events.push(UiEvent::ToggleCodeCollapse(code.index));
                }
                if ui.small_button(controller.copy_label(code.index)).clicked() {
                    events.push(UiEvent::CopyCode(code.index));
                }
            });
        });
        if !controller.is_collapsed(code.index) {
            ui.label(egui::RichText::new(&code.code).monospace());
        }
    });
}

fn step_ui(
    ui: &mut egui::Ui,
    controller: &GuideController,
    step: &Step,
    events: &mut Vec<UiEvent>,
) {
    ui.add_space(6.0);
    let mut checked = controller.steps().is_completed(&step.id);
    let mut title = egui::RichText::new(&step.title).size(18.0).strong();
    if checked {
        title = title.color(DONE);
    }
    if ui.checkbox(&mut checked, title).changed() {
        events.push(UiEvent::ToggleStep(step.id.clone()));
    }
}

fn faq_ui(
    ui: &mut egui::Ui,
    controller: &GuideController,
    faq: &FaqItem,
    events: &mut Vec<UiEvent>,
) {
    let open = controller.is_faq_open(faq.index);
    let header = format!("{} {}", if open { "▾" } else { "▸" }, faq.question);
    if ui.selectable_label(open, egui::RichText::new(header).strong()).clicked() {
        events.push(UiEvent::ToggleFaq(faq.index));
    }
    if open {
        ui.indent(("faq", faq.index), |ui| {
            for block in &faq.answer {
                block_ui(ui, controller, block, events);
            }
        });
    }
}
