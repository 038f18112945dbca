use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastKind {
    #[default]
    Success,
    Info,
    Warning,
    Error,
}

impl ToastKind {
    pub fn icon(self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Info => "ℹ",
            ToastKind::Warning => "⚠",
            ToastKind::Error => "✕",
        }
    }

    fn color(self) -> egui::Color32 {
        match self {
            ToastKind::Success => egui::Color32::from_rgb(0x7A, 0x9E, 0x7E),
            ToastKind::Info => egui::Color32::from_rgb(0x5D, 0x7E, 0xA8),
            ToastKind::Warning => egui::Color32::from_rgb(0xD4, 0x9A, 0x3A),
            ToastKind::Error => egui::Color32::from_rgb(0xB8, 0x5C, 0x39),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

/// One toast at a time; a new one replaces whatever is showing.
#[derive(Debug)]
pub struct Notifier {
    current: Option<Toast>,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            current: None,
            duration,
        }
    }

    pub fn show(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        let message = message.into();
        log::debug!("Toast ({:?}): {}", kind, message);
        self.current = Some(Toast {
            message,
            kind,
            shown_at: now,
        });
    }

    pub fn active(&self, now: Instant) -> Option<&Toast> {
        self.current
            .as_ref()
            .filter(|toast| now.saturating_duration_since(toast.shown_at) < self.duration)
    }
}

pub fn show(ctx: &egui::Context, notifier: &Notifier, now: Instant) {
    let Some(toast) = notifier.active(now) else {
        return;
    };

    egui::Area::new(egui::Id::new("toast"))
        .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
        .order(egui::Order::Tooltip)
        .interactable(false)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(toast.kind.icon())
                            .strong()
                            .color(toast.kind.color()),
                    );
                    ui.label(&toast.message);
                });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_expires_after_duration() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.show("Copied to clipboard!", ToastKind::Success, start);

        assert!(notifier.active(start + Duration::from_millis(2999)).is_some());
        assert!(notifier.active(start + Duration::from_secs(3)).is_none());
    }

    #[test]
    fn newer_toast_supersedes_and_restarts_timer() {
        let start = Instant::now();
        let mut notifier = Notifier::new(Duration::from_secs(3));
        notifier.show("first", ToastKind::Success, start);
        notifier.show("second", ToastKind::Error, start + Duration::from_secs(2));

        let later = start + Duration::from_secs(4);
        let toast = notifier.active(later).unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[test]
    fn icons_per_kind() {
        assert_eq!(ToastKind::default().icon(), "✓");
        assert_eq!(ToastKind::Error.icon(), "✕");
    }
}
