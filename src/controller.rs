//! Owns the guide's mutable state and applies UI events to it.
//!
//! Rendering code never mutates state directly: it reports what the user did
//! as [`UiEvent`]s and reads the results back through accessors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::clipboard::{ClipboardWorker, ClipboardWriter, CopyResult};
use crate::config::Settings;
use crate::guide::GuideDocument;
use crate::search::{QueryOutcome, SearchIndex};
use crate::storage::KeyValueStore;
use crate::tracking::{active_section, ScrollMetrics, ScrollTracker, StepTracker};
use crate::ui::confetti::Confetti;
use crate::ui::toast::{Notifier, ToastKind};

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    QueryChanged(String),
    FocusSearch,
    /// Closes the menu and the search results.
    Escape,
    NavigateTo(String),
    BackToTop,
    ToggleMenu,
    CloseMenu,
    ToggleStep(String),
    CopyCode(usize),
    ToggleCodeCollapse(usize),
    ToggleFaq(usize),
    Scrolled(ScrollMetrics),
    /// Section tops within the scroll content, in document order.
    SectionLayout(Vec<(String, f32)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Section(String),
}

pub struct GuideController {
    settings: Settings,
    document: GuideDocument,
    index: SearchIndex,

    query: String,
    outcome: QueryOutcome,
    focus_search: bool,
    menu_open: bool,

    steps: StepTracker,
    scroll: ScrollTracker,
    anchors: Vec<(String, f32)>,
    active_section: Option<String>,
    pending_scroll: Option<ScrollTarget>,

    notifier: Notifier,
    clipboard: ClipboardWorker,
    copied: HashMap<usize, Instant>,
    collapsed: HashSet<usize>,
    open_faq: Option<usize>,
    confetti: Option<Confetti>,
}

impl GuideController {
    pub fn new(
        settings: Settings,
        document: GuideDocument,
        store: Box<dyn KeyValueStore>,
        clipboard: Arc<dyn ClipboardWriter>,
    ) -> Self {
        let index = SearchIndex::build(&document);
        let steps = StepTracker::load(store, document.step_ids());
        let scroll = ScrollTracker::new(&settings);
        let notifier = Notifier::new(settings.toast_duration());

        Self {
            settings,
            document,
            index,
            query: String::new(),
            outcome: QueryOutcome::Inactive,
            focus_search: false,
            menu_open: false,
            steps,
            scroll,
            anchors: Vec::new(),
            active_section: None,
            pending_scroll: None,
            notifier,
            clipboard: ClipboardWorker::new(clipboard),
            copied: HashMap::new(),
            collapsed: HashSet::new(),
            open_faq: None,
            confetti: None,
        }
    }

    pub fn dispatch(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::QueryChanged(query) => {
                self.outcome = self.index.search(&query);
                self.query = query;
            }
            UiEvent::FocusSearch => self.focus_search = true,
            UiEvent::Escape => {
                self.menu_open = false;
                self.close_search();
            }
            UiEvent::NavigateTo(id) => {
                if !self.document.has_section(&id) {
                    log::debug!("Ignoring navigation to unknown section '{}'", id);
                    return;
                }
                self.menu_open = false;
                self.close_search();
                self.active_section = Some(id.clone());
                self.pending_scroll = Some(ScrollTarget::Section(id));
            }
            UiEvent::BackToTop => self.pending_scroll = Some(ScrollTarget::Top),
            UiEvent::ToggleMenu => self.menu_open = !self.menu_open,
            UiEvent::CloseMenu => self.menu_open = false,
            UiEvent::ToggleStep(id) => self.toggle_step(&id, now),
            UiEvent::CopyCode(index) => match self.document.code_block(index) {
                Some(block) => self.clipboard.copy(index, block.code.clone()),
                None => log::warn!("No code block {} to copy", index),
            },
            UiEvent::ToggleCodeCollapse(index) => {
                if !self.collapsed.remove(&index) {
                    self.collapsed.insert(index);
                }
            }
            UiEvent::ToggleFaq(index) => {
                self.open_faq = if self.open_faq == Some(index) { None } else { Some(index) };
            }
            UiEvent::Scrolled(metrics) => {
                self.scroll.update(metrics);
                self.update_active_section();
            }
            UiEvent::SectionLayout(anchors) => {
                self.anchors = anchors;
                self.update_active_section();
            }
        }
    }

    /// Drains finished background work and expires timed state.
    pub fn poll(&mut self, now: Instant) {
        while let Some(CopyResult { block, result }) = self.clipboard.try_recv() {
            match result {
                Ok(()) => {
                    self.copied.insert(block, now);
                    self.notifier.show("Copied to clipboard!", ToastKind::Success, now);
                }
                Err(e) => {
                    log::error!("Failed to copy: {}", e);
                    self.notifier
                        .show("Failed to copy. Please try manually.", ToastKind::Error, now);
                }
            }
        }

        let label_duration = self.settings.copied_label_duration();
        self.copied
            .retain(|_, at| now.saturating_duration_since(*at) < label_duration);

        if self.confetti.as_ref().is_some_and(|c| c.is_finished(now)) {
            self.confetti = None;
        }
    }

    /// Swaps in a freshly loaded guide.
    pub fn reload(&mut self, document: GuideDocument) {
        self.index = SearchIndex::build(&document);
        self.outcome = self.index.search(&self.query);
        self.steps.set_steps(document.step_ids());
        self.document = document;

        self.anchors.clear();
        self.collapsed.clear();
        self.copied.clear();
        self.open_faq = None;
        if let Some(id) = &self.active_section {
            if !self.document.has_section(id) {
                self.active_section = None;
            }
        }
        log::info!("Guide reloaded: {} searchable sections", self.index.len());
    }

    pub fn notify(&mut self, message: &str, kind: ToastKind, now: Instant) {
        self.notifier.show(message, kind, now);
    }

    fn close_search(&mut self) {
        self.query.clear();
        self.outcome = QueryOutcome::Inactive;
    }

    fn toggle_step(&mut self, id: &str, now: Instant) {
        let outcome = self.steps.toggle(id);
        log::info!("Step '{}' -> {}: {}", id, outcome.completed, self.steps.stats_label());

        if outcome.completed {
            self.notifier.show("Step completed! 🎉", ToastKind::Success, now);
        }
        if outcome.celebrate {
            self.confetti = Some(Confetti::launch(&mut rand::rng(), now));
            self.notifier
                .show("All steps completed! Great job! 🎊", ToastKind::Success, now);
        }
    }

    fn update_active_section(&mut self) {
        if self.anchors.is_empty() {
            return;
        }
        let active =
            active_section(&self.anchors, self.scroll.offset(), self.settings.toc_nav_margin);
        if self.active_section.as_deref() != active {
            self.active_section = active.map(str::to_string);
        }
    }

    pub fn document(&self) -> &GuideDocument {
        &self.document
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self) -> &QueryOutcome {
        &self.outcome
    }

    pub fn results_visible(&self) -> bool {
        self.outcome.is_active()
    }

    /// True once after a focus request.
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_search)
    }

    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn steps(&self) -> &StepTracker {
        &self.steps
    }

    pub fn scroll(&self) -> &ScrollTracker {
        &self.scroll
    }

    pub fn active_section(&self) -> Option<&str> {
        self.active_section.as_deref()
    }

    pub fn take_pending_scroll(&mut self) -> Option<ScrollTarget> {
        self.pending_scroll.take()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn copy_label(&self, index: usize) -> &'static str {
        if self.copied.contains_key(&index) {
            "Copied!"
        } else {
            "Copy"
        }
    }

    pub fn is_collapsed(&self, index: usize) -> bool {
        self.collapsed.contains(&index)
    }

    pub fn is_faq_open(&self, index: usize) -> bool {
        self.open_faq == Some(index)
    }

    pub fn confetti(&self) -> Option<&Confetti> {
        self.confetti.as_ref()
    }

    pub fn reading_time_minutes(&self) -> usize {
        self.document.reading_time_minutes(self.settings.words_per_minute)
    }

    /// Whether timed state needs another frame soon.
    pub fn is_animating(&self, now: Instant) -> bool {
        self.confetti.is_some() || !self.copied.is_empty() || self.notifier.active(now).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClipboardError;
    use crate::storage::MemoryStore;
    use std::time::Duration;

    const GUIDE: &str = r#"# Guide

## Install {#install}

Install Docker first.

### Get Docker {#docker .step}

```bash
curl -fsSL https://get.docker.com | sh
```

### Get Coolify {#coolify .step}

## Configure {#config}

Edit odoo.conf file.

### Write config {#write-config .step}

## FAQ {#faq}

### Free? {.faq}

Yes.

### Stable URL? {.faq}

Use a static domain.
"#;

    struct OkClipboard;

    impl ClipboardWriter for OkClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    struct DeniedClipboard;

    impl ClipboardWriter for DeniedClipboard {
        fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::Rejected("permission denied".into()))
        }
    }

    fn controller_with(clipboard: Arc<dyn ClipboardWriter>) -> GuideController {
        GuideController::new(
            Settings::default(),
            GuideDocument::parse(GUIDE),
            Box::new(MemoryStore::new()),
            clipboard,
        )
    }

    fn controller() -> GuideController {
        controller_with(Arc::new(OkClipboard))
    }

    fn poll_until_toast(controller: &mut GuideController) -> Instant {
        for _ in 0..500 {
            let now = Instant::now();
            controller.poll(now);
            if controller.notifier().active(now).is_some() {
                return now;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("clipboard result never arrived");
    }

    #[test]
    fn query_changes_drive_results() {
        let mut c = controller();
        let now = Instant::now();

        c.dispatch(UiEvent::QueryChanged("d".into()), now);
        assert!(!c.results_visible());

        c.dispatch(UiEvent::QueryChanged("docker".into()), now);
        assert!(c.results_visible());
        let ids: Vec<_> = c.outcome().matches().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["install"]);

        c.dispatch(UiEvent::QueryChanged("zzz".into()), now);
        assert!(c.outcome().is_no_results());
    }

    #[test]
    fn escape_closes_menu_and_search() {
        let mut c = controller();
        let now = Instant::now();
        c.dispatch(UiEvent::ToggleMenu, now);
        c.dispatch(UiEvent::QueryChanged("odoo".into()), now);

        c.dispatch(UiEvent::Escape, now);
        assert!(!c.menu_open());
        assert!(!c.results_visible());
        assert_eq!(c.query(), "");
    }

    #[test]
    fn navigation_requests_scroll_and_closes_overlays() {
        let mut c = controller();
        let now = Instant::now();
        c.dispatch(UiEvent::ToggleMenu, now);
        c.dispatch(UiEvent::QueryChanged("config".into()), now);

        c.dispatch(UiEvent::NavigateTo("config".into()), now);
        assert_eq!(c.active_section(), Some("config"));
        assert!(!c.menu_open());
        assert!(!c.results_visible());
        assert_eq!(c.take_pending_scroll(), Some(ScrollTarget::Section("config".into())));
        assert_eq!(c.take_pending_scroll(), None);

        c.dispatch(UiEvent::NavigateTo("missing".into()), now);
        assert_eq!(c.take_pending_scroll(), None);
    }

    #[test]
    fn back_to_top_requests_a_scroll_to_the_top() {
        let mut c = controller();
        c.dispatch(UiEvent::BackToTop, Instant::now());

        assert_eq!(c.take_pending_scroll(), Some(ScrollTarget::Top));
        assert_eq!(c.take_pending_scroll(), None);
    }

    #[test]
    fn menu_toggles_and_closes() {
        let mut c = controller();
        let now = Instant::now();

        c.dispatch(UiEvent::ToggleMenu, now);
        assert!(c.menu_open());
        c.dispatch(UiEvent::CloseMenu, now);
        assert!(!c.menu_open());

        c.dispatch(UiEvent::CloseMenu, now);
        assert!(!c.menu_open());
    }

    #[test]
    fn focus_request_is_consumed_once() {
        let mut c = controller();
        c.dispatch(UiEvent::FocusSearch, Instant::now());
        assert!(c.take_focus_request());
        assert!(!c.take_focus_request());
    }

    #[test]
    fn completing_all_steps_celebrates_once() {
        let mut c = controller();
        let now = Instant::now();

        c.dispatch(UiEvent::ToggleStep("docker".into()), now);
        assert_eq!(c.notifier().active(now).unwrap().message, "Step completed! 🎉");
        c.dispatch(UiEvent::ToggleStep("coolify".into()), now);
        assert!(c.confetti().is_none());
        assert!((c.steps().ratio() - 2.0 / 3.0).abs() < 1e-6);

        c.dispatch(UiEvent::ToggleStep("write-config".into()), now);
        assert!(c.confetti().is_some());
        assert_eq!(
            c.notifier().active(now).unwrap().message,
            "All steps completed! Great job! 🎊"
        );

        c.poll(now + Duration::from_secs(5));
        assert!(c.confetti().is_none());
    }

    #[test]
    fn faq_accordion_keeps_one_open() {
        let mut c = controller();
        let now = Instant::now();

        c.dispatch(UiEvent::ToggleFaq(0), now);
        c.dispatch(UiEvent::ToggleFaq(1), now);
        assert!(!c.is_faq_open(0));
        assert!(c.is_faq_open(1));

        c.dispatch(UiEvent::ToggleFaq(1), now);
        assert!(!c.is_faq_open(1));
    }

    #[test]
    fn code_blocks_collapse_independently() {
        let mut c = controller();
        let now = Instant::now();
        c.dispatch(UiEvent::ToggleCodeCollapse(0), now);
        assert!(c.is_collapsed(0));
        c.dispatch(UiEvent::ToggleCodeCollapse(0), now);
        assert!(!c.is_collapsed(0));
    }

    #[test]
    fn successful_copy_swaps_label_then_restores_it() {
        let mut c = controller();
        c.dispatch(UiEvent::CopyCode(0), Instant::now());

        let shown = poll_until_toast(&mut c);
        assert_eq!(c.notifier().active(shown).unwrap().message, "Copied to clipboard!");
        assert_eq!(c.copy_label(0), "Copied!");

        c.poll(shown + Duration::from_secs(2));
        assert_eq!(c.copy_label(0), "Copy");
    }

    #[test]
    fn failed_copy_shows_error_toast() {
        let mut c = controller_with(Arc::new(DeniedClipboard));
        c.dispatch(UiEvent::CopyCode(0), Instant::now());

        let shown = poll_until_toast(&mut c);
        let toast = c.notifier().active(shown).unwrap();
        assert_eq!(toast.message, "Failed to copy. Please try manually.");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(c.copy_label(0), "Copy");
    }

    #[test]
    fn scrolling_tracks_progress_and_active_section() {
        let mut c = controller();
        let now = Instant::now();
        c.dispatch(
            UiEvent::SectionLayout(vec![("install".into(), 0.0), ("config".into(), 900.0)]),
            now,
        );
        c.dispatch(
            UiEvent::Scrolled(ScrollMetrics {
                offset: 850.0,
                content_height: 2700.0,
                viewport_height: 1000.0,
            }),
            now,
        );

        assert_eq!(c.scroll().percent(), 50.0);
        assert_eq!(c.scroll().window_title(), "Odoo Guide (50%)");
        assert_eq!(c.active_section(), Some("config"));
    }

    #[test]
    fn reload_reindexes_and_keeps_query() {
        let mut c = controller();
        let now = Instant::now();
        c.dispatch(UiEvent::QueryChanged("kubernetes".into()), now);
        assert!(c.outcome().is_no_results());

        c.reload(GuideDocument::parse(
            "## Cluster {#cluster}\n\nRun it on Kubernetes.\n\n### Apply {#apply .step}\n",
        ));
        let ids: Vec<_> = c.outcome().matches().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["cluster"]);
        assert_eq!(c.steps().total(), 1);
    }
}
