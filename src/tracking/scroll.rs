use crate::config::Settings;

pub const BASE_TITLE: &str = "Odoo Community Docker Guide | Coolify + ngrok";
pub const SHORT_TITLE: &str = "Odoo Guide";

/// Geometry of the guide scroll area, in points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub offset: f32,
    pub content_height: f32,
    pub viewport_height: f32,
}

/// Scroll completion in [0, 100]; 0 when nothing can scroll.
pub fn scroll_percent(metrics: ScrollMetrics) -> f32 {
    let range = metrics.content_height - metrics.viewport_height;
    if !range.is_finite() || range <= 0.0 || !metrics.offset.is_finite() {
        return 0.0;
    }
    (metrics.offset / range * 100.0).clamp(0.0, 100.0)
}

/// Section whose top has been scrolled past, allowing for the nav margin.
/// `anchors` holds (id, top) pairs in document order.
pub fn active_section(anchors: &[(String, f32)], offset: f32, nav_margin: f32) -> Option<&str> {
    anchors
        .iter()
        .filter(|(_, top)| offset >= top - nav_margin)
        .map(|(id, _)| id.as_str())
        .last()
}

#[derive(Debug, Clone)]
pub struct ScrollTracker {
    metrics: ScrollMetrics,
    percent: f32,
    title_threshold: f32,
    elevation_offset: f32,
    back_to_top_offset: f32,
}

impl ScrollTracker {
    pub fn new(settings: &Settings) -> Self {
        Self {
            metrics: ScrollMetrics::default(),
            percent: 0.0,
            title_threshold: settings.title_progress_threshold,
            elevation_offset: settings.nav_elevation_offset,
            back_to_top_offset: settings.back_to_top_offset,
        }
    }

    /// Returns the new percent.
    pub fn update(&mut self, metrics: ScrollMetrics) -> f32 {
        self.metrics = metrics;
        self.percent = scroll_percent(metrics);
        self.percent
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn offset(&self) -> f32 {
        self.metrics.offset
    }

    pub fn window_title(&self) -> String {
        if self.percent > self.title_threshold {
            format!("{} ({}%)", SHORT_TITLE, self.percent.round() as u32)
        } else {
            BASE_TITLE.to_string()
        }
    }

    pub fn nav_elevated(&self) -> bool {
        self.metrics.offset > self.elevation_offset
    }

    pub fn back_to_top_visible(&self) -> bool {
        self.metrics.offset > self.back_to_top_offset
    }
}
