pub mod scroll;
pub mod steps;

pub use scroll::{active_section, scroll_percent, ScrollMetrics, ScrollTracker};
pub use steps::{StepTracker, ToggleOutcome};
