pub mod confetti;
pub mod guide_view;
pub mod icon;
pub mod nav;
pub mod search_panel;
pub mod toast;

pub use search_panel::SearchPanel;
