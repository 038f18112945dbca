use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "odoo-guide";
pub const SETTINGS_FILE: &str = "settings.json";

/// User-tunable settings, read from `<config_dir>/odoo-guide/settings.json`.
/// Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Markdown file shown instead of the built-in guide. Watched for changes.
    pub guide_path: Option<PathBuf>,
    pub toast_duration_ms: u64,
    pub copied_label_ms: u64,
    pub title_progress_threshold: f32,
    pub nav_elevation_offset: f32,
    pub back_to_top_offset: f32,
    pub toc_nav_margin: f32,
    pub words_per_minute: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            guide_path: None,
            toast_duration_ms: 3000,
            copied_label_ms: 2000,
            title_progress_threshold: 5.0,
            nav_elevation_offset: 50.0,
            back_to_top_offset: 500.0,
            toc_nav_margin: 100.0,
            words_per_minute: 200,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }

    pub fn copied_label_duration(&self) -> Duration {
        Duration::from_millis(self.copied_label_ms)
    }
}

pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(SETTINGS_FILE))
}

pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let json = r#"{ "toast_duration_ms": 1500, "guide_path": "/tmp/guide.md" }"#;
        fs::write(&path, json).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.toast_duration(), Duration::from_millis(1500));
        assert_eq!(settings.guide_path, Some(PathBuf::from("/tmp/guide.md")));
        assert_eq!(settings.words_per_minute, 200);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
