use std::collections::BTreeMap;

use crate::storage::KeyValueStore;

pub const PROGRESS_KEY: &str = "odooGuideProgress";

pub type StepCompletionMap = BTreeMap<String, bool>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleOutcome {
    pub completed: bool,
    pub ratio: f32,
    /// Set once per transition into full completion.
    pub celebrate: bool,
}

/// Completion flags for the rendered steps, persisted under one key.
pub struct StepTracker {
    store: Box<dyn KeyValueStore>,
    steps: Vec<String>,
    map: StepCompletionMap,
    celebrated: bool,
}

impl StepTracker {
    pub fn load(store: Box<dyn KeyValueStore>, steps: Vec<String>) -> Self {
        let map = read_map(store.as_ref());
        let mut tracker = Self {
            store,
            steps,
            map,
            celebrated: false,
        };
        tracker.celebrated = tracker.all_completed();
        log::info!("{}", tracker.stats_label());
        tracker
    }

    pub fn map(&self) -> &StepCompletionMap {
        &self.map
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.map.get(step_id).copied().unwrap_or(false)
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn completed(&self) -> usize {
        self.steps.iter().filter(|id| self.is_completed(id)).count()
    }

    pub fn ratio(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => self.completed() as f32 / total as f32,
        }
    }

    pub fn stats_label(&self) -> String {
        format!(
            "{}/{} steps completed ({}%)",
            self.completed(),
            self.total(),
            (self.ratio() * 100.0).round() as u32
        )
    }

    pub fn toggle(&mut self, step_id: &str) -> ToggleOutcome {
        let completed = !self.is_completed(step_id);
        self.map.insert(step_id.to_string(), completed);
        self.persist();

        let done = self.all_completed();
        let celebrate = done && !self.celebrated;
        self.celebrated = done;

        ToggleOutcome {
            completed,
            ratio: self.ratio(),
            celebrate,
        }
    }

    /// Swaps the rendered step set, keeping stored flags for every id.
    pub fn set_steps(&mut self, steps: Vec<String>) {
        self.steps = steps;
        self.celebrated = self.all_completed();
    }

    fn all_completed(&self) -> bool {
        self.total() > 0 && self.completed() == self.total()
    }

    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.map) {
            Ok(serialized) => serialized,
            Err(e) => {
                log::error!("Failed to serialize step progress: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(PROGRESS_KEY, &serialized) {
            log::error!("Failed to save step progress: {}", e);
        }
    }
}

fn read_map(store: &dyn KeyValueStore) -> StepCompletionMap {
    let raw = match store.get(PROGRESS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return StepCompletionMap::new(),
        Err(e) => {
            log::warn!("Failed to read step progress: {}", e);
            return StepCompletionMap::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            log::warn!("Discarding unreadable step progress: {}", e);
            StepCompletionMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    fn steps(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn store_with(raw: &str) -> Box<dyn KeyValueStore> {
        let mut store = MemoryStore::new();
        store.set(PROGRESS_KEY, raw).unwrap();
        Box::new(store)
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    #[test]
    fn missing_or_corrupt_storage_starts_empty() {
        let tracker = StepTracker::load(Box::new(MemoryStore::new()), steps(&["a"]));
        assert!(tracker.map().is_empty());

        let tracker = StepTracker::load(store_with("[not a map"), steps(&["a"]));
        assert!(tracker.map().is_empty());

        let tracker = StepTracker::load(Box::new(BrokenStore), steps(&["a"]));
        assert!(tracker.map().is_empty());
    }

    #[test]
    fn loads_saved_flags_and_tolerates_stale_keys() {
        let tracker = StepTracker::load(
            store_with(r#"{"install":true,"removed-step":true,"config":false}"#),
            steps(&["install", "config"]),
        );

        assert!(tracker.is_completed("install"));
        assert!(!tracker.is_completed("config"));
        assert_eq!(tracker.completed(), 1);
        assert_eq!(tracker.ratio(), 0.5);
        assert!(tracker.map().contains_key("removed-step"));
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut tracker = StepTracker::load(store_with(r#"{"a":true}"#), steps(&["a", "b"]));
        let before = (tracker.is_completed("b"), tracker.ratio());

        tracker.toggle("b");
        let outcome = tracker.toggle("b");

        assert_eq!((tracker.is_completed("b"), tracker.ratio()), before);
        assert!(!outcome.completed);
        assert_eq!(outcome.ratio, 0.5);
    }

    #[test]
    fn celebrates_once_per_transition_to_complete() {
        let mut tracker =
            StepTracker::load(Box::new(MemoryStore::new()), steps(&["install", "config", "run"]));

        let first = tracker.toggle("install");
        let second = tracker.toggle("config");
        assert!(!first.celebrate && !second.celebrate);
        assert!((second.ratio - 2.0 / 3.0).abs() < 1e-6);

        let third = tracker.toggle("run");
        assert_eq!(third.ratio, 1.0);
        assert!(third.celebrate);

        // Toggling a step outside the rendered set leaves the ratio at 1.0.
        assert!(!tracker.toggle("stale").celebrate);

        assert!(!tracker.toggle("run").celebrate);
        assert!(tracker.toggle("run").celebrate);
    }

    #[test]
    fn complete_on_load_does_not_celebrate_again() {
        let mut tracker = StepTracker::load(store_with(r#"{"a":true}"#), steps(&["a"]));
        assert_eq!(tracker.ratio(), 1.0);

        assert!(!tracker.toggle("a").celebrate);
        assert!(tracker.toggle("a").celebrate);
    }

    #[test]
    fn no_steps_means_no_celebration() {
        let mut tracker = StepTracker::load(Box::new(MemoryStore::new()), Vec::new());
        assert_eq!(tracker.ratio(), 0.0);
        assert!(!tracker.toggle("ghost").celebrate);
        assert_eq!(tracker.stats_label(), "0/0 steps completed (0%)");
    }

    #[test]
    fn every_toggle_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        let store = crate::storage::FileStore::new(path.clone()).unwrap();
        let mut tracker = StepTracker::load(Box::new(store), steps(&["a", "b"]));

        tracker.toggle("a");
        tracker.toggle("b");
        tracker.toggle("b");

        let store = crate::storage::FileStore::new(path).unwrap();
        let reloaded = StepTracker::load(Box::new(store), steps(&["a", "b"]));
        assert_eq!(
            reloaded.map(),
            &StepCompletionMap::from([("a".to_string(), true), ("b".to_string(), false)])
        );
        assert_eq!(reloaded.stats_label(), "1/2 steps completed (50%)");
    }

    #[test]
    fn failed_save_keeps_the_toggle() {
        let mut tracker = StepTracker::load(Box::new(BrokenStore), steps(&["a"]));
        let outcome = tracker.toggle("a");
        assert!(outcome.completed);
        assert!(tracker.is_completed("a"));
    }

    #[test]
    fn replacing_steps_rearms_celebration() {
        let mut tracker = StepTracker::load(store_with(r#"{"a":true}"#), steps(&["a", "b"]));
        tracker.set_steps(steps(&["a"]));
        assert_eq!(tracker.ratio(), 1.0);
        assert!(!tracker.toggle("a").celebrate);
    }
}
