use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult, Debouncer, RecommendedCache};

use crate::error::GuideError;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Watches a guide file and signals when it changed on disk.
///
/// The parent directory is watched rather than the file itself, since
/// editors commonly save by replacing the file.
pub struct GuideWatcher {
    _debouncer: Debouncer<RecommendedWatcher, RecommendedCache>,
    rx: mpsc::Receiver<()>,
}

impl GuideWatcher {
    pub fn spawn(path: &Path) -> Result<Self, GuideError> {
        let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let parent = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(DEBOUNCE, None, move |result: DebounceEventResult| {
            match result {
                Ok(events) => {
                    let touched = events
                        .iter()
                        .any(|event| event.paths.iter().any(|p| same_file(p, &target)));
                    if touched {
                        let _ = tx.send(());
                    }
                }
                Err(errors) => {
                    for e in errors {
                        log::warn!("Guide watcher error: {}", e);
                    }
                }
            }
        })?;
        debouncer.watch(&parent, RecursiveMode::NonRecursive)?;

        log::info!("Watching {} for changes", path.display());
        Ok(Self {
            _debouncer: debouncer,
            rx,
        })
    }

    /// True if the file changed since the last call.
    pub fn changed(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}

fn same_file(candidate: &Path, target: &Path) -> bool {
    candidate == target
        || (candidate.file_name() == target.file_name() && candidate.ends_with(target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;

    #[test]
    fn matches_relative_and_absolute_forms() {
        assert!(same_file(Path::new("/home/u/guide.md"), Path::new("/home/u/guide.md")));
        assert!(same_file(Path::new("/home/u/guide.md"), Path::new("u/guide.md")));
        assert!(!same_file(Path::new("/home/u/other.md"), Path::new("/home/u/guide.md")));
    }

    #[test]
    fn reports_writes_to_the_guide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guide.md");
        fs::write(&path, "# One\n").unwrap();

        let watcher = GuideWatcher::spawn(&path).unwrap();
        std::thread::sleep(Duration::from_millis(200));
        fs::write(&path, "# Two\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut seen = false;
        while Instant::now() < deadline && !seen {
            seen = watcher.changed();
            std::thread::sleep(Duration::from_millis(50));
        }
        assert!(seen);
    }
}
