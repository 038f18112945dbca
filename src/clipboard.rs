use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ClipboardError;

pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard. On X11 the copied text is only served while a
/// handle is alive, so one handle is opened on first use and kept.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let mut clipboard = match handle.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };

        // A handle that failed a write is dropped and reopened on the next copy.
        clipboard.set_text(text.to_owned())?;
        *handle = Some(clipboard);
        Ok(())
    }
}

#[derive(Debug)]
pub struct CopyResult {
    /// Code block the text came from.
    pub block: usize,
    pub result: Result<(), ClipboardError>,
}

/// Runs clipboard writes off the UI thread and hands results back.
pub struct ClipboardWorker {
    writer: Arc<dyn ClipboardWriter>,
    tx: mpsc::Sender<CopyResult>,
    rx: mpsc::Receiver<CopyResult>,
}

impl ClipboardWorker {
    pub fn new(writer: Arc<dyn ClipboardWriter>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { writer, tx, rx }
    }

    pub fn copy(&self, block: usize, text: String) {
        let writer = Arc::clone(&self.writer);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = writer.write_text(&text);
            let _ = tx.send(CopyResult { block, result });
        });
    }

    pub fn try_recv(&self) -> Option<CopyResult> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    impl ClipboardWriter for Recording {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn copy_reports_back_on_the_channel() {
        let writer = Arc::new(Recording::default());
        let worker = ClipboardWorker::new(writer.clone());

        worker.copy(3, "docker compose up -d".to_string());
        let result = worker.rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(result.block, 3);
        assert!(result.result.is_ok());
        assert_eq!(*writer.0.lock().unwrap(), vec!["docker compose up -d".to_string()]);
    }

    #[test]
    fn system_clipboard_holds_its_handle_after_a_successful_write() {
        let clipboard = SystemClipboard::new();
        assert!(clipboard.handle.lock().unwrap().is_none());

        // Headless runs have no clipboard; either way the handle must match the outcome.
        let result = clipboard.write_text("docker compose ps");
        let held = clipboard.handle.lock().unwrap().is_some();
        assert_eq!(result.is_ok(), held);
    }
}
