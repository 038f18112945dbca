use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::error::StorageError;

/// A durable string slot per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Stores each key as `<base_path>/<key>.json`.
pub struct FileStore {
    pub base_path: PathBuf,
}

impl FileStore {
    pub fn new(base_path: PathBuf) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let file_path = self.path_for(key);

        let mut temp_file = NamedTempFile::new_in(&self.base_path)?;
        temp_file.write_all(value.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&file_path)?;

        log::debug!("Wrote {} ({} bytes)", file_path.display(), value.len());
        Ok(())
    }
}

/// Process-lifetime store, used when no data directory is writable.
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Opens the file store under `base_path`, falling back to memory.
pub fn open_store(base_path: PathBuf) -> Box<dyn KeyValueStore> {
    match FileStore::new(base_path.clone()) {
        Ok(store) => {
            log::info!("Progress stored in {}", base_path.display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!(
                "Cannot use {} for progress ({}), keeping it in memory",
                base_path.display(),
                e
            );
            Box::new(MemoryStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_reads_back_what_it_wrote() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data")).unwrap();

        assert_eq!(store.get("odooGuideProgress").unwrap(), None);

        store.set("odooGuideProgress", r#"{"install":true}"#).unwrap();
        store.set("odooGuideProgress", r#"{"install":false}"#).unwrap();

        assert_eq!(
            store.get("odooGuideProgress").unwrap().as_deref(),
            Some(r#"{"install":false}"#)
        );
        assert!(dir.path().join("data").join("odooGuideProgress.json").exists());
    }

    #[test]
    fn keys_cannot_escape_the_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().to_path_buf()).unwrap();

        store.set("../evil", "x").unwrap();
        assert!(dir.path().join("___evil.json").exists());
    }

    #[test]
    fn open_store_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let mut store = open_store(blocker.join("nested"));
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
