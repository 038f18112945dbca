pub mod file_ops;

pub use file_ops::{open_store, FileStore, KeyValueStore, MemoryStore};
