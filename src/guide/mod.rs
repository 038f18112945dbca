pub mod document;

use std::fs;
use std::path::Path;

pub use document::{Block, CodeBlock, FaqItem, GuideDocument, Section, Step};

use crate::error::GuideError;

/// The guide shipped with the binary.
pub const BUILTIN_GUIDE: &str = include_str!("../../guide/odoo-docker-guide.md");

pub fn builtin() -> GuideDocument {
    GuideDocument::parse(BUILTIN_GUIDE)
}

pub fn load_file(path: &Path) -> Result<GuideDocument, GuideError> {
    let markdown = fs::read_to_string(path).map_err(|source| GuideError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(GuideDocument::parse(&markdown))
}

/// Loads the override at `path` if given, otherwise the built-in guide.
pub fn load(path: Option<&Path>) -> GuideDocument {
    match path {
        Some(path) => match load_file(path) {
            Ok(doc) => {
                log::info!("Loaded guide from {}", path.display());
                doc
            }
            Err(e) => {
                log::error!("{}; falling back to the built-in guide", e);
                builtin()
            }
        },
        None => builtin(),
    }
}
