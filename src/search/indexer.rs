use std::collections::HashSet;

use super::filter::{self, QueryOutcome};
use crate::guide::GuideDocument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl SectionRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Searchable sections of one loaded guide, in document order.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    records: Vec<SectionRecord>,
}

impl SearchIndex {
    pub fn build(doc: &GuideDocument) -> Self {
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for section in &doc.sections {
            let Some(id) = section.id.as_deref().filter(|id| !id.is_empty()) else {
                continue;
            };
            if !seen.insert(id.to_string()) {
                log::warn!("Section id '{}' appears more than once, indexing the first", id);
                continue;
            }
            records.push(SectionRecord::new(id, section.title(), section.visible_text()));
        }

        log::debug!("Indexed {} sections", records.len());
        Self { records }
    }

    pub fn records(&self) -> &[SectionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn search(&self, query: &str) -> QueryOutcome {
        filter::filter(&self.records, query)
    }
}
