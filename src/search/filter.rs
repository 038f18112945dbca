//! Literal, case-insensitive filtering of indexed sections.
//!
//! The query is matched as plain text: characters such as `.` or `(` only
//! ever match themselves, in both the filter and the highlighter.

use regex::{Regex, RegexBuilder};

use super::indexer::SectionRecord;

/// Queries shorter than this (after normalization) do not search.
pub const MIN_QUERY_CHARS: usize = 2;
/// Body characters shown under each result title.
pub const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Query too short; any displayed results should be cleared.
    Inactive,
    /// Matches in document order. Empty means "no results".
    Results(Vec<SearchMatch>),
}

impl QueryOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, QueryOutcome::Results(_))
    }

    pub fn matches(&self) -> &[SearchMatch] {
        match self {
            QueryOutcome::Inactive => &[],
            QueryOutcome::Results(matches) => matches,
        }
    }

    pub fn is_no_results(&self) -> bool {
        matches!(self, QueryOutcome::Results(matches) if matches.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub id: String,
    pub title: Highlighted,
    pub excerpt: Highlighted,
    /// The body continues past the excerpt.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub marked: bool,
}

/// Text split into plain and emphasized runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlighted {
    pub spans: Vec<Span>,
}

impl Highlighted {
    pub fn plain(text: &str) -> Self {
        let mut highlighted = Self::default();
        highlighted.push(text, false);
        highlighted
    }

    fn push(&mut self, text: &str, marked: bool) {
        if !text.is_empty() {
            self.spans.push(Span {
                text: text.to_string(),
                marked,
            });
        }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn marked(&self) -> Vec<&str> {
        self.spans.iter().filter(|s| s.marked).map(|s| s.text.as_str()).collect()
    }

    /// Renders with `open`/`close` around each emphasized run.
    pub fn render(&self, open: &str, close: &str) -> String {
        let mut out = String::new();
        for span in &self.spans {
            if span.marked {
                out.push_str(open);
                out.push_str(&span.text);
                out.push_str(close);
            } else {
                out.push_str(&span.text);
            }
        }
        out
    }
}

pub fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn filter(records: &[SectionRecord], query: &str) -> QueryOutcome {
    let query = normalize(query);
    if query.chars().count() < MIN_QUERY_CHARS {
        return QueryOutcome::Inactive;
    }

    let matcher = literal_matcher(&query);
    let matches = records
        .iter()
        .filter(|record| {
            record.title.to_lowercase().contains(&query)
                || record.body.to_lowercase().contains(&query)
        })
        .map(|record| {
            let excerpt: String = record.body.chars().take(EXCERPT_CHARS).collect();
            SearchMatch {
                id: record.id.clone(),
                title: highlight(&record.title, matcher.as_ref()),
                excerpt: highlight(&excerpt, matcher.as_ref()),
                truncated: record.body.chars().nth(EXCERPT_CHARS).is_some(),
            }
        })
        .collect();

    QueryOutcome::Results(matches)
}

fn literal_matcher(query: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(query)).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::warn!("Cannot highlight query '{}': {}", query, e);
            None
        }
    }
}

pub fn highlight(text: &str, matcher: Option<&Regex>) -> Highlighted {
    let Some(matcher) = matcher else {
        return Highlighted::plain(text);
    };

    let mut highlighted = Highlighted::default();
    let mut last = 0;
    for found in matcher.find_iter(text) {
        highlighted.push(&text[last..found.start()], false);
        highlighted.push(found.as_str(), true);
        last = found.end();
    }
    highlighted.push(&text[last..], false);
    highlighted
}
