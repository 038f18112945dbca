pub mod filter;
pub mod indexer;

pub use filter::{Highlighted, QueryOutcome, SearchMatch};
pub use indexer::{SearchIndex, SectionRecord};
