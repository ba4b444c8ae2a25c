//! Natural-language → structured-query translation
//!
//! Pattern matching over fixed vocabularies. The precedence rules
//! (first-match-wins, priority order) live in ordered tables so they can
//! be audited and tested independently.

pub mod aggregation;
pub mod collection;
pub mod filter;
pub mod translator;

pub use aggregation::AggregationIntent;
pub use collection::Collection;
pub use filter::{Condition, DocumentFilter};
pub use translator::translate;
