pub mod dedupe;
pub mod filter;
pub mod recency;
pub mod similarity;

pub use dedupe::{consolidate_editions, PairClass};
pub use filter::{filter_books, FilterCounts, FilterOutcome};
