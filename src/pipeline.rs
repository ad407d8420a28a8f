use crate::config::Config;
use crate::engine::recency::sort_newest_first;
use crate::engine::{consolidate_editions, filter_books, FilterCounts};
use crate::feed::types::Book;
use crate::feed::BookFeed;
use crate::render::{render_page, RenderOptions};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Counts reported after a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub rejected: FilterCounts,
    /// Books left after filtering, before edition consolidation.
    pub filtered: usize,
    /// Entries written to the page.
    pub included: usize,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn merged(&self) -> usize {
        self.filtered - self.included
    }
}

/// Filter/dedupe, consolidate and order the fetched books for rendering.
pub fn prepare_books(books: Vec<Book>, config: &Config) -> (Vec<Book>, FilterCounts, usize) {
    let outcome = filter_books(books, &config.filter);
    let filtered = outcome.books.len();
    tracing::info!(
        kept = filtered,
        language = outcome.rejected.language,
        excluded_title = outcome.rejected.excluded_title,
        duplicate_title = outcome.rejected.duplicate_title,
        "filtered books"
    );

    let mut books = if config.dedupe.enabled {
        consolidate_editions(outcome.books, &config.dedupe)
    } else {
        outcome.books
    };
    sort_newest_first(&mut books);
    (books, outcome.rejected, filtered)
}

/// Fetch → parse → filter/dedupe → consolidate → sort → render → write.
///
/// Returns `Ok(None)` without touching the output file when the feed yields no
/// books at all. Any fetch, parse or write failure aborts the run.
pub async fn run<F: BookFeed + ?Sized>(
    feed: &mut F,
    config: &Config,
    today: NaiveDate,
) -> Result<Option<RunSummary>> {
    let books = feed
        .fetch_books()
        .await
        .with_context(|| format!("failed to load books from {}", feed.describe()))?;
    let fetched = books.len();
    tracing::info!(fetched, "found books");

    if books.is_empty() {
        tracing::warn!(source = %feed.describe(), "no books found, nothing written");
        return Ok(None);
    }

    let (books, rejected, filtered) = prepare_books(books, config);

    let html = render_page(&books, &RenderOptions::from(&config.output), today);
    let output = config.output.path.clone();
    std::fs::write(&output, html)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;
    tracing::info!(path = %output.display(), included = books.len(), "wrote page");

    Ok(Some(RunSummary {
        fetched,
        rejected,
        filtered,
        included: books.len(),
        output,
    }))
}
