//! Parser for feeds served as a PHP `print_r` dump of Google Books volumes.
//!
//! The listing starts at an `[items] => Array` marker; each top-level book is a
//! `[N] => stdClass Object (` block indented by exactly twelve spaces.

use super::types::{non_empty, Book, DEFAULT_TITLE};
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

pub const ITEMS_MARKER: &str = "[items] => Array";

static BOOK_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n {12}\[\d+\] => stdClass Object\s*\(").unwrap()
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[title\] => ([^\n]+)").unwrap());
static AUTHORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[authors\] => Array\s*\((.*?)\)").unwrap());
static AUTHOR_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\d+\] => ([^\n]+)").unwrap());
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[description\] => (.*?)\n\s*\[industryIdentifiers\]").unwrap()
});
static THUMBNAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[thumbnail\] => (http[^\n]+)").unwrap());
static LANGUAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[language\] => ([^\n]+)").unwrap());
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[publishedDate\] => ([^\n]+)").unwrap());
static ISBN13_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[type\] => ISBN_13\s+\[identifier\] => ([^\n]+)").unwrap()
});
static INFO_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[infoLink\] => (http[^\n]+)").unwrap());

pub fn is_text_dump(content: &str) -> bool {
    content.contains(ITEMS_MARKER)
}

pub fn parse(content: &str) -> Result<Vec<Book>> {
    let Some(items_start) = content.find(ITEMS_MARKER) else {
        anyhow::bail!("could not find {:?} in feed", ITEMS_MARKER);
    };
    let items = &content[items_start..];

    let starts: Vec<usize> = BOOK_START_RE.find_iter(items).map(|m| m.start()).collect();
    let books: Vec<Book> = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(items.len());
            parse_block(&items[start..end])
        })
        .collect();

    tracing::debug!(items = books.len(), "parsed text dump");
    Ok(books)
}

fn parse_block(block: &str) -> Book {
    let authors: Vec<String> = AUTHORS_RE
        .captures(block)
        .map(|caps| {
            AUTHOR_ENTRY_RE
                .captures_iter(&caps[1])
                .filter_map(|a| non_empty(&a[1]))
                .collect()
        })
        .unwrap_or_default();

    Book {
        title: capture(&TITLE_RE, block).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        authors,
        language: capture(&LANGUAGE_RE, block),
        description: capture(&DESCRIPTION_RE, block).unwrap_or_default(),
        link: capture(&INFO_LINK_RE, block),
        thumbnail: capture(&THUMBNAIL_RE, block),
        published_date: capture(&DATE_RE, block),
        isbn13: capture(&ISBN13_RE, block),
        editions: Vec::new(),
    }
}

fn capture(re: &Regex, block: &str) -> Option<String> {
    re.captures(block).and_then(|caps| non_empty(&caps[1]))
}
