//! Static HTML page generation.

use crate::config::{OutputConfig, TITLE_PLACEHOLDER};
use crate::engine::recency::is_recent;
use crate::feed::types::Book;
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

/// Form-style query encoding: everything but ASCII alphanumerics and `_.-~`.
const QUERY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

const UNKNOWN_AUTHOR: &str = "Unknown Author";
const NO_DESCRIPTION: &str = "No description available.";

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Book Feed</title>
    <style>
        body { font-family: sans-serif; margin: 2em; }
        .book { border-bottom: 1px solid #ccc; padding: 1em 0; overflow: hidden; position: relative; }
        .book img { float: left; margin-right: 1em; max-width: 100px; }
        .book h2 { font-size: 1.2em; margin: 0 0 0.5em 0; }
        .book p { margin: 0.3em 0; }
        .clear { clear: both; }
        details { margin: 0.5em 0; font-size: 0.9em; }
        details summary { cursor: pointer; color: #666; }
        details ul { margin: 0.5em 0; padding-left: 1.5em; list-style-type: none; }
        details li { margin: 0.3em 0; }
        .isbn { color: #888; font-size: 0.85em; font-family: monospace; }
        .book.recent { background: linear-gradient(to right, #fffacd 0%, #ffffff 100%); border-left: 4px solid #ffd700; padding-left: 1em; }
        .new-badge { display: inline-block; background: #ffd700; color: #000; font-size: 0.7em; font-weight: bold; padding: 0.2em 0.5em; border-radius: 3px; margin-left: 0.5em; vertical-align: middle; }
    </style>
</head>
<body>
    <h1>Book Feed</h1>
"#;

const PAGE_TAIL: &str = "</body>\n</html>\n";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub abr_search_url: String,
    pub recent_window_days: i64,
}

impl From<&OutputConfig> for RenderOptions {
    fn from(output: &OutputConfig) -> Self {
        Self {
            abr_search_url: output.abr_search_url.clone(),
            recent_window_days: output.recent_window_days,
        }
    }
}

/// Substitute the query-encoded title into an ABR search URL template.
pub fn abr_search_url(template: &str, title: &str) -> String {
    let encoded = utf8_percent_encode(title, QUERY)
        .to_string()
        .replace("%20", "+");
    template.replace(TITLE_PLACEHOLDER, &encoded)
}

/// Render the full page. Books are emitted in the order given.
pub fn render_page(books: &[Book], options: &RenderOptions, today: NaiveDate) -> String {
    let mut html = String::from(PAGE_HEAD);
    for book in books {
        render_book(&mut html, book, options, today);
    }
    html.push_str(PAGE_TAIL);
    html
}

fn render_book(html: &mut String, book: &Book, options: &RenderOptions, today: NaiveDate) {
    let recent = is_recent(book.published_date.as_deref(), today, options.recent_window_days);
    let (recent_class, badge) = if recent {
        (" recent", r#"<span class="new-badge">NEW</span>"#)
    } else {
        ("", "")
    };

    let authors = if book.authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        book.author_line()
    };
    let description = if book.description.trim().is_empty() {
        NO_DESCRIPTION
    } else {
        book.description.as_str()
    };
    let search_url = abr_search_url(&options.abr_search_url, &book.title);
    let details = match book.link.as_deref() {
        Some(link) => format!(
            r#" | <a href="{}" target="_blank">Details</a>"#,
            encode_double_quoted_attribute(link)
        ),
        None => String::new(),
    };

    // Writing to a String cannot fail.
    let _ = write!(
        html,
        r#"    <div class="book{recent_class}">
        <img src="{thumb}" alt="{alt}">
        <h2>{title}{badge}</h2>
        <p><strong>Author:</strong> {authors}</p>
        <p><strong>Published:</strong> {published}</p>
        <p><a href="{search}" target="_blank">Search on ABR</a>{details}</p>{editions}
        <p>{description}</p>
        <div class="clear"></div>
    </div>
"#,
        thumb = encode_double_quoted_attribute(book.thumbnail.as_deref().unwrap_or("")),
        alt = encode_double_quoted_attribute(&book.title),
        title = encode_text(&book.title),
        authors = encode_text(&authors),
        published = encode_text(book.published_date.as_deref().unwrap_or("")),
        search = encode_double_quoted_attribute(&search_url),
        details = details,
        editions = editions_block(book),
        description = encode_text(description),
    );
}

fn editions_block(book: &Book) -> String {
    if book.editions.is_empty() {
        return String::new();
    }
    let items: Vec<String> = book
        .editions
        .iter()
        .map(|ed| match ed.isbn13.as_deref().filter(|i| !i.is_empty()) {
            Some(isbn) => format!(
                r#"                <li>{} <span class="isbn">ISBN: {}</span></li>"#,
                encode_text(&ed.title),
                encode_text(isbn)
            ),
            None => format!("                <li>{}</li>", encode_text(&ed.title)),
        })
        .collect();
    format!(
        r#"
        <details>
            <summary><em>Multiple editions merged ({} editions)</em></summary>
            <ul>
{}
            </ul>
        </details>"#,
        book.editions.len(),
        items.join("\n")
    )
}
