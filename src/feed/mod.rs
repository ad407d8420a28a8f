pub mod http;
pub mod rss;
pub mod text_dump;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use types::Book;

#[async_trait]
pub trait BookFeed: Send + Sync {
    async fn fetch_books(&mut self) -> Result<Vec<Book>>;

    /// Human-readable source, used in logs.
    fn describe(&self) -> String;
}

/// Detect the feed format from its content and parse it.
pub fn parse_feed(content: &str) -> Result<Vec<Book>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    if text_dump::is_text_dump(content) {
        return text_dump::parse(content);
    }
    if content.trim_start().starts_with('<') {
        return rss::parse(content);
    }
    anyhow::bail!("unrecognized feed format (neither RSS XML nor a text dump)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_rss() {
        let books = parse_feed(
            "\u{feff}<?xml version=\"1.0\"?>\n<rss><channel><item><title>Dune</title></item></channel></rss>",
        )
        .unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[test]
    fn test_detects_text_dump_inside_markup() {
        // Some hosts wrap the dump in <pre>.
        let text = "<pre>stdClass Object\n(\n    [items] => Array\n        (\n            [0] => stdClass Object\n                (\n                    [title] => Dune\n                )\n\n        )\n)\n</pre>";
        let books = parse_feed(text).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(parse_feed("{\"items\": []}").is_err());
        assert!(parse_feed("").is_err());
    }
}
