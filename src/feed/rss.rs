//! RSS 2.0 feed parsing.
//!
//! Reads `<item>` elements from a `<channel>`, taking Dublin Core and Media RSS
//! extensions into account. Items without a language inherit the channel's.

use super::types::{non_empty, Book, DEFAULT_TITLE};
use anyhow::{anyhow, Result};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::sync::LazyLock;

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Description,
    Encoded,
    Author,
    Language,
    Date,
    Identifier,
}

#[derive(Default)]
struct ItemBuilder {
    title: String,
    link: String,
    description: String,
    encoded: String,
    authors: Vec<String>,
    language: String,
    date: String,
    identifier: String,
    thumbnail: Option<String>,
}

impl ItemBuilder {
    fn push(&mut self, field: Field, text: String) {
        match field {
            Field::Title => self.title = text,
            Field::Link => self.link = text,
            Field::Description => self.description = text,
            Field::Encoded => self.encoded = text,
            Field::Author => {
                if let Some(author) = non_empty(&text) {
                    self.authors.push(author);
                }
            }
            Field::Language => self.language = text,
            Field::Date => {
                if self.date.trim().is_empty() {
                    self.date = text;
                }
            }
            Field::Identifier => {
                if self.identifier.trim().is_empty() {
                    self.identifier = text;
                }
            }
        }
    }

    fn build(self, channel_language: Option<&str>) -> Book {
        let description = if self.description.trim().is_empty() {
            self.encoded
        } else {
            self.description
        };
        Book {
            title: non_empty(&self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            authors: self.authors,
            language: non_empty(&self.language)
                .or_else(|| channel_language.map(str::to_string)),
            description: plain_text(&description),
            link: non_empty(&self.link),
            thumbnail: self.thumbnail,
            published_date: normalize_date(&self.date),
            isbn13: isbn13(&self.identifier),
            editions: Vec::new(),
        }
    }
}

/// Parse an RSS 2.0 document into books, in document order.
pub fn parse(content: &str) -> Result<Vec<Book>> {
    // Text stays untrimmed so spaces next to entity references survive.
    let mut reader = Reader::from_str(content);

    let mut items = Vec::new();
    let mut saw_channel = false;
    let mut channel_language: Option<String> = None;
    let mut item: Option<ItemBuilder> = None;
    let mut field: Option<Field> = None;
    let mut channel_field = false;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"rss" | b"channel" | b"RDF" => saw_channel = true,
                    b"item" => {
                        item = Some(ItemBuilder::default());
                        field = None;
                    }
                    _ => {
                        if let Some(current) = item.as_mut() {
                            field = item_field(name.as_ref());
                            buf_text.clear();
                            take_thumbnail(current, &e);
                        } else if local == b"language" {
                            channel_field = true;
                            buf_text.clear();
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if let Some(current) = item.as_mut() {
                    take_thumbnail(current, &e);
                }
            }
            Ok(Event::Text(e)) => {
                if field.is_some() || channel_field {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::CData(e)) => {
                if field.is_some() || channel_field {
                    buf_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if field.is_some() || channel_field {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(resolved) = resolve_entity(&entity) {
                        buf_text.push_str(&resolved);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                if local_name(name.as_ref()) == b"item" {
                    items.extend(item.take());
                    field = None;
                } else if let (Some(current), Some(f)) = (item.as_mut(), field) {
                    if item_field(name.as_ref()) == Some(f) {
                        current.push(f, std::mem::take(&mut buf_text));
                        field = None;
                    }
                } else if channel_field {
                    channel_language = non_empty(&buf_text);
                    channel_field = false;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "malformed RSS XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    if !saw_channel {
        anyhow::bail!("document has no <rss> or <channel> element");
    }

    // Channel children come in any order, so items are built once the
    // channel language is known.
    let books: Vec<Book> = items
        .into_iter()
        .map(|done: ItemBuilder| done.build(channel_language.as_deref()))
        .collect();
    tracing::debug!(items = books.len(), "parsed RSS document");
    Ok(books)
}

/// Map a qualified element name inside `<item>` to the field it fills.
fn item_field(name: &[u8]) -> Option<Field> {
    match name {
        b"title" | b"dc:title" => Some(Field::Title),
        b"link" => Some(Field::Link),
        b"description" | b"dc:description" => Some(Field::Description),
        b"content:encoded" => Some(Field::Encoded),
        b"author" | b"dc:creator" => Some(Field::Author),
        b"language" | b"dc:language" => Some(Field::Language),
        b"pubDate" | b"dc:date" => Some(Field::Date),
        b"dc:identifier" | b"isbn" => Some(Field::Identifier),
        _ => None,
    }
}

fn take_thumbnail(item: &mut ItemBuilder, e: &BytesStart) {
    if item.thumbnail.is_some() {
        return;
    }
    let name = e.name();
    let is_image_holder = match name.as_ref() {
        b"media:thumbnail" => true,
        b"enclosure" | b"media:content" => {
            let kind = attribute(e, b"type").or_else(|| attribute(e, b"medium"));
            kind.is_none_or(|k| k.starts_with("image"))
        }
        _ => false,
    };
    if is_image_holder {
        item.thumbnail = attribute(e, b"url").and_then(|u| non_empty(&u));
    }
}

fn attribute(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.as_ref() != key {
            return None;
        }
        let raw = String::from_utf8_lossy(&attr.value).into_owned();
        Some(match unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(_) => raw,
        })
    })
}

fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        "nbsp" => return Some("\u{a0}".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        None
    };
    code.and_then(char::from_u32).map(|c| c.to_string())
}

/// Descriptions often carry inline HTML; the page renders plain text.
fn plain_text(raw: &str) -> String {
    let stripped = MARKUP_RE.replace_all(raw, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an RSS `pubDate` (RFC 2822) or `dc:date` (ISO 8601) to `YYYY-MM-DD`.
fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(raw) {
        return Some(dt.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%Y-%m-%d").to_string());
    }
    Some(raw.to_string())
}

/// Accept `978-0-316-12908-4`, `urn:isbn:9780316129084` and bare 13-digit forms.
fn isbn13(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let looks_like_isbn = raw
        .chars()
        .all(|c| c.is_ascii_digit() || c == '-' || c == ' ' || c.is_ascii_alphabetic() || c == ':');
    if digits.len() == 13 && looks_like_isbn {
        Some(digits)
    } else {
        None
    }
}
