//! Consolidation of multiple releases (hardcover, ebook, audiobook, reissues)
//! of the same work into a single entry.

use super::similarity::{short_fingerprint, strip_subtitle, token_set_ratio, token_sort_ratio, work_key};
use crate::config::DedupeConfig;
use crate::feed::types::{Book, Edition};

const TITLE_WEIGHT: f64 = 0.40;
const AUTHOR_WEIGHT: f64 = 0.40;
const DESCRIPTION_WEIGHT: f64 = 0.20;
/// Description similarity when either side has no description.
const NEUTRAL_DESCRIPTION: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairClass {
    SameWork,
    /// Same work key but the blended score is too low to merge.
    Uncertain,
    Different,
}

/// Weighted blend of title, author and description similarity in `[0, 1]`.
pub fn similarity_score(a: &Book, b: &Book) -> f64 {
    let title = token_set_ratio(strip_subtitle(&a.title), strip_subtitle(&b.title));
    let author = token_sort_ratio(&a.author_line(), &b.author_line());

    let (fa, fb) = (short_fingerprint(&a.description), short_fingerprint(&b.description));
    let description = if fa.is_empty() || fb.is_empty() {
        NEUTRAL_DESCRIPTION
    } else if fa == fb {
        1.0
    } else {
        0.0
    };

    TITLE_WEIGHT * title + AUTHOR_WEIGHT * author + DESCRIPTION_WEIGHT * description
}

pub fn classify_pair(a: &Book, b: &Book, config: &DedupeConfig) -> PairClass {
    if work_key(a) == work_key(b) {
        return if similarity_score(a, b) >= config.same_work_threshold {
            PairClass::SameWork
        } else {
            PairClass::Uncertain
        };
    }

    // Fuzzy rescue for mild title or author drift
    if token_set_ratio(&a.title, &b.title) >= config.title_rescue
        && token_sort_ratio(&a.author_line(), &b.author_line()) >= config.author_rescue
    {
        return PairClass::SameWork;
    }

    PairClass::Different
}

/// Greedy single pass in input order: each unclaimed book absorbs every later
/// unclaimed book classified as the same work. Representatives keep the
/// position of their first member.
pub fn consolidate_editions(books: Vec<Book>, config: &DedupeConfig) -> Vec<Book> {
    let total = books.len();
    let mut claimed = vec![false; total];
    let mut groups = Vec::with_capacity(total);

    for i in 0..total {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        let mut group = vec![i];
        for j in (i + 1)..total {
            if !claimed[j] && classify_pair(&books[i], &books[j], config) == PairClass::SameWork {
                claimed[j] = true;
                group.push(j);
            }
        }
        groups.push(group);
    }

    let mut slots: Vec<Option<Book>> = books.into_iter().map(Some).collect();
    let merged: Vec<Book> = groups
        .into_iter()
        .map(|group| {
            let members: Vec<Book> = group.iter().filter_map(|&idx| slots[idx].take()).collect();
            merge_editions(members)
        })
        .collect();

    tracing::info!(
        before = total,
        after = merged.len(),
        "consolidated editions into unique works"
    );
    merged
}

/// Fold a group of editions into the first one: earliest date, longest
/// description, first available thumbnail.
pub fn merge_editions(mut members: Vec<Book>) -> Book {
    if members.len() <= 1 {
        return members.pop().unwrap_or_default();
    }

    let published_date = members
        .iter()
        .filter_map(|b| b.published_date.as_deref())
        .filter(|d| !d.trim().is_empty())
        .min()
        .map(str::to_string);

    let description = members
        .iter()
        .map(|b| b.description.as_str())
        .fold("", |best, d| {
            if d.chars().count() > best.chars().count() {
                d
            } else {
                best
            }
        })
        .to_string();

    let thumbnail = members.iter().find_map(|b| b.thumbnail.clone());

    let editions: Vec<Edition> = members
        .iter()
        .flat_map(|b| {
            if b.editions.is_empty() {
                vec![b.edition()]
            } else {
                b.editions.clone()
            }
        })
        .collect();

    let mut merged = members.swap_remove(0);
    merged.published_date = published_date;
    merged.description = description;
    merged.thumbnail = thumbnail;
    merged.editions = editions;
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expanse(title: &str, isbn: &str, date: &str) -> Book {
        Book::new(title)
            .with_authors(["James S. A. Corey"])
            .with_language("en")
            .with_isbn13(isbn)
            .with_published_date(date)
    }

    #[test]
    fn test_same_work_with_subtitle() {
        let a = expanse("Leviathan Wakes", "1", "2011-06-15");
        let b = expanse("Leviathan Wakes: The Expanse, Book 1", "2", "2012-01-01");
        assert_eq!(work_key(&a), work_key(&b));
        assert!(similarity_score(&a, &b) >= 0.65);
        assert_eq!(classify_pair(&a, &b, &DedupeConfig::default()), PairClass::SameWork);
    }

    #[test]
    fn test_different_works_same_author() {
        let a = expanse("Leviathan Wakes", "1", "2011");
        let b = expanse("Caliban's War", "2", "2012");
        assert_eq!(classify_pair(&a, &b, &DedupeConfig::default()), PairClass::Different);
    }

    #[test]
    fn test_same_key_but_conflicting_descriptions_is_uncertain() {
        let a = Book::new("Dune").with_description("Desert planet spice melange sandworms politics");
        let b = Book::new("Dune").with_description("Completely unrelated cookbook recipes baking bread");
        let strict = DedupeConfig {
            same_work_threshold: 0.9,
            ..DedupeConfig::default()
        };
        // No authors on either side: 0.4 title + 0.4 author + 0.0 description
        assert!((similarity_score(&a, &b) - 0.8).abs() < 1e-9);
        assert_eq!(classify_pair(&a, &b, &strict), PairClass::Uncertain);
    }

    #[test]
    fn test_fuzzy_rescue_for_author_spelling() {
        let a = Book::new("Good Omens").with_authors(["Terry Pratchett", "Neil Gaiman"]);
        let b = Book::new("Good Omens").with_authors(["Neil Gaiman", "Terry Pratchett"]);
        assert_ne!(work_key(&a), work_key(&b));
        assert_eq!(classify_pair(&a, &b, &DedupeConfig::default()), PairClass::SameWork);
    }

    #[test]
    fn test_consolidate_merges_and_keeps_order() {
        let books = vec![
            expanse("Leviathan Wakes", "111", "2011-06-15")
                .with_description("Short."),
            Book::new("Dune").with_authors(["Frank Herbert"]),
            expanse("Leviathan Wakes (The Expanse)", "222", "2010-12-01")
                .with_description("A much longer description of the first Expanse book.")
                .with_thumbnail("http://img/lw.jpg"),
        ];
        let out = consolidate_editions(books, &DedupeConfig::default());
        assert_eq!(out.len(), 2);

        let lw = &out[0];
        assert_eq!(lw.title, "Leviathan Wakes");
        assert_eq!(lw.isbn13.as_deref(), Some("111"));
        assert_eq!(lw.published_date.as_deref(), Some("2010-12-01"));
        assert_eq!(lw.description, "A much longer description of the first Expanse book.");
        assert_eq!(lw.thumbnail.as_deref(), Some("http://img/lw.jpg"));
        assert_eq!(
            lw.editions,
            vec![
                Edition { title: "Leviathan Wakes".into(), isbn13: Some("111".into()) },
                Edition { title: "Leviathan Wakes (The Expanse)".into(), isbn13: Some("222".into()) },
            ]
        );

        assert_eq!(out[1].title, "Dune");
        assert!(out[1].editions.is_empty());
    }

    #[test]
    fn test_longest_description_tie_keeps_first() {
        let merged = merge_editions(vec![
            Book::new("A").with_description("abc"),
            Book::new("A").with_description("xyz"),
        ]);
        assert_eq!(merged.description, "abc");
    }

    #[test]
    fn test_longest_description_counts_characters() {
        let merged = merge_editions(vec![
            Book::new("A").with_description("\u{e9}\u{e9}\u{e9}"),
            Book::new("A").with_description("abcde"),
        ]);
        assert_eq!(merged.description, "abcde");
    }

    #[test]
    fn test_consolidate_keeps_uncertain_pairs_apart() {
        let strict = DedupeConfig {
            same_work_threshold: 0.9,
            ..DedupeConfig::default()
        };
        let books = vec![
            Book::new("Dune").with_description("Desert planet spice melange sandworms politics"),
            Book::new("Dune").with_description("Completely unrelated cookbook recipes baking bread"),
        ];
        let out = consolidate_editions(books, &strict);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|b| b.editions.is_empty()));
        assert!(out[0].description.starts_with("Desert"));
        assert!(out[1].description.starts_with("Completely"));
    }

    #[test]
    fn test_consolidate_empty() {
        assert!(consolidate_editions(Vec::new(), &DedupeConfig::default()).is_empty());
    }
}
