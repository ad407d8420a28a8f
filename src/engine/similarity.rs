//! String normalization and fuzzy-match scores used to spot editions of the
//! same work.

use crate::feed::types::Book;
use std::collections::HashSet;

/// Lowercase, replace non-alphanumerics with spaces and collapse whitespace.
/// Non-ASCII letters are treated as separators.
pub fn clean(s: &str) -> String {
    let replaced: String = s
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "Leviathan Wakes: The Expanse, Book 1" -> "Leviathan Wakes"
pub fn strip_subtitle(title: &str) -> &str {
    let end = title
        .find([':', '(', '\u{2013}', '\u{2014}', '-'])
        .unwrap_or(title.len());
    title[..end].trim()
}

pub fn strip_leading_articles(title: &str) -> &str {
    let title = title.trim();
    ["The ", "A ", "An "]
        .iter()
        .find_map(|article| title.strip_prefix(article))
        .unwrap_or(title)
}

/// Jaccard overlap of the cleaned token sets. Two empty inputs are identical.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let (ca, cb) = (clean(a), clean(b));
    let sa: HashSet<&str> = ca.split_whitespace().collect();
    let sb: HashSet<&str> = cb.split_whitespace().collect();
    if sa.is_empty() && sb.is_empty() {
        return 1.0;
    }
    let common = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    common as f64 / union as f64
}

/// Sequence ratio of the cleaned tokens after sorting them, so word order
/// does not matter ("Gaiman, Neil" vs "Neil Gaiman").
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    sequence_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let cleaned = clean(s);
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `2 * M / T`, where M is the number of characters in matching blocks found by
/// repeatedly taking the longest common substring, and T the combined length.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut pending = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common run of `a[alo..ahi]` and `b[blo..bhi]`; ties go to the run
/// starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    let width = bhi - blo + 1;
    // prev[x + 1]: length of the run ending at a[i - 1], b[blo + x]
    let mut prev = vec![0usize; width];
    for i in alo..ahi {
        let mut cur = vec![0usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                cur[j - blo + 1] = k;
                if k > best_len {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_len = k;
                }
            }
        }
        prev = cur;
    }
    (best_i, best_j, best_len)
}

/// Hash of the first dozen significant words, truncated to 12 hex chars.
/// Empty text has no fingerprint.
pub fn short_fingerprint(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let cleaned = clean(text);
    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .take(12)
        .collect();
    let mut hasher = sha1_smol::Sha1::new();
    hasher.update(words.join(" ").as_bytes());
    let digest = hasher.digest().to_string();
    digest[..12].to_string()
}

/// Identity of the underlying work: cleaned base title plus cleaned authors.
pub fn work_key(book: &Book) -> String {
    let title = strip_leading_articles(strip_subtitle(&book.title));
    format!("{}::{}", clean(title), clean(&book.author_line()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean("  The Hobbit:  There & Back Again! "), "the hobbit there back again");
        assert_eq!(clean("Café"), "caf");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_strip_subtitle() {
        assert_eq!(strip_subtitle("Leviathan Wakes: The Expanse, Book 1"), "Leviathan Wakes");
        assert_eq!(strip_subtitle("Caliban's War (The Expanse)"), "Caliban's War");
        assert_eq!(strip_subtitle("Dune \u{2014} Deluxe Edition"), "Dune");
        assert_eq!(strip_subtitle("Dune"), "Dune");
    }

    #[test]
    fn test_strip_leading_articles() {
        assert_eq!(strip_leading_articles("The Hobbit"), "Hobbit");
        assert_eq!(strip_leading_articles("An Echo"), "Echo");
        assert_eq!(strip_leading_articles("Theory"), "Theory");
        assert_eq!(strip_leading_articles("the hobbit"), "the hobbit");
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("", ""), 1.0);
        assert_eq!(token_set_ratio("Good Omens", "good omens!"), 1.0);
        assert!((token_set_ratio("a b c", "a b d") - 0.5).abs() < 1e-9);
        assert_eq!(token_set_ratio("x", ""), 0.0);
    }

    #[test]
    fn test_sequence_ratio_matches_known_values() {
        // Reference values from a longest-matching-block ratio.
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
        assert!((sequence_ratio("abc", "xyz")).abs() < 1e-9);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert!((sequence_ratio("ab", "ba") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_token_sort_ratio_ignores_word_order() {
        assert_eq!(token_sort_ratio("Gaiman, Neil", "Neil Gaiman"), 1.0);
        assert!(token_sort_ratio("Neil Gaiman", "Terry Pratchett") < 0.5);
    }

    #[test]
    fn test_short_fingerprint() {
        assert_eq!(short_fingerprint(""), "");
        let a = short_fingerprint("The crew of the Canterbury finds a derelict ship.");
        let b = short_fingerprint("THE CREW of the canterbury finds a derelict ship!!");
        assert_eq!(a.len(), 12);
        assert_eq!(a, b);
        assert_ne!(a, short_fingerprint("A completely different blurb about dragons."));
    }

    #[test]
    fn test_work_key() {
        let a = Book::new("The Hobbit: Or There and Back Again").with_authors(["J. R. R. Tolkien"]);
        let b = Book::new("Hobbit (Illustrated)").with_authors(["J.R.R. Tolkien"]);
        assert_eq!(work_key(&a), "hobbit::j r r tolkien");
        assert_eq!(work_key(&a), work_key(&b));
    }
}
