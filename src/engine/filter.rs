use crate::config::FilterConfig;
use crate::feed::types::Book;
use std::collections::HashSet;

/// Why books were dropped by `filter_books`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub language: usize,
    pub excluded_title: usize,
    pub duplicate_title: usize,
}

impl FilterCounts {
    pub fn total(&self) -> usize {
        self.language + self.excluded_title + self.duplicate_title
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub books: Vec<Book>,
    pub rejected: FilterCounts,
}

/// Keep books whose language is allowed and whose title contains none of the
/// exclusions, collapsing repeated titles to their first occurrence.
/// Input order is preserved.
pub fn filter_books(books: impl IntoIterator<Item = Book>, config: &FilterConfig) -> FilterOutcome {
    let exclusions: Vec<String> = config
        .exclude_titles
        .iter()
        .filter(|e| !e.is_empty())
        .map(|e| fold_case(e))
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut rejected = FilterCounts::default();
    let mut kept = Vec::new();

    for book in books {
        if !language_allowed(book.language.as_deref(), &config.languages) {
            tracing::debug!(title = %book.title, language = ?book.language, "dropped: language");
            rejected.language += 1;
            continue;
        }
        let folded = fold_case(&book.title);
        if let Some(hit) = exclusions.iter().find(|e| folded.contains(e.as_str())) {
            tracing::debug!(title = %book.title, exclusion = %hit, "dropped: excluded title");
            rejected.excluded_title += 1;
            continue;
        }
        if !seen.insert(title_key(&book.title)) {
            tracing::debug!(title = %book.title, "dropped: duplicate title");
            rejected.duplicate_title += 1;
            continue;
        }
        kept.push(book);
    }

    FilterOutcome { books: kept, rejected }
}

/// An allowlist entry matches the same tag or a regional variant of it
/// ("en" admits "EN" and "en-US"). An empty allowlist admits everything,
/// including books with no language.
pub fn language_allowed(language: Option<&str>, allowlist: &[String]) -> bool {
    if allowlist.is_empty() {
        return true;
    }
    let Some(language) = language.map(str::trim).filter(|l| !l.is_empty()) else {
        return false;
    };
    let language = language.to_ascii_lowercase();
    allowlist.iter().any(|allowed| {
        let allowed = allowed.trim().to_ascii_lowercase();
        !allowed.is_empty()
            && (language == allowed
                || language
                    .strip_prefix(&allowed)
                    .is_some_and(|rest| rest.starts_with(['-', '_'])))
    })
}

/// Key under which two titles count as duplicates.
pub fn title_key(title: &str) -> String {
    fold_case(title.trim())
}

// Per-char lowering keeps substring containment intact (no context-sensitive
// mappings such as final sigma).
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}
