//! Normalized book record shared by every feed format and the engine.

pub const DEFAULT_TITLE: &str = "No Title";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Book {
    pub title: String,
    pub authors: Vec<String>,
    pub language: Option<String>,
    pub description: String,
    pub link: Option<String>,
    pub thumbnail: Option<String>,
    pub published_date: Option<String>, // YYYY-MM-DD, YYYY-MM or YYYY
    pub isbn13: Option<String>,
    /// Releases folded into this record by edition consolidation.
    pub editions: Vec<Edition>,
}

/// One release merged into a consolidated work.
#[derive(Debug, Clone, PartialEq)]
pub struct Edition {
    pub title: String,
    pub isbn13: Option<String>,
}

impl Book {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_authors<S: Into<String>>(mut self, authors: impl IntoIterator<Item = S>) -> Self {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_published_date(mut self, date: impl Into<String>) -> Self {
        self.published_date = Some(date.into());
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    pub fn with_isbn13(mut self, isbn: impl Into<String>) -> Self {
        self.isbn13 = Some(isbn.into());
        self
    }

    /// Authors joined for display and comparison ("A, B").
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }

    pub fn edition(&self) -> Edition {
        Edition {
            title: self.title.clone(),
            isbn13: self.isbn13.clone(),
        }
    }
}

/// Trim a scraped field, mapping empty strings to `None`.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
