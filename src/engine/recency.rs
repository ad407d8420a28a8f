use crate::feed::types::Book;
use chrono::{Duration, NaiveDate};

/// Parse a feed publication date. Partial dates resolve to their first day:
/// "2024-03" is 1 March 2024, "2024" is 1 January 2024.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(d);
    }
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        return raw.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1));
    }
    chrono::DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Published within the last `window_days` days, today included. Future
/// release dates are never recent.
pub fn is_recent(published: Option<&str>, today: NaiveDate, window_days: i64) -> bool {
    let Some(date) = published.and_then(parse_published_date) else {
        return false;
    };
    // A window reaching past the calendar range covers every past date.
    let window_start = Duration::try_days(window_days).and_then(|w| today.checked_sub_signed(w));
    window_start.is_none_or(|start| start <= date) && date <= today
}

/// Newest first by publication date string; undated books sink to the end.
/// Stable, so equal dates keep feed order.
pub fn sort_newest_first(books: &mut [Book]) {
    books.sort_by(|a, b| {
        let da = a.published_date.as_deref().unwrap_or("");
        let db = b.published_date.as_deref().unwrap_or("");
        db.cmp(da)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_published_date_formats() {
        assert_eq!(parse_published_date("2024-03-09"), Some(day(2024, 3, 9)));
        assert_eq!(parse_published_date("2024-03"), Some(day(2024, 3, 1)));
        assert_eq!(parse_published_date("2024"), Some(day(2024, 1, 1)));
        assert_eq!(
            parse_published_date("Sat, 09 Mar 2024 10:00:00 +0000"),
            Some(day(2024, 3, 9))
        );
        assert_eq!(parse_published_date("soon"), None);
        assert_eq!(parse_published_date(""), None);
    }

    #[test]
    fn test_is_recent_window() {
        let today = day(2026, 10, 14);
        assert!(is_recent(Some("2026-10-14"), today, 30));
        assert!(is_recent(Some("2026-09-14"), today, 30));
        assert!(!is_recent(Some("2026-09-13"), today, 30));
        assert!(!is_recent(Some("2026-10-15"), today, 30));
        assert!(is_recent(Some("2026-10"), today, 30));
        assert!(!is_recent(Some("2026"), today, 30));
        assert!(!is_recent(None, today, 30));
    }

    #[test]
    fn test_is_recent_with_huge_window() {
        let today = day(2026, 10, 14);
        assert!(is_recent(Some("1900-01-01"), today, i64::MAX));
        assert!(is_recent(Some("1900-01-01"), today, 1_000_000_000));
        assert!(!is_recent(Some("2026-10-15"), today, i64::MAX));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut books = vec![
            Book::new("old").with_published_date("2001"),
            Book::new("undated"),
            Book::new("new").with_published_date("2024-05-01"),
            Book::new("mid-a").with_published_date("2010-01-01"),
            Book::new("mid-b").with_published_date("2010-01-01"),
        ];
        sort_newest_first(&mut books);
        let order: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(order, vec!["new", "mid-a", "mid-b", "old", "undated"]);
    }
}
