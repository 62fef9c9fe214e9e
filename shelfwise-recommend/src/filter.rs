//! Candidate filtering ahead of scoring.

use std::collections::HashSet;

use shelfwise_catalog::types::{CatalogBook, ReaderProfile};

/// `true` when the title contains any non-blank dislike term, ignoring case.
pub fn is_disliked(title: &str, dislikes: &[String]) -> bool {
    let title = title.to_lowercase();
    dislikes
        .iter()
        .map(|d| d.trim().to_lowercase())
        .any(|d| !d.is_empty() && title.contains(&d))
}

/// `true` unless the book has a numeric level outside `range`.
///
/// Books with no level, or a level that is not a number, always pass.
pub fn within_reading_range(book: &CatalogBook, range: Option<(f64, f64)>) -> bool {
    match (range, book.numeric_reading_level()) {
        (Some((min, max)), Some(level)) => level >= min && level <= max,
        _ => true,
    }
}

/// Drop books the reader has read, dislikes, or cannot read at their level.
/// Order is preserved.
pub fn filter_candidates(books: Vec<CatalogBook>, profile: &ReaderProfile) -> Vec<CatalogBook> {
    let read: HashSet<&str> = profile.read_book_ids.iter().map(String::as_str).collect();
    let range = profile.reading_level_range();

    books
        .into_iter()
        .filter(|book| !read.contains(book.id.as_str()))
        .filter(|book| !is_disliked(&book.title, &profile.dislikes))
        .filter(|book| within_reading_range(book, range))
        .collect()
}
