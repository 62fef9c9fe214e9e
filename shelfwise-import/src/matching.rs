//! Exact/fuzzy match classification and duplicate detection.
//!
//! Both work on anything that exposes a title and an optional author, so the
//! same rules apply to import candidates, new books, and catalog rows.

use shelfwise_catalog::types::{CatalogBook, ImportCandidate, NewBook};

use crate::similarity::{normalize, normalize_opt, normalized_similarity};

/// Minimum title (and author) similarity for a fuzzy match.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// A record with a title and an optional author.
pub trait TitleAuthor {
    fn title(&self) -> &str;
    fn author(&self) -> Option<&str>;
}

impl TitleAuthor for CatalogBook {
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

impl TitleAuthor for ImportCandidate {
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

impl TitleAuthor for NewBook {
    fn title(&self) -> &str {
        &self.title
    }
    fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

/// Normalized title and author of one record, computed once per scan.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedKey {
    pub title: String,
    pub author: String,
}

impl NormalizedKey {
    pub fn of(record: &impl TitleAuthor) -> Self {
        Self {
            title: normalize(record.title()),
            author: normalize_opt(record.author()),
        }
    }

    /// Same title, and authors agree or at least one is missing.
    pub fn exact_match(&self, other: &NormalizedKey) -> bool {
        self.title == other.title
            && (self.author.is_empty() || other.author.is_empty() || self.author == other.author)
    }

    pub fn fuzzy_match(&self, other: &NormalizedKey, threshold: f64) -> bool {
        if normalized_similarity(&self.title, &other.title) < threshold {
            return false;
        }
        if self.author.is_empty() || other.author.is_empty() {
            return true;
        }
        if self.author.contains(&other.author) || other.author.contains(&self.author) {
            return true;
        }
        normalized_similarity(&self.author, &other.author) >= threshold
    }
}

/// `true` when both strings are equal after normalization.
pub fn is_exact_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Fuzzy title/author match.
///
/// Titles must reach `threshold` similarity. A missing author on either side
/// accepts the title match alone; otherwise one author must contain the other
/// or reach `threshold` similarity too.
pub fn is_fuzzy_match(
    candidate: &impl TitleAuthor,
    existing: &impl TitleAuthor,
    threshold: f64,
) -> bool {
    NormalizedKey::of(candidate).fuzzy_match(&NormalizedKey::of(existing), threshold)
}

/// Find the first existing record that describes the same book as `new_book`.
///
/// Titles must be equal after normalization. Authors must be equal too unless
/// either side has none, in which case the records are assumed to be the same
/// book and the new one is treated as a duplicate.
pub fn find_duplicate<'a, T: TitleAuthor>(
    new_book: &impl TitleAuthor,
    existing: &'a [T],
) -> Option<&'a T> {
    let key = NormalizedKey::of(new_book);
    existing
        .iter()
        .find(|candidate| key.exact_match(&NormalizedKey::of(*candidate)))
}

/// `true` when [`find_duplicate`] finds anything.
pub fn is_duplicate<T: TitleAuthor>(new_book: &impl TitleAuthor, existing: &[T]) -> bool {
    find_duplicate(new_book, existing).is_some()
}
