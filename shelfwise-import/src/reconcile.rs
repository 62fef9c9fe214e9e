//! Import reconciliation: classify candidates against the catalog.
//!
//! Each candidate is compared to the global catalog and to the books the
//! organization already has available, and lands in exactly one category:
//!
//! 1. exact title (and compatible author) match already linked → already in library
//! 2. exact match, not linked, reading levels disagree → conflict
//! 3. exact match, not linked → matched
//! 4. no exact match, first fuzzy match → possible match
//! 5. otherwise → new book
//!
//! Reconciliation is read-only. Its result is not reserved in any way, so a
//! concurrent import can make a category stale before it is confirmed; the
//! confirm step relies on upserts to tolerate that.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use shelfwise_catalog::types::{CatalogBook, ImportCandidate, OrganizationSelection};
use shelfwise_db::{Connection, all_books, available_selections};

use crate::error::ImportError;
use crate::matching::{DEFAULT_FUZZY_THRESHOLD, NormalizedKey};
use crate::similarity::{normalize, normalized_similarity};

/// Options controlling reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Minimum title/author similarity for a possible match.
    pub fuzzy_threshold: f64,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// The reading levels that disagree in a conflict.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictDetails {
    pub existing_reading_level: String,
    pub imported_reading_level: String,
}

/// Outcome of reconciling one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MatchCategory {
    Matched {
        existing_id: String,
    },
    PossibleMatch {
        existing_id: String,
        title_similarity: f64,
    },
    NewBook,
    Conflict {
        existing_id: String,
        details: ConflictDetails,
    },
    AlreadyInLibrary {
        existing_id: String,
    },
}

/// A candidate together with its category and the catalog book it refers to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewEntry {
    pub candidate: ImportCandidate,
    pub category: MatchCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing: Option<CatalogBook>,
}

/// Per-category counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    /// Number of candidates submitted, including skipped ones.
    pub total: usize,
    pub matched: usize,
    pub possible_matches: usize,
    pub new_books: usize,
    pub conflicts: usize,
    pub already_in_library: usize,
    /// Candidates ignored because their title was blank.
    pub skipped: usize,
}

/// Result of a preview, one list per category in candidate order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub matched: Vec<PreviewEntry>,
    pub possible_matches: Vec<PreviewEntry>,
    pub new_books: Vec<PreviewEntry>,
    pub conflicts: Vec<PreviewEntry>,
    pub already_in_library: Vec<PreviewEntry>,
    pub summary: PreviewSummary,
}

impl ImportPreview {
    fn push(&mut self, entry: PreviewEntry) {
        let list = match entry.category {
            MatchCategory::Matched { .. } => &mut self.matched,
            MatchCategory::PossibleMatch { .. } => &mut self.possible_matches,
            MatchCategory::NewBook => &mut self.new_books,
            MatchCategory::Conflict { .. } => &mut self.conflicts,
            MatchCategory::AlreadyInLibrary { .. } => &mut self.already_in_library,
        };
        list.push(entry);
    }

    fn fill_summary(&mut self, total: usize) {
        self.summary = PreviewSummary {
            total,
            matched: self.matched.len(),
            possible_matches: self.possible_matches.len(),
            new_books: self.new_books.len(),
            conflicts: self.conflicts.len(),
            already_in_library: self.already_in_library.len(),
            skipped: 0,
        };
        let classified = self.summary.matched
            + self.summary.possible_matches
            + self.summary.new_books
            + self.summary.conflicts
            + self.summary.already_in_library;
        self.summary.skipped = total - classified;
    }
}

/// The catalog with titles and authors normalized once, for repeated lookups.
pub struct CatalogIndex<'a> {
    books: &'a [CatalogBook],
    keys: Vec<NormalizedKey>,
    by_title: HashMap<String, Vec<usize>>,
}

impl<'a> CatalogIndex<'a> {
    pub fn new(books: &'a [CatalogBook]) -> Self {
        let keys: Vec<NormalizedKey> = books.iter().map(NormalizedKey::of).collect();
        let mut by_title: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, key) in keys.iter().enumerate() {
            by_title.entry(key.title.clone()).or_default().push(i);
        }
        Self {
            books,
            keys,
            by_title,
        }
    }

    /// First book, in catalog order, with an exact title and compatible author.
    fn exact(&self, key: &NormalizedKey) -> Option<&'a CatalogBook> {
        self.by_title
            .get(&key.title)?
            .iter()
            .find(|&&i| key.exact_match(&self.keys[i]))
            .map(|&i| &self.books[i])
    }

    /// First book, in catalog order, that fuzzy-matches.
    fn fuzzy(&self, key: &NormalizedKey, threshold: f64) -> Option<(&'a CatalogBook, f64)> {
        self.keys
            .iter()
            .position(|existing| key.fuzzy_match(existing, threshold))
            .map(|i| {
                let score = normalized_similarity(&key.title, &self.keys[i].title);
                (&self.books[i], score)
            })
    }
}

/// Trimmed, non-empty reading level.
fn level(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Classify a single candidate. Returns `None` for a blank title.
pub fn classify_candidate<'a>(
    candidate: &ImportCandidate,
    index: &CatalogIndex<'a>,
    linked_book_ids: &HashSet<&str>,
    options: &ReconcileOptions,
) -> Option<(MatchCategory, Option<&'a CatalogBook>)> {
    let key = NormalizedKey::of(candidate);
    if key.title.is_empty() {
        return None;
    }

    if let Some(existing) = index.exact(&key) {
        let existing_id = existing.id.clone();
        if linked_book_ids.contains(existing.id.as_str()) {
            return Some((MatchCategory::AlreadyInLibrary { existing_id }, Some(existing)));
        }

        let imported = level(candidate.reading_level.as_deref());
        let current = level(existing.reading_level.as_deref());
        if let (Some(imported), Some(current)) = (imported, current) {
            if imported != current {
                let details = ConflictDetails {
                    existing_reading_level: current.to_string(),
                    imported_reading_level: imported.to_string(),
                };
                return Some((MatchCategory::Conflict { existing_id, details }, Some(existing)));
            }
        }

        return Some((MatchCategory::Matched { existing_id }, Some(existing)));
    }

    if let Some((existing, title_similarity)) = index.fuzzy(&key, options.fuzzy_threshold) {
        let category = MatchCategory::PossibleMatch {
            existing_id: existing.id.clone(),
            title_similarity,
        };
        return Some((category, Some(existing)));
    }

    Some((MatchCategory::NewBook, None))
}

/// Classify every candidate against the catalog and the organization's
/// available selections.
pub fn reconcile(
    candidates: &[ImportCandidate],
    catalog: &[CatalogBook],
    selections: &[OrganizationSelection],
    options: &ReconcileOptions,
) -> ImportPreview {
    let index = CatalogIndex::new(catalog);
    let linked: HashSet<&str> = selections
        .iter()
        .filter(|s| s.is_available)
        .map(|s| s.book_id.as_str())
        .collect();

    let mut preview = ImportPreview::default();
    for candidate in candidates {
        match classify_candidate(candidate, &index, &linked, options) {
            Some((category, existing)) => preview.push(PreviewEntry {
                candidate: candidate.clone(),
                category,
                existing: existing.cloned(),
            }),
            None => log::debug!("Skipping import candidate with blank title"),
        }
    }
    preview.fill_summary(candidates.len());
    preview
}

/// Reject candidate lists that cannot produce any result.
pub fn validate_candidates(candidates: &[ImportCandidate]) -> Result<(), ImportError> {
    if candidates.is_empty() {
        return Err(ImportError::validation("no books were provided"));
    }
    if candidates.iter().all(|c| normalize(&c.title).is_empty()) {
        return Err(ImportError::validation("every book is missing a title"));
    }
    Ok(())
}

/// Preview an import for an organization against the current catalog.
pub fn preview_import(
    conn: &Connection,
    organization_id: &str,
    candidates: &[ImportCandidate],
    options: &ReconcileOptions,
) -> Result<ImportPreview, ImportError> {
    validate_candidates(candidates)?;

    let catalog = all_books(conn)?;
    let selections = available_selections(conn, organization_id)?;
    log::debug!(
        "Reconciling {} candidates against {} catalog books ({} linked to {})",
        candidates.len(),
        catalog.len(),
        selections.len(),
        organization_id,
    );

    Ok(reconcile(candidates, &catalog, &selections, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str, author: Option<&str>, level: Option<&str>) -> CatalogBook {
        CatalogBook {
            id: id.to_string(),
            title: title.to_string(),
            author: author.map(str::to_string),
            reading_level: level.map(str::to_string),
            age_range: None,
            genre_ids: vec![],
            description: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn selection(book_id: &str, is_available: bool) -> OrganizationSelection {
        OrganizationSelection {
            id: 1,
            organization_id: "org1".to_string(),
            book_id: book_id.to_string(),
            is_available,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn matilda() -> CatalogBook {
        book("m1", "Matilda", Some("Roald Dahl"), Some("3.0"))
    }

    fn classify(
        candidate: ImportCandidate,
        catalog: &[CatalogBook],
        selections: &[OrganizationSelection],
    ) -> MatchCategory {
        let preview = reconcile(&[candidate], catalog, selections, &ReconcileOptions::default());
        let entries = [
            &preview.matched,
            &preview.possible_matches,
            &preview.new_books,
            &preview.conflicts,
            &preview.already_in_library,
        ];
        let all: Vec<_> = entries.iter().flat_map(|l| l.iter()).collect();
        assert_eq!(all.len(), 1);
        all[0].category.clone()
    }

    #[test]
    fn linked_book_is_already_in_library() {
        let candidate = ImportCandidate::new("Matilda")
            .with_author("Roald Dahl")
            .with_reading_level("3.0");
        let category = classify(candidate, &[matilda()], &[selection("m1", true)]);
        assert_eq!(
            category,
            MatchCategory::AlreadyInLibrary {
                existing_id: "m1".to_string()
            }
        );
    }

    #[test]
    fn linked_book_wins_over_level_conflict() {
        let candidate = ImportCandidate::new("Matilda").with_reading_level("4.5");
        let category = classify(candidate, &[matilda()], &[selection("m1", true)]);
        assert!(matches!(category, MatchCategory::AlreadyInLibrary { .. }));
    }

    #[test]
    fn differing_level_is_conflict() {
        let candidate = ImportCandidate::new("Matilda")
            .with_author("Roald Dahl")
            .with_reading_level("4.5");
        let category = classify(candidate, &[matilda()], &[]);
        assert_eq!(
            category,
            MatchCategory::Conflict {
                existing_id: "m1".to_string(),
                details: ConflictDetails {
                    existing_reading_level: "3.0".to_string(),
                    imported_reading_level: "4.5".to_string(),
                },
            }
        );
    }

    #[test]
    fn missing_level_is_matched() {
        let candidate = ImportCandidate::new("Matilda").with_author("Roald Dahl");
        let category = classify(candidate, &[matilda()], &[]);
        assert_eq!(
            category,
            MatchCategory::Matched {
                existing_id: "m1".to_string()
            }
        );
    }

    #[test]
    fn unavailable_selection_does_not_count_as_linked() {
        let candidate = ImportCandidate::new("Matilda");
        let category = classify(candidate, &[matilda()], &[selection("m1", false)]);
        assert!(matches!(category, MatchCategory::Matched { .. }));
    }

    #[test]
    fn exact_title_with_other_author_falls_through_to_fuzzy() {
        let candidate = ImportCandidate::new("Matilda").with_author("Someone Else");
        let category = classify(candidate, &[matilda()], &[]);
        assert_eq!(category, MatchCategory::NewBook);
    }

    #[test]
    fn misspelled_title_is_possible_match() {
        let catalog = vec![book("h1", "The Hobbit", Some("J.R.R. Tolkien"), None)];
        let candidate = ImportCandidate::new("The Hobit").with_author("Tolkien");
        match classify(candidate, &catalog, &[]) {
            MatchCategory::PossibleMatch {
                existing_id,
                title_similarity,
            } => {
                assert_eq!(existing_id, "h1");
                assert!(title_similarity >= DEFAULT_FUZZY_THRESHOLD);
            }
            other => panic!("expected possible match, got {other:?}"),
        }
    }

    #[test]
    fn unknown_title_is_new_book() {
        let category = classify(
            ImportCandidate::new("Some Totally New Title"),
            &[matilda()],
            &[],
        );
        assert_eq!(category, MatchCategory::NewBook);
    }

    #[test]
    fn first_exact_match_in_catalog_order_wins() {
        let catalog = vec![
            book("a", "Matilda", None, None),
            book("b", "Matilda", Some("Roald Dahl"), Some("3.0")),
        ];
        let category = classify(ImportCandidate::new("MATILDA"), &catalog, &[]);
        assert_eq!(
            category,
            MatchCategory::Matched {
                existing_id: "a".to_string()
            }
        );
    }

    #[test]
    fn order_and_summary_follow_input() {
        let catalog = vec![matilda(), book("h1", "Holes", Some("Louis Sachar"), None)];
        let candidates = vec![
            ImportCandidate::new("Holes"),
            ImportCandidate::new("   "),
            ImportCandidate::new("Matilda").with_reading_level("5"),
            ImportCandidate::new("Wonder"),
            ImportCandidate::new("Matilda"),
        ];
        let preview = reconcile(
            &candidates,
            &catalog,
            &[selection("h1", true)],
            &ReconcileOptions::default(),
        );

        assert_eq!(
            preview.summary,
            PreviewSummary {
                total: 5,
                matched: 1,
                possible_matches: 0,
                new_books: 1,
                conflicts: 1,
                already_in_library: 1,
                skipped: 1,
            }
        );
        assert_eq!(preview.new_books[0].candidate.title, "Wonder");
        assert!(preview.new_books[0].existing.is_none());
        assert_eq!(preview.conflicts[0].existing.as_ref().unwrap().id, "m1");
    }

    #[test]
    fn validation_rejects_empty_and_titleless_lists() {
        assert!(matches!(
            validate_candidates(&[]),
            Err(ImportError::Validation(_))
        ));
        assert!(matches!(
            validate_candidates(&[ImportCandidate::new(" "), ImportCandidate::new("")]),
            Err(ImportError::Validation(_))
        ));
        assert!(validate_candidates(&[ImportCandidate::new(""), ImportCandidate::new("Holes")]).is_ok());
    }

    #[test]
    fn category_serializes_with_tag() {
        let category = MatchCategory::Matched {
            existing_id: "m1".to_string(),
        };
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["category"], "matched");
        assert_eq!(json["existingId"], "m1");
    }
}
