//! Data model types for the book catalog.
//!
//! These types represent the persistent catalog schema (books, genres,
//! organization selections, import tracking) and the transient records that
//! flow through an import or recommendation request.

use serde::{Deserialize, Serialize};

// ── Catalog Book ────────────────────────────────────────────────────────────

/// A global, organization-independent catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogBook {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    /// Usually a decimal grade level ("3.5"), but free text is allowed.
    #[serde(default)]
    pub reading_level: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    /// Ordered, duplicate-free list of genre ids.
    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl CatalogBook {
    /// The reading level as a number, if it parses as one.
    pub fn numeric_reading_level(&self) -> Option<f64> {
        parse_reading_level(self.reading_level.as_deref()?)
    }
}

/// A book that has not been assigned an id yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub reading_level: Option<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewBook {
    /// Attach an id, producing the record as it will be stored.
    pub fn into_catalog_book(self, id: String) -> CatalogBook {
        CatalogBook {
            id,
            title: self.title,
            author: self.author,
            reading_level: self.reading_level,
            age_range: self.age_range,
            genre_ids: dedup_preserving_order(self.genre_ids),
            description: self.description,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}

/// Parse a reading level such as `"3.5"` or `" 4 "` into a number.
pub fn parse_reading_level(level: &str) -> Option<f64> {
    level.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn dedup_preserving_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

// ── Genre ───────────────────────────────────────────────────────────────────

/// A genre dictionary entry, used to resolve ids to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

// ── Organization Selection ──────────────────────────────────────────────────

/// An organization's link to a catalog book.
///
/// Unique per `(organization_id, book_id)`; re-linking updates the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSelection {
    pub id: i64,
    pub organization_id: String,
    pub book_id: String,
    pub is_available: bool,
    pub created_at: String,
    pub updated_at: String,
}

// ── Import ──────────────────────────────────────────────────────────────────

/// One row of a bulk import, before reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCandidate {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub reading_level: Option<String>,
}

impl ImportCandidate {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_reading_level(mut self, level: impl Into<String>) -> Self {
        self.reading_level = Some(level.into());
        self
    }
}

/// Log entry for a confirm or bulk-add run.
#[derive(Debug, Clone)]
pub struct ImportLog {
    pub id: i64,
    pub organization_id: String,
    pub source_type: String,
    pub source_name: String,
    pub imported_at: String,
    pub records_linked: i64,
    pub records_created: i64,
    pub records_updated: i64,
    pub errors: i64,
}

// ── Reader Profile ──────────────────────────────────────────────────────────

/// A genre inferred from a reader's history, with how often it appeared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredGenre {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

/// Aggregated preference and history data for one reader.
///
/// Built by the surrounding application; consumed by the recommender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderProfile {
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub favorite_genre_ids: Vec<String>,
    #[serde(default)]
    pub favorite_genre_names: Vec<String>,
    #[serde(default)]
    pub inferred_genres: Vec<InferredGenre>,
    #[serde(default)]
    pub reading_level_min: Option<f64>,
    #[serde(default)]
    pub reading_level_max: Option<f64>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub read_book_ids: Vec<String>,
}

impl ReaderProfile {
    /// The reading-level range, if both ends are set.
    pub fn reading_level_range(&self) -> Option<(f64, f64)> {
        match (self.reading_level_min, self.reading_level_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }
}
