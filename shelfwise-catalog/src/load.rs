//! Loaders for import files: candidate and book CSVs, reader-profile JSON.
//!
//! CSV files are matched by header name (case-insensitive), so column order
//! does not matter and extra columns are ignored. Rows that cannot be read
//! are logged and skipped rather than failing the whole file.

use std::path::Path;

use thiserror::Error;

use crate::types::{ImportCandidate, NewBook, ReaderProfile};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
}

/// Header positions for the columns we understand.
struct Columns {
    title: usize,
    author: Option<usize>,
    reading_level: Option<usize>,
    age_range: Option<usize>,
    genre_ids: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |names: &[&str]| {
            headers.iter().position(|h| {
                let h = h.trim().to_lowercase();
                names.iter().any(|n| h == *n)
            })
        };
        Ok(Self {
            title: find(&["title"]).ok_or(LoadError::MissingColumn("title"))?,
            author: find(&["author"]),
            reading_level: find(&["reading_level", "readinglevel", "reading level", "level"]),
            age_range: find(&["age_range", "agerange", "age range"]),
            genre_ids: find(&["genre_ids", "genreids", "genres"]),
            description: find(&["description"]),
        })
    }
}

/// Read a trimmed, non-empty field.
fn field(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    let value = record.get(index?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn reader(content: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes())
}

/// Load import candidates from a CSV file.
pub fn load_candidates_csv(path: &Path) -> Result<Vec<ImportCandidate>, LoadError> {
    parse_candidates_csv(&read_file(path)?)
}

/// Parse import candidates from CSV content with a `title` header.
///
/// Rows with an empty title are kept; reconciliation skips them.
pub fn parse_candidates_csv(content: &str) -> Result<Vec<ImportCandidate>, LoadError> {
    let mut reader = reader(content);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut candidates = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed candidate row {}: {e}", row + 1);
                continue;
            }
        };
        candidates.push(ImportCandidate {
            title: record.get(columns.title).unwrap_or("").trim().to_string(),
            author: field(&record, columns.author),
            reading_level: field(&record, columns.reading_level),
        });
    }

    Ok(candidates)
}

/// Load books for the bulk-add path from a CSV file.
pub fn load_books_csv(path: &Path) -> Result<Vec<NewBook>, LoadError> {
    parse_books_csv(&read_file(path)?)
}

/// Parse books from CSV content.
///
/// `genre_ids` holds several ids separated by `;` or `|`. Rows without a
/// title are logged and skipped.
pub fn parse_books_csv(content: &str) -> Result<Vec<NewBook>, LoadError> {
    let mut reader = reader(content);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut books = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed book row {}: {e}", row + 1);
                continue;
            }
        };
        let Some(title) = field(&record, Some(columns.title)) else {
            log::warn!("Skipping book row {} with no title", row + 1);
            continue;
        };
        let genre_ids = field(&record, columns.genre_ids)
            .map(|raw| {
                raw.split(['|', ';'])
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        books.push(NewBook {
            title,
            author: field(&record, columns.author),
            reading_level: field(&record, columns.reading_level),
            age_range: field(&record, columns.age_range),
            genre_ids,
            description: field(&record, columns.description),
        });
    }

    Ok(books)
}

/// Load a reader profile from a JSON file.
pub fn load_profile_json(path: &Path) -> Result<ReaderProfile, LoadError> {
    let contents = read_file(path)?;
    serde_json::from_str(&contents).map_err(|e| LoadError::Json {
        path: path.display().to_string(),
        source: e,
    })
}
