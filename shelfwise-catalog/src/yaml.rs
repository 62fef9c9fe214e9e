//! YAML loading for the human-curated genre dictionary.
//!
//! The dictionary is a single YAML sequence of `{ id, name }` entries,
//! typically kept at `catalog/genres.yaml`.

use crate::types::Genre;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum YamlError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yml::Error,
    },
    #[error("Duplicate genre id '{id}' in {path}")]
    DuplicateId { path: String, id: String },
}

/// Load the genre dictionary from a YAML file.
///
/// A missing file yields an empty dictionary.
pub fn load_genres(path: &Path) -> Result<Vec<Genre>, YamlError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| YamlError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let genres: Vec<Genre> = serde_yml::from_str(&contents).map_err(|e| YamlError::Parse {
        path: path.display().to_string(),
        source: e,
    })?;

    let mut seen = std::collections::HashSet::new();
    for genre in &genres {
        if !seen.insert(genre.id.as_str()) {
            return Err(YamlError::DuplicateId {
                path: path.display().to_string(),
                id: genre.id.clone(),
            });
        }
    }

    Ok(genres)
}
