//! Author suggestions for titles imported without one.

use std::collections::HashMap;

use serde::Serialize;
use shelfwise_catalog::types::CatalogBook;

use crate::similarity::{normalize, title_relevance};

/// Blended title relevance below which a book is not considered.
pub const MIN_SUGGESTION_SCORE: f64 = 0.3;

/// A candidate author, with the catalog book that suggested it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSuggestion {
    pub author: String,
    pub matched_title: String,
    pub book_id: String,
    pub score: f64,
}

/// Rank the authors of catalog books whose titles resemble `title`.
///
/// Each author appears once, with its best-scoring book. Ties keep catalog
/// order.
pub fn suggest_authors(title: &str, catalog: &[CatalogBook], limit: usize) -> Vec<AuthorSuggestion> {
    if normalize(title).is_empty() {
        return Vec::new();
    }

    let mut best: Vec<AuthorSuggestion> = Vec::new();
    let mut by_author: HashMap<String, usize> = HashMap::new();

    for book in catalog {
        let Some(author) = book.author.as_deref().filter(|a| !a.trim().is_empty()) else {
            continue;
        };
        let score = title_relevance(title, &book.title);
        if score < MIN_SUGGESTION_SCORE {
            continue;
        }

        let suggestion = AuthorSuggestion {
            author: author.trim().to_string(),
            matched_title: book.title.clone(),
            book_id: book.id.clone(),
            score,
        };
        match by_author.get(&normalize(author)) {
            Some(&i) if best[i].score >= score => {}
            Some(&i) => best[i] = suggestion,
            None => {
                by_author.insert(normalize(author), best.len());
                best.push(suggestion);
            }
        }
    }

    best.sort_by(|a, b| b.score.total_cmp(&a.score));
    best.truncate(limit);
    best
}
