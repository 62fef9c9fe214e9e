//! Reader-profile book recommendations.
//!
//! Candidates are the organization's available books, minus what the reader
//! has read, dislikes, or is outside their reading-level range. The rest are
//! scored on genre preferences and reading-level fit and the top few are
//! returned with resolved genre names and a one-line reason.

pub mod filter;
pub mod scorer;

use shelfwise_catalog::types::ReaderProfile;
use shelfwise_db::{Connection, OperationError, genre_names, organization_books};
use thiserror::Error;

pub use filter::{filter_candidates, is_disliked, within_reading_range};
pub use scorer::{
    DEFAULT_LIMIT, GenreLookup, ProfileSummary, Recommendation, RecommendOptions,
    RecommendationResult, rank, score_book,
};

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
}

/// Recommend books from an organization's catalog for one reader.
pub fn recommend(
    conn: &Connection,
    organization_id: &str,
    profile: &ReaderProfile,
    options: &RecommendOptions,
) -> Result<RecommendationResult, RecommendError> {
    let books = organization_books(conn, organization_id)?;
    let names = genre_names(conn)?;
    log::debug!(
        "Scoring {} books from {} for reader {}",
        books.len(),
        organization_id,
        profile.student_id
    );

    let candidates = filter_candidates(books, profile);
    let lookup = GenreLookup::new(&names, profile);
    Ok(rank(candidates, profile, &lookup, options))
}
