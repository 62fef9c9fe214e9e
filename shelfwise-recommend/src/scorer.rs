//! Scoring, ranking, and presentation of recommendations.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use shelfwise_catalog::types::{CatalogBook, ReaderProfile};

/// Number of books returned by default.
pub const DEFAULT_LIMIT: usize = 10;

const FAVORITE_GENRE_POINTS: u32 = 3;
const INFERRED_GENRE_POINTS: u32 = 2;
const READING_LEVEL_POINTS: u32 = 1;

#[derive(Debug, Clone)]
pub struct RecommendOptions {
    pub limit: usize,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

// ── Genre Names ─────────────────────────────────────────────────────────────

/// Resolves genre ids to display names.
///
/// The genre dictionary is consulted first, then the names the profile
/// carries for its own favorite and inferred genres.
pub struct GenreLookup<'a> {
    dictionary: &'a HashMap<String, String>,
    from_profile: HashMap<&'a str, &'a str>,
}

impl<'a> GenreLookup<'a> {
    pub fn new(dictionary: &'a HashMap<String, String>, profile: &'a ReaderProfile) -> Self {
        let favorites = profile
            .favorite_genre_ids
            .iter()
            .zip(&profile.favorite_genre_names)
            .map(|(id, name)| (id.as_str(), name.as_str()));
        let inferred = profile
            .inferred_genres
            .iter()
            .map(|g| (g.id.as_str(), g.name.as_str()));
        let from_profile = favorites
            .chain(inferred)
            .filter(|(_, name)| !name.trim().is_empty())
            .collect();
        Self {
            dictionary,
            from_profile,
        }
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.dictionary
            .get(id)
            .map(String::as_str)
            .or_else(|| self.from_profile.get(id).copied())
    }

    /// Names for the given ids, dropping any that do not resolve.
    pub fn names<'s>(&self, ids: impl IntoIterator<Item = &'s String>) -> Vec<String> {
        ids.into_iter()
            .filter_map(|id| self.name(id))
            .map(str::to_string)
            .collect()
    }
}

// ── Scoring ─────────────────────────────────────────────────────────────────

/// The profile's preferences in lookup form.
struct Preferences<'a> {
    favorites: HashSet<&'a str>,
    inferred: HashSet<&'a str>,
    /// Range center and half-width.
    level_window: Option<(f64, f64)>,
}

impl<'a> Preferences<'a> {
    fn of(profile: &'a ReaderProfile) -> Self {
        Self {
            favorites: profile.favorite_genre_ids.iter().map(String::as_str).collect(),
            inferred: profile.inferred_genres.iter().map(|g| g.id.as_str()).collect(),
            level_window: profile
                .reading_level_range()
                .map(|(min, max)| ((min + max) / 2.0, (max - min) / 2.0)),
        }
    }
}

/// How a book scored, and why.
struct Score<'b> {
    points: u32,
    first_favorite: Option<&'b str>,
    first_inferred: Option<&'b str>,
    level_match: bool,
}

fn evaluate<'b>(book: &'b CatalogBook, prefs: &Preferences<'_>) -> Score<'b> {
    let mut score = Score {
        points: 0,
        first_favorite: None,
        first_inferred: None,
        level_match: false,
    };

    for genre in &book.genre_ids {
        if prefs.favorites.contains(genre.as_str()) {
            score.points += FAVORITE_GENRE_POINTS;
            score.first_favorite.get_or_insert(genre.as_str());
        } else if prefs.inferred.contains(genre.as_str()) {
            score.points += INFERRED_GENRE_POINTS;
            score.first_inferred.get_or_insert(genre.as_str());
        }
    }

    if let (Some((center, half_width)), Some(level)) =
        (prefs.level_window, book.numeric_reading_level())
    {
        // centered half of the range
        if (level - center).abs() <= half_width * 0.5 {
            score.points += READING_LEVEL_POINTS;
            score.level_match = true;
        }
    }

    score
}

/// Score one book against a profile.
pub fn score_book(book: &CatalogBook, profile: &ReaderProfile) -> u32 {
    evaluate(book, &Preferences::of(profile)).points
}

fn match_reason(score: &Score<'_>, lookup: &GenreLookup<'_>) -> String {
    if let Some(genre) = score.first_favorite {
        return match lookup.name(genre) {
            Some(name) => format!("Matches your favorite genre: {name}"),
            None => "Matches one of your favorite genres".to_string(),
        };
    }
    if let Some(genre) = score.first_inferred {
        return match lookup.name(genre) {
            Some(name) => format!("Similar to books you've read in {name}"),
            None => "Similar to books you've read".to_string(),
        };
    }
    if score.level_match {
        return "Matches your reading level".to_string();
    }
    "Available in your library".to_string()
}

// ── Results ─────────────────────────────────────────────────────────────────

/// A recommended book with display genres and the reason it was picked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub book: CatalogBook,
    pub genres: Vec<String>,
    pub match_reason: String,
    pub score: u32,
}

/// What the recommendations were based on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub student_id: String,
    pub student_name: Option<String>,
    pub favorite_genres: Vec<String>,
    pub inferred_genres: Vec<String>,
    pub reading_level_min: Option<f64>,
    pub reading_level_max: Option<f64>,
    pub books_read: usize,
    /// Books left after filtering, before the limit was applied.
    pub candidates: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub books: Vec<Recommendation>,
    pub profile_summary: ProfileSummary,
}

fn summarize(profile: &ReaderProfile, lookup: &GenreLookup<'_>, candidates: usize) -> ProfileSummary {
    let favorite_genres = if profile.favorite_genre_names.is_empty() {
        lookup.names(&profile.favorite_genre_ids)
    } else {
        profile.favorite_genre_names.clone()
    };
    let inferred_genres = profile
        .inferred_genres
        .iter()
        .filter_map(|g| lookup.name(&g.id))
        .map(str::to_string)
        .collect();

    ProfileSummary {
        student_id: profile.student_id.clone(),
        student_name: profile.student_name.clone(),
        favorite_genres,
        inferred_genres,
        reading_level_min: profile.reading_level_min,
        reading_level_max: profile.reading_level_max,
        books_read: profile.read_book_ids.len(),
        candidates,
    }
}

/// Score already-filtered candidates and keep the best `options.limit`.
///
/// Ties keep the candidates' original order.
pub fn rank(
    candidates: Vec<CatalogBook>,
    profile: &ReaderProfile,
    lookup: &GenreLookup<'_>,
    options: &RecommendOptions,
) -> RecommendationResult {
    let prefs = Preferences::of(profile);
    let total = candidates.len();

    let mut scored: Vec<(u32, usize)> = candidates
        .iter()
        .enumerate()
        .map(|(i, book)| (evaluate(book, &prefs).points, i))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(options.limit);

    let books = scored
        .into_iter()
        .map(|(_, i)| {
            let book = &candidates[i];
            let score = evaluate(book, &prefs);
            Recommendation {
                genres: lookup.names(&book.genre_ids),
                match_reason: match_reason(&score, lookup),
                score: score.points,
                book: book.clone(),
            }
        })
        .collect();

    RecommendationResult {
        books,
        profile_summary: summarize(profile, lookup, total),
    }
}
