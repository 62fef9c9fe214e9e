//! Text normalization and string similarity.
//!
//! Two similarity measures are provided. [`similarity`] is the plain
//! Levenshtein ratio used for duplicate and fuzzy-match decisions.
//! [`title_relevance`] blends substring coverage, word overlap, and
//! character-bigram overlap, and is meant for ranking partial title matches
//! (a series name against a specific volume) rather than for yes/no decisions.

use std::collections::HashSet;

const COVERAGE_WEIGHT: f64 = 0.5;
const WORD_OVERLAP_WEIGHT: f64 = 0.3;
const BIGRAM_WEIGHT: f64 = 0.2;

/// Lowercase, drop everything that is not alphanumeric or whitespace, and
/// collapse whitespace runs to a single space.
///
/// `"  J.R.R.   Tolkien "` becomes `"jrr tolkien"`. Idempotent.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an optional field; `None` becomes the empty string.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

/// Levenshtein similarity ratio in `[0, 1]` between two normalized strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize(a), &normalize(b))
}

/// [`similarity`] for inputs that are already normalized.
pub(crate) fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    1.0 - strsim::levenshtein(a, b) as f64 / longest as f64
}

/// Weighted relevance of `candidate` to `query` for ranking title matches.
///
/// Combines substring coverage (0.5), word overlap (0.3), and
/// character-bigram Jaccard (0.2). Symmetric and in `[0, 1]`.
pub fn title_relevance(query: &str, candidate: &str) -> f64 {
    let a = normalize(query);
    let b = normalize(candidate);
    if a == b {
        return if a.is_empty() { 0.0 } else { 1.0 };
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    COVERAGE_WEIGHT * substring_coverage(&a, &b)
        + WORD_OVERLAP_WEIGHT * word_overlap(&a, &b)
        + BIGRAM_WEIGHT * bigram_jaccard(&a, &b)
}

/// Longest common substring as a fraction of the shorter string.
///
/// 1.0 whenever one string contains the other.
fn substring_coverage(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let shorter = a.len().min(b.len());
    if shorter == 0 {
        return 0.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut longest = 0;
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            longest = longest.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    longest as f64 / shorter as f64
}

/// Dice coefficient over the two word sets.
fn word_overlap(a: &str, b: &str) -> f64 {
    let wa: HashSet<&str> = a.split(' ').collect();
    let wb: HashSet<&str> = b.split(' ').collect();
    let shared = wa.intersection(&wb).count();
    2.0 * shared as f64 / (wa.len() + wb.len()) as f64
}

/// Jaccard index over character bigrams, ignoring spaces.
fn bigram_jaccard(a: &str, b: &str) -> f64 {
    let ba = bigrams(a);
    let bb = bigrams(b);
    if ba.is_empty() || bb.is_empty() {
        return 0.0;
    }
    let shared = ba.intersection(&bb).count();
    let union = ba.union(&bb).count();
    shared as f64 / union as f64
}

fn bigrams(s: &str) -> HashSet<(char, char)> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}
