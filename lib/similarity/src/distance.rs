//! Token and string similarity functions
//!
//! All functions return a similarity score in range [0.0, 1.0] where 1.0
//! means identical. Inputs are expected to be normalized already.

/// Calculate Jaro-Winkler similarity between two tokens
///
/// # Arguments
/// * `a` - First token
/// * `b` - Second token
///
/// # Returns
/// Similarity score in [0.0, 1.0], favoring shared prefixes
#[inline]
pub fn jaro_winkler(a: &str, b: &str) -> f32 {
    if a == b {
        return 1.0;
    }
    (strsim::jaro_winkler(a, b) as f32).clamp(0.0, 1.0)
}

/// Calculate normalized Levenshtein similarity over whole strings
///
/// # Returns
/// `1 - edit_distance / max_len`, or 1.0 when both strings are empty
#[inline]
pub fn edit_similarity(a: &str, b: &str) -> f32 {
    (strsim::normalized_levenshtein(a, b) as f32).clamp(0.0, 1.0)
}

/// Calculate Jaccard similarity between two distinct token lists
///
/// Both slices are treated as sets. Returns 0.0 when either side is empty.
pub fn token_jaccard(a: &[String], b: &[String]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.iter().filter(|t| b.contains(t)).count();
    let union = a.len() + b.len() - intersection;

    intersection as f32 / union as f32
}

/// Fraction of `query` tokens that also appear in `target`
pub fn token_coverage(query: &[String], target: &[String]) -> f32 {
    if query.is_empty() {
        return 0.0;
    }
    let covered = query.iter().filter(|t| target.contains(t)).count();
    covered as f32 / query.len() as f32
}

/// Find the candidate token most similar to `token`
///
/// Exact matches win immediately. Ties keep the earliest candidate.
///
/// # Returns
/// The best candidate and its Jaro-Winkler similarity, or `None` if
/// `candidates` is empty
pub fn best_fuzzy_match<'a>(token: &str, candidates: &'a [String]) -> Option<(&'a str, f32)> {
    let mut best: Option<(&'a str, f32)> = None;
    for candidate in candidates {
        if candidate == token {
            return Some((candidate.as_str(), 1.0));
        }
        let sim = jaro_winkler(token, candidate);
        if best.map_or(true, |(_, s)| sim > s) {
            best = Some((candidate.as_str(), sim));
        }
    }
    best
}

/// Whether `token` matches any candidate exactly or with Jaro-Winkler
/// similarity at or above `threshold`
#[inline]
pub fn fuzzy_contains(token: &str, candidates: &[String], threshold: f32) -> bool {
    candidates
        .iter()
        .any(|c| c == token || jaro_winkler(token, c) >= threshold)
}
