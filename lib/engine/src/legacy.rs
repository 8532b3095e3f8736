//! Simple whole-catalog fuzzy matcher used as the fallback strategy.
//!
//! No index and no corpus statistics: every entry is scored with token
//! overlap, edit similarity and a token-sorted Jaro-Winkler, then penalized
//! for length mismatch and weak overlap. Only an exact normalized title
//! reaches 1.0; everything else is capped at 0.95.

use crate::config::MatchOptions;
use crate::error::{MatchError, Result};
use crate::strategy::{FitSummary, MatchStrategy};
use parking_lot::RwLock;
use rayon::prelude::*;
use spinematch_core::{normalize, CatalogEntry, CatalogRecord, NormalizedText};
use spinematch_similarity::distance::{edit_similarity, jaro_winkler, token_coverage, token_jaccard};
use spinematch_similarity::{sort_results, FeatureScores, MatchResult, MatchSource};
use std::sync::Arc;
use tracing::info;

const TOKEN_WEIGHT: f32 = 0.45;
const CHAR_WEIGHT: f32 = 0.30;
const SORTED_WEIGHT: f32 = 0.25;
const SCORE_CAP: f32 = 0.95;

struct LegacyEntry {
    entry: CatalogEntry,
    // tokens of the title plus authors
    tokens: Vec<String>,
    sorted: String,
}

fn sorted_tokens(tokens: &[String]) -> String {
    let mut sorted: Vec<&str> = tokens.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.join(" ")
}

impl LegacyEntry {
    fn new(entry: CatalogEntry) -> Self {
        let tokens = entry.search_text().tokens();
        let sorted = sorted_tokens(&tokens);
        Self {
            entry,
            tokens,
            sorted,
        }
    }

    /// Sub-scores and final score, or `None` for an unscorable entry
    fn score(&self, query: &NormalizedText, query_tokens: &[String]) -> Option<(FeatureScores, f32)> {
        if self.entry.tokens().is_empty() {
            return None;
        }

        if query == self.entry.normalized_title() {
            let exact = FeatureScores {
                char_ngram: 1.0,
                token_set: 1.0,
                soft_overlap: 1.0,
                ..FeatureScores::default()
            };
            return Some((exact, 1.0));
        }

        let token = 0.6 * token_jaccard(query_tokens, &self.tokens)
            + 0.4 * token_coverage(query_tokens, &self.tokens);
        let char_sim = edit_similarity(query.as_str(), self.entry.search_text().as_str());
        let sorted = jaro_winkler(&sorted_tokens(query_tokens), &self.sorted);

        let mut score = TOKEN_WEIGHT * token + CHAR_WEIGHT * char_sim + SORTED_WEIGHT * sorted;
        if query_tokens.len() > 2 * self.entry.tokens().len() {
            score *= 0.8;
        }
        if token < 0.3 && char_sim < 0.3 {
            score *= 0.7;
        }

        let scores = FeatureScores {
            char_ngram: char_sim,
            token_set: token,
            soft_overlap: sorted,
            ..FeatureScores::default()
        };
        Some((scores, score.clamp(0.0, SCORE_CAP)))
    }
}

#[derive(Default)]
pub struct LegacyMatcher {
    entries: RwLock<Option<Arc<Vec<LegacyEntry>>>>,
}

impl LegacyMatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStrategy for LegacyMatcher {
    fn source(&self) -> MatchSource {
        MatchSource::Legacy
    }

    fn fit(&self, catalog: &[CatalogRecord]) -> Result<FitSummary> {
        let entries: Vec<LegacyEntry> = catalog
            .iter()
            .cloned()
            .enumerate()
            .map(|(position, record)| LegacyEntry::new(CatalogEntry::from_record(position, record)))
            .collect();

        let summary = FitSummary {
            entries: entries.len(),
            malformed: entries.iter().filter(|e| e.entry.tokens().is_empty()).count(),
            ..FitSummary::default()
        };

        *self.entries.write() = Some(Arc::new(entries));
        info!(entries = summary.entries, "Legacy matcher fitted");
        Ok(summary)
    }

    fn match_query(&self, query: &str, options: &MatchOptions) -> Result<Vec<MatchResult>> {
        options.validate()?;
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }

        let entries = self.entries.read().clone().ok_or(MatchError::IndexNotFit)?;
        let query_tokens = normalized.tokens();

        let mut results: Vec<MatchResult> = entries
            .par_iter()
            .filter_map(|legacy| {
                let (scores, confidence) = legacy.score(&normalized, &query_tokens)?;
                Some(MatchResult::from_entry(
                    &legacy.entry,
                    scores,
                    confidence,
                    options.confidence_threshold,
                    MatchSource::Legacy,
                ))
            })
            .filter(|r| r.confidence > 0.0)
            .collect();

        sort_results(&mut results);
        results.truncate(options.top_k);
        Ok(results)
    }
}
