//! Per-candidate feature extraction
//!
//! Five independent signals, each in [0.0, 1.0]:
//!
//! - **char_ngram**: best-variant cosine from retrieval, reused as is
//! - **token_set**: Jaccard over title tokens
//! - **soft_overlap**: IDF-weighted fuzzy token overlap (soft-TFIDF)
//! - **author**: Jaro-Winkler between query tokens and author last names
//! - **distinctive**: coverage of the candidate's rarest title tokens
//!
//! Features are computed for every query variant and the maximum is kept
//! per feature, so raw values never depend on fusion weights.

use crate::distance::{best_fuzzy_match, fuzzy_contains, jaro_winkler, token_jaccard};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use spinematch_core::{CatalogEntry, CorpusStatistics, QueryContext};
use thiserror::Error;

/// Jaro-Winkler similarity at which two tokens count as the same word
pub const SOFT_MATCH_THRESHOLD: f32 = 0.88;

/// Query tokens shorter than this never count as author evidence
pub const MIN_AUTHOR_TOKEN_LEN: usize = 3;

/// Errors raised while scoring one candidate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Candidate {id} has no usable title")]
    MissingTitle { id: String },

    #[error("Candidate {id} produced an invalid {feature} score: {value}")]
    InvalidScore {
        id: String,
        feature: &'static str,
        value: f32,
    },

    #[error("Candidate position {0} is not in the index")]
    UnknownCandidate(usize),
}

impl FeatureError {
    /// Malformed candidates can be skipped; anything else is an engine fault.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeatureError::MissingTitle { .. })
    }
}

/// The five raw sub-scores for one (query, candidate) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureScores {
    pub char_ngram: f32,
    pub token_set: f32,
    pub soft_overlap: f32,
    pub author: f32,
    pub distinctive: f32,
}

impl FeatureScores {
    pub const NAMES: [&'static str; 5] = [
        "char_ngram",
        "token_set",
        "soft_overlap",
        "author",
        "distinctive",
    ];

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> [f32; 5] {
        [
            self.char_ngram,
            self.token_set,
            self.soft_overlap,
            self.author,
            self.distinctive,
        ]
    }

    /// Per-feature maximum of two score sets
    #[must_use]
    pub fn max(self, other: FeatureScores) -> FeatureScores {
        FeatureScores {
            char_ngram: self.char_ngram.max(other.char_ngram),
            token_set: self.token_set.max(other.token_set),
            soft_overlap: self.soft_overlap.max(other.soft_overlap),
            author: self.author.max(other.author),
            distinctive: self.distinctive.max(other.distinctive),
        }
    }

    /// First feature that is non-finite or outside [0, 1]
    pub fn first_invalid(&self) -> Option<(&'static str, f32)> {
        Self::NAMES
            .iter()
            .zip(self.as_array())
            .find(|(_, v)| !v.is_finite() || *v < 0.0 || *v > 1.0)
            .map(|(name, v)| (*name, v))
    }
}

/// Computes [`FeatureScores`] against shared, immutable corpus statistics
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'a> {
    stats: &'a CorpusStatistics,
    soft_threshold: f32,
}

impl<'a> FeatureExtractor<'a> {
    pub fn new(stats: &'a CorpusStatistics) -> Self {
        Self {
            stats,
            soft_threshold: SOFT_MATCH_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_soft_threshold(mut self, threshold: f32) -> Self {
        self.soft_threshold = threshold;
        self
    }

    /// Score one candidate.
    ///
    /// `char_similarity` is the retrieval cosine for the best variant.
    pub fn extract(
        &self,
        query: &QueryContext,
        entry: &CatalogEntry,
        char_similarity: f32,
    ) -> Result<FeatureScores, FeatureError> {
        if entry.tokens().is_empty() {
            return Err(FeatureError::MissingTitle {
                id: entry.id().to_string(),
            });
        }

        let mut scores = FeatureScores {
            char_ngram: char_similarity.clamp(0.0, 1.0),
            ..FeatureScores::default()
        };
        for (_, tokens) in query.variants() {
            scores = scores.max(self.extract_variant(tokens, entry));
        }

        if let Some((feature, value)) = scores.first_invalid() {
            return Err(FeatureError::InvalidScore {
                id: entry.id().to_string(),
                feature,
                value,
            });
        }
        Ok(scores)
    }

    fn extract_variant(&self, tokens: &[String], entry: &CatalogEntry) -> FeatureScores {
        let (title_side, attributed) = self.partition_author_tokens(tokens, entry);
        FeatureScores {
            char_ngram: 0.0,
            token_set: token_jaccard(&title_side, entry.tokens()),
            soft_overlap: self.soft_tfidf(&title_side, entry.tokens()),
            author: if attributed.is_empty() {
                0.0
            } else {
                self.author_similarity(tokens, entry)
            },
            distinctive: self.distinctive_coverage(tokens, entry),
        }
    }

    /// Split query tokens into title-side tokens and tokens explained by
    /// the candidate's author names.
    pub fn partition_author_tokens(
        &self,
        tokens: &[String],
        entry: &CatalogEntry,
    ) -> (Vec<String>, Vec<String>) {
        tokens.iter().cloned().partition(|token| {
            !(token.chars().count() >= MIN_AUTHOR_TOKEN_LEN
                && !entry.tokens().contains(token)
                && entry
                    .author_tokens()
                    .iter()
                    .any(|name| jaro_winkler(token, name) >= self.soft_threshold))
        })
    }

    /// Soft-TFIDF: accepted fuzzy pairs weighted by `idf(q) * idf(c) * sim`,
    /// normalized by the query's own IDF mass `sum(idf(q)^2)`.
    pub fn soft_tfidf(&self, query_tokens: &[String], candidate_tokens: &[String]) -> f32 {
        let mut accepted = 0.0f32;
        let mut mass = 0.0f32;

        for token in query_tokens {
            let q_idf = self.stats.token_idf(token);
            mass += q_idf * q_idf;

            if let Some((best, sim)) = best_fuzzy_match(token, candidate_tokens) {
                if sim >= self.soft_threshold {
                    accepted += q_idf * self.stats.token_idf(best) * sim;
                }
            }
        }

        if mass <= 0.0 {
            return 0.0;
        }
        (accepted / mass).clamp(0.0, 1.0)
    }

    /// Best Jaro-Winkler between a query token and an author last name.
    pub fn author_similarity(&self, query_tokens: &[String], entry: &CatalogEntry) -> f32 {
        query_tokens
            .iter()
            .filter(|t| t.chars().count() >= MIN_AUTHOR_TOKEN_LEN)
            .flat_map(|t| {
                entry
                    .author_last_names()
                    .iter()
                    .map(move |last| jaro_winkler(t, last))
            })
            .fold(0.0f32, f32::max)
    }

    /// The candidate's top-quartile tokens by IDF (at least one, ties kept).
    pub fn distinctive_tokens<'e>(&self, entry: &'e CatalogEntry) -> Vec<&'e str> {
        let mut ranked: Vec<(f32, usize, &str)> = entry
            .tokens()
            .iter()
            .enumerate()
            .map(|(i, t)| (self.stats.token_idf(t), i, t.as_str()))
            .collect();
        if ranked.is_empty() {
            return Vec::new();
        }
        ranked.sort_by(|a, b| {
            OrderedFloat(b.0)
                .cmp(&OrderedFloat(a.0))
                .then_with(|| a.1.cmp(&b.1))
        });

        let k = ranked.len().div_ceil(4).max(1);
        let cutoff = ranked[k - 1].0;
        ranked
            .into_iter()
            .take_while(|(idf, _, _)| *idf >= cutoff)
            .map(|(_, _, t)| t)
            .collect()
    }

    /// Fraction of distinctive tokens present in the query, exactly or fuzzily.
    pub fn distinctive_coverage(&self, query_tokens: &[String], entry: &CatalogEntry) -> f32 {
        let distinctive = self.distinctive_tokens(entry);
        if distinctive.is_empty() {
            return 0.0;
        }
        let covered = distinctive
            .iter()
            .filter(|t| fuzzy_contains(t, query_tokens, self.soft_threshold))
            .count();
        covered as f32 / distinctive.len() as f32
    }
}
