//! Reranker for retrieved candidates
//!
//! Scores every retrieved candidate on all five features, fuses them into
//! a confidence and tier, and orders the results deterministically.

use crate::features::{FeatureError, FeatureExtractor, FeatureScores, SOFT_MATCH_THRESHOLD};
use crate::fusion::{MatchTier, ScoreFusion};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use spinematch_core::{Candidate, CandidateIndex, CatalogEntry, QueryContext};

/// Which strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Advanced,
    Legacy,
}

/// A scored catalog candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Insertion position of the entry in the fitted catalog
    pub position: usize,
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    /// Raw, unweighted sub-scores
    pub scores: FeatureScores,
    /// Fused confidence in [0, 1]
    pub confidence: f32,
    pub tier: MatchTier,
    /// Retained for inspection but not a reportable match
    pub below_threshold: bool,
    pub source: MatchSource,
}

impl MatchResult {
    pub fn from_entry(
        entry: &CatalogEntry,
        scores: FeatureScores,
        confidence: f32,
        threshold: f32,
        source: MatchSource,
    ) -> Self {
        Self {
            position: entry.position(),
            id: entry.id().to_string(),
            title: entry.title().to_string(),
            authors: entry.authors().to_vec(),
            scores,
            confidence,
            tier: MatchTier::from_confidence(confidence),
            below_threshold: confidence < threshold,
            source,
        }
    }

    /// Whether the result clears the caller's confidence threshold
    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        !self.below_threshold
    }
}

/// Order by confidence descending, ties by catalog insertion order.
pub fn sort_results(results: &mut [MatchResult]) {
    results.sort_by(|a, b| {
        OrderedFloat(b.confidence)
            .cmp(&OrderedFloat(a.confidence))
            .then_with(|| a.position.cmp(&b.position))
    });
}

/// Reranker that computes fused confidences for retrieved candidates
#[derive(Debug, Clone)]
pub struct Reranker {
    fusion: ScoreFusion,
    soft_threshold: f32,
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new(ScoreFusion::default())
    }
}

impl Reranker {
    /// Create a new reranker with the given fusion
    pub fn new(fusion: ScoreFusion) -> Self {
        Self {
            fusion,
            soft_threshold: SOFT_MATCH_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_soft_threshold(mut self, threshold: f32) -> Self {
        self.soft_threshold = threshold;
        self
    }

    #[inline]
    #[must_use]
    pub fn fusion(&self) -> &ScoreFusion {
        &self.fusion
    }

    /// Rerank candidates against the query
    ///
    /// Malformed candidates are skipped with a warning. Any other feature
    /// error aborts the whole rerank.
    ///
    /// # Returns
    /// Results sorted by confidence, ties by insertion position
    pub fn rerank(
        &self,
        index: &CandidateIndex,
        query: &QueryContext,
        candidates: &[Candidate],
        confidence_threshold: f32,
    ) -> Result<Vec<MatchResult>, FeatureError> {
        let extractor =
            FeatureExtractor::new(index.stats()).with_soft_threshold(self.soft_threshold);

        let scored: Vec<Result<Option<MatchResult>, FeatureError>> = candidates
            .par_iter()
            .map(|candidate| self.score(&extractor, index, query, candidate, confidence_threshold))
            .collect();

        let mut results = Vec::with_capacity(scored.len());
        for outcome in scored {
            if let Some(result) = outcome? {
                results.push(result);
            }
        }

        sort_results(&mut results);
        Ok(results)
    }

    fn score(
        &self,
        extractor: &FeatureExtractor<'_>,
        index: &CandidateIndex,
        query: &QueryContext,
        candidate: &Candidate,
        confidence_threshold: f32,
    ) -> Result<Option<MatchResult>, FeatureError> {
        let entry = index
            .entry(candidate.position)
            .ok_or(FeatureError::UnknownCandidate(candidate.position))?;

        let scores = match extractor.extract(query, entry, candidate.similarity) {
            Ok(scores) => scores,
            Err(e) if e.is_recoverable() => {
                tracing::warn!(position = entry.position(), error = %e, "Skipping candidate");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let (confidence, _) = self.fusion.fuse(&scores);
        if !confidence.is_finite() {
            return Err(FeatureError::InvalidScore {
                id: entry.id().to_string(),
                feature: "confidence",
                value: confidence,
            });
        }

        Ok(Some(MatchResult::from_entry(
            entry,
            scores,
            confidence,
            confidence_threshold,
            MatchSource::Advanced,
        )))
    }
}
