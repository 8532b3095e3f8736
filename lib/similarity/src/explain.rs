//! Explainability for match results
//!
//! Wraps a ranked result list with the normalized query and the variants
//! that were tried, so a caller can see why a spine matched (or did not).

use crate::rerank::MatchResult;
use serde::Serialize;
use spinematch_core::QueryContext;

/// A full account of one match call
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    /// Raw query as received
    pub query: String,
    pub normalized_query: String,
    /// Confusion variants tried, original first
    pub variants: Vec<String>,
    pub results: Vec<MatchResult>,
}

impl MatchReport {
    /// Create a report from a query context and its ranked results
    pub fn new(query: &QueryContext, results: Vec<MatchResult>) -> Self {
        Self {
            query: query.raw().to_string(),
            normalized_query: query.normalized().to_string(),
            variants: query.variant_texts().iter().map(ToString::to_string).collect(),
            results,
        }
    }

    /// Top result if it clears the confidence threshold
    pub fn confident_match(&self) -> Option<&MatchResult> {
        self.results.first().filter(|r| r.is_match())
    }

    /// Results that clear the threshold, in rank order
    pub fn matches(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.is_match())
    }

    /// One-line human readable outcome
    pub fn summary(&self) -> String {
        match self.confident_match() {
            Some(best) => format!(
                "Confident match: {} ({}, confidence {:.3})",
                best.title, best.tier, best.confidence
            ),
            None => match self.results.first() {
                Some(best) => format!(
                    "No confident match; best candidate {} ({}, confidence {:.3})",
                    best.title, best.tier, best.confidence
                ),
                None => "No candidates".to_string(),
            },
        }
    }
}
