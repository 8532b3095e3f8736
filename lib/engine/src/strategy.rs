use crate::config::MatchOptions;
use crate::error::Result;
use serde::Serialize;
use spinematch_core::CatalogRecord;
use spinematch_similarity::{MatchResult, MatchSource};

/// Counts describing a completed fit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FitSummary {
    pub entries: usize,
    /// Entries whose title is empty after normalization
    pub malformed: usize,
    pub ngram_vocabulary: usize,
    pub token_vocabulary: usize,
}

/// A matching strategy the orchestrator can fit and query.
pub trait MatchStrategy: Send + Sync {
    fn source(&self) -> MatchSource;

    /// Replace the fitted catalog wholesale
    fn fit(&self, catalog: &[CatalogRecord]) -> Result<FitSummary>;

    /// Ranked results for one query
    fn match_query(&self, query: &str, options: &MatchOptions) -> Result<Vec<MatchResult>>;
}
