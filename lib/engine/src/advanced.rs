//! N-gram retrieval plus multi-feature reranking.
//!
//! A fit builds a complete [`Snapshot`] off to the side and swaps it in
//! under a short write lock. Match calls clone the `Arc` and run without
//! holding any lock, so they always see exactly one fitted catalog.

use crate::config::{MatchOptions, MatcherConfig};
use crate::error::{MatchError, Result};
use crate::strategy::{FitSummary, MatchStrategy};
use parking_lot::RwLock;
use spinematch_core::{CandidateIndex, CandidateSource, CatalogRecord, QueryContext};
use spinematch_similarity::{MatchResult, MatchSource, Reranker, ScoreFusion};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable fitted state shared by concurrent match calls
struct Snapshot {
    index: CandidateIndex,
    reranker: Reranker,
}

pub struct AdvancedMatcher {
    config: MatcherConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl AdvancedMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            snapshot: RwLock::new(None),
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn is_fit(&self) -> bool {
        self.snapshot.read().is_some()
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.snapshot.read().clone().ok_or(MatchError::IndexNotFit)
    }

    fn build_reranker(&self) -> Result<Reranker> {
        let fusion = ScoreFusion::new(self.config.weights)?;
        let fusion = if self.config.use_character_ngrams {
            fusion
        } else {
            fusion.without_char_ngrams()?
        };
        Ok(Reranker::new(fusion).with_soft_threshold(self.config.soft_match_threshold))
    }

    pub fn fit_catalog(&self, catalog: &[CatalogRecord]) -> Result<FitSummary> {
        let reranker = self.build_reranker()?;
        let index = CandidateIndex::fit(catalog, self.config.index_config());

        let mut malformed = 0;
        for entry in index.entries() {
            if let Err(e) = entry.validate() {
                warn!(position = entry.position(), error = %e, "Catalog entry will never match");
                malformed += 1;
            }
        }

        let summary = FitSummary {
            entries: index.len(),
            malformed,
            ngram_vocabulary: index.stats().ngram_vocabulary_size(),
            token_vocabulary: index.stats().token_vocabulary_size(),
        };

        if index.is_empty() {
            info!("Fitted an empty catalog; every match will return no results");
        }

        let snapshot = Arc::new(Snapshot { index, reranker });
        *self.snapshot.write() = Some(snapshot);

        info!(
            entries = summary.entries,
            malformed = summary.malformed,
            ngrams = summary.ngram_vocabulary,
            tokens = summary.token_vocabulary,
            "Catalog fitted"
        );
        Ok(summary)
    }

    /// Run a prepared query against the current snapshot
    pub fn match_context(
        &self,
        query: &QueryContext,
        options: &MatchOptions,
    ) -> Result<Vec<MatchResult>> {
        options.validate()?;
        if query.is_empty() {
            debug!("Empty query, no results");
            return Ok(Vec::new());
        }

        let snapshot = self.snapshot()?;
        if snapshot.index.is_empty() {
            return Ok(Vec::new());
        }

        let pool = self.config.candidate_pool(options.top_k);
        let candidates = snapshot.index.retrieve(query.variant_texts(), pool);
        debug!(
            normalized = %query.normalized(),
            variants = query.variant_count(),
            pool,
            retrieved = candidates.len(),
            "Candidates retrieved"
        );

        let mut results = snapshot.reranker.rerank(
            &snapshot.index,
            query,
            &candidates,
            options.confidence_threshold,
        )?;
        results.truncate(options.top_k);
        Ok(results)
    }
}

impl MatchStrategy for AdvancedMatcher {
    fn source(&self) -> MatchSource {
        MatchSource::Advanced
    }

    fn fit(&self, catalog: &[CatalogRecord]) -> Result<FitSummary> {
        self.fit_catalog(catalog)
    }

    fn match_query(&self, query: &str, options: &MatchOptions) -> Result<Vec<MatchResult>> {
        let context = QueryContext::new(query, self.config.max_confusion_variants);
        self.match_context(&context, options)
    }
}
