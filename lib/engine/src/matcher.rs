//! Public entry point: owns the strategies and applies the fallback policy.

use crate::advanced::AdvancedMatcher;
use crate::config::{MatchOptions, MatcherConfig};
use crate::error::{MatchError, Result};
use crate::legacy::LegacyMatcher;
use crate::strategy::{FitSummary, MatchStrategy};
use parking_lot::Mutex;
use rayon::prelude::*;
use spinematch_core::{CatalogRecord, QueryContext};
use spinematch_similarity::{MatchReport, MatchResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Matcher orchestrator
///
/// Queries go to the primary strategy. When it reports an
/// [`MatchError::EngineFailure`] and a fallback is configured, the fallback
/// answers instead. Any other error is returned as is.
pub struct Matcher {
    config: MatcherConfig,
    primary: Arc<dyn MatchStrategy>,
    fallback: Option<Arc<dyn MatchStrategy>>,
    // serializes fits so both strategies always hold the same catalog
    fit_lock: Mutex<()>,
}

impl Matcher {
    /// Advanced matcher, plus the legacy matcher when
    /// `enable_legacy_fallback` is set
    pub fn new(config: MatcherConfig) -> Result<Self> {
        let primary: Arc<dyn MatchStrategy> = Arc::new(AdvancedMatcher::new(config.clone())?);
        let fallback: Option<Arc<dyn MatchStrategy>> = if config.enable_legacy_fallback {
            Some(Arc::new(LegacyMatcher::new()))
        } else {
            None
        };
        Ok(Self {
            config,
            primary,
            fallback,
            fit_lock: Mutex::new(()),
        })
    }

    pub fn with_strategies(
        config: MatcherConfig,
        primary: Arc<dyn MatchStrategy>,
        fallback: Option<Arc<dyn MatchStrategy>>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            primary,
            fallback,
            fit_lock: Mutex::new(()),
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Fit every strategy on `catalog`. Only a primary failure is returned.
    ///
    /// The fallback is fitted before the primary, so a query that reaches
    /// the fallback through a freshly fitted primary never sees an older
    /// catalog.
    pub fn fit(&self, catalog: &[CatalogRecord]) -> Result<FitSummary> {
        let _guard = self.fit_lock.lock();
        if let Some(fallback) = &self.fallback {
            if let Err(e) = fallback.fit(catalog) {
                warn!(error = %e, strategy = ?fallback.source(), "Fallback matcher failed to fit");
            }
        }
        self.primary.fit(catalog)
    }

    /// Match with the configured `top_k` and threshold
    pub fn match_query(&self, query: &str) -> Result<Vec<MatchResult>> {
        self.match_with(query, &self.config.options())
    }

    pub fn match_with(&self, query: &str, options: &MatchOptions) -> Result<Vec<MatchResult>> {
        match self.primary.match_query(query, options) {
            Err(MatchError::EngineFailure(reason)) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        %reason,
                        strategy = ?fallback.source(),
                        "Primary matcher failed, using fallback"
                    );
                    fallback.match_query(query, options)
                }
                None => Err(MatchError::EngineFailure(reason)),
            },
            other => other,
        }
    }

    /// Match and wrap the results with the normalized query and variants
    pub fn match_report(&self, query: &str, options: &MatchOptions) -> Result<MatchReport> {
        let results = self.match_with(query, options)?;
        let context = QueryContext::new(query, self.config.max_confusion_variants);
        let report = MatchReport::new(&context, results);
        info!(query = %context.normalized(), "{}", report.summary());
        Ok(report)
    }

    /// Match many queries in parallel; one outcome per query, in order
    pub fn match_batch<S>(&self, queries: &[S], options: &MatchOptions) -> Vec<Result<Vec<MatchResult>>>
    where
        S: AsRef<str> + Sync,
    {
        queries
            .par_iter()
            .map(|q| self.match_with(q.as_ref(), options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spinematch_similarity::MatchSource;

    struct FailingStrategy;

    impl MatchStrategy for FailingStrategy {
        fn source(&self) -> MatchSource {
            MatchSource::Advanced
        }

        fn fit(&self, _catalog: &[CatalogRecord]) -> Result<FitSummary> {
            Ok(FitSummary::default())
        }

        fn match_query(&self, _query: &str, _options: &MatchOptions) -> Result<Vec<MatchResult>> {
            Err(MatchError::EngineFailure("simulated".into()))
        }
    }

    struct RecordingStrategy {
        source: MatchSource,
        log: Arc<Mutex<Vec<MatchSource>>>,
    }

    impl MatchStrategy for RecordingStrategy {
        fn source(&self) -> MatchSource {
            self.source
        }

        fn fit(&self, _catalog: &[CatalogRecord]) -> Result<FitSummary> {
            self.log.lock().push(self.source);
            Ok(FitSummary::default())
        }

        fn match_query(&self, _query: &str, _options: &MatchOptions) -> Result<Vec<MatchResult>> {
            Ok(Vec::new())
        }
    }

    fn catalog() -> Vec<CatalogRecord> {
        vec![
            CatalogRecord::new("hobbit", "The Hobbit", ["J. R. R. Tolkien"]),
            CatalogRecord::new("road", "The Road", ["Cormac McCarthy"]),
        ]
    }

    #[test]
    fn test_fallback_on_engine_failure() {
        let matcher = Matcher::with_strategies(
            MatcherConfig::default(),
            Arc::new(FailingStrategy),
            Some(Arc::new(LegacyMatcher::new())),
        )
        .unwrap();
        matcher.fit(&catalog()).unwrap();

        let results = matcher.match_query("the hobbit").unwrap();
        assert_eq!(results[0].id, "hobbit");
        assert_eq!(results[0].source, MatchSource::Legacy);
    }

    #[test]
    fn test_fallback_fitted_before_primary() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let matcher = Matcher::with_strategies(
            MatcherConfig::default(),
            Arc::new(RecordingStrategy {
                source: MatchSource::Advanced,
                log: Arc::clone(&log),
            }),
            Some(Arc::new(RecordingStrategy {
                source: MatchSource::Legacy,
                log: Arc::clone(&log),
            })),
        )
        .unwrap();

        matcher.fit(&catalog()).unwrap();
        matcher.fit(&catalog()).unwrap();
        assert_eq!(
            *log.lock(),
            vec![
                MatchSource::Legacy,
                MatchSource::Advanced,
                MatchSource::Legacy,
                MatchSource::Advanced
            ]
        );
    }

    #[test]
    fn test_engine_failure_without_fallback() {
        let matcher =
            Matcher::with_strategies(MatcherConfig::default(), Arc::new(FailingStrategy), None)
                .unwrap();
        matcher.fit(&catalog()).unwrap();
        let err = matcher.match_query("the hobbit").unwrap_err();
        assert!(err.is_engine_failure());
    }

    #[test]
    fn test_index_not_fit_is_not_replaced() {
        let config = MatcherConfig {
            enable_legacy_fallback: true,
            ..Default::default()
        };
        let matcher = Matcher::new(config).unwrap();
        assert!(matcher.has_fallback());
        assert_eq!(matcher.match_query("the hobbit"), Err(MatchError::IndexNotFit));
    }

    #[test]
    fn test_report_and_batch() {
        let matcher = Matcher::new(MatcherConfig::default()).unwrap();
        matcher.fit(&catalog()).unwrap();

        let report = matcher
            .match_report("THE H0BBIT TOLKIEN", &MatchOptions::default())
            .unwrap();
        assert_eq!(report.confident_match().map(|r| r.id.as_str()), Some("hobbit"));
        assert!(report.variants.len() > 1);

        let queries = ["the road", "", "the hobbit"];
        let batch = matcher.match_batch(&queries[..], &MatchOptions::default());
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].as_ref().unwrap()[0].id, "road");
        assert!(batch[1].as_ref().unwrap().is_empty());
        assert_eq!(batch[2].as_ref().unwrap()[0].id, "hobbit");
    }
}
