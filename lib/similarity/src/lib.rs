//! # spinematch Similarity
//!
//! Multi-feature reranking for OCR spine matching.
//!
//! This crate scores candidates retrieved by the core n-gram index and
//! turns them into calibrated, explainable results.
//!
//! ## Features
//!
//! - **Feature Extraction**: token-set Jaccard, soft-TFIDF, author Jaro-Winkler, distinctive-token coverage
//! - **Score Fusion**: fixed weighted sum with redistribution when n-grams are disabled
//! - **Match Tiers**: exact / strong / moderate / weak / poor
//! - **Explainability**: per-feature sub-scores and a report of the variants tried
//!
//! ## Example
//!
//! ```rust
//! use spinematch_core::{CandidateIndex, CandidateSource, CatalogRecord, IndexConfig, QueryContext};
//! use spinematch_similarity::{MatchReport, Reranker};
//!
//! let catalog = vec![CatalogRecord::new("1", "The Hunger Games", ["Suzanne Collins"])];
//! let index = CandidateIndex::fit(&catalog, IndexConfig::default());
//!
//! let query = QueryContext::new("THE HUNGER GAMES COLLINS", 8);
//! let candidates = index.retrieve(query.variant_texts(), 50);
//! let results = Reranker::default().rerank(&index, &query, &candidates, 0.65).unwrap();
//!
//! let report = MatchReport::new(&query, results);
//! assert!(report.confident_match().is_some());
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Candidate  │────>│  Features   │────>│   Fusion    │
//! │   Index     │     │ (5 scores)  │     │ (conf,tier) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                      ┌─────────────┐           │
//!                      │  Reranker   │<──────────┘
//!                      │  (sorted)   │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  Explain    │
//!                      │  (report)   │
//!                      └─────────────┘
//! ```

pub mod distance;
pub mod explain;
pub mod features;
pub mod fusion;
pub mod rerank;

// Re-export main types for convenience
pub use explain::MatchReport;
pub use features::{
    FeatureError, FeatureExtractor, FeatureScores, MIN_AUTHOR_TOKEN_LEN, SOFT_MATCH_THRESHOLD,
};
pub use fusion::{FusionError, FusionWeights, MatchTier, ScoreFusion};
pub use rerank::{sort_results, MatchResult, MatchSource, Reranker};
