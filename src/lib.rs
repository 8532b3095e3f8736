//! # spinematch
//!
//! Fuzzy matching of noisy OCR book-spine text against a bibliographic catalog.
//!
//! A spine photographed on a shelf reads something like
//! `THE BALLAD OF OLLINS SONGBIRDS AND SNAKES SCHOLASTIC PRESS`: words
//! clipped, digits in place of letters, author and publisher mixed into the
//! title. spinematch ranks catalog records against such text and reports a
//! calibrated confidence with the sub-scores behind it.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! spinematch --catalog books.json --query "THE H0BBIT TOLKIEN" --pretty
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use spinematch::prelude::*;
//!
//! let catalog = vec![
//!     CatalogRecord::new("collins", "The Ballad of Songbirds and Snakes", ["Suzanne Collins"]),
//!     CatalogRecord::new("wilde", "The Ballad of Reading Gaol", ["Oscar Wilde"]),
//! ];
//!
//! let matcher = Matcher::new(MatcherConfig::default()).unwrap();
//! matcher.fit(&catalog).unwrap();
//!
//! let results = matcher
//!     .match_query("THE BALLAD OF OLLINS SONGBIRDS AND SNAKES SCHOLASTIC PRESS")
//!     .unwrap();
//! assert_eq!(results[0].id, "collins");
//! assert!(results[0].is_match());
//! ```
//!
//! ## Crate Structure
//!
//! - `spinematch-core` - Normalization, confusion variants, corpus statistics, n-gram index
//! - `spinematch-similarity` - Feature extraction, score fusion, reranking, reports
//! - `spinematch-engine` - Configuration, matching strategies, fallback orchestration

// Re-export core types
pub use spinematch_core::{
    confusion_variants, normalize, parse_catalog, Candidate, CandidateIndex, CandidateSource,
    CatalogEntry, CatalogRecord, CorpusStatistics, IndexConfig, NormalizedText, QueryContext,
};

// Re-export scoring
pub use spinematch_similarity::{
    FeatureScores, FusionWeights, MatchReport, MatchResult, MatchSource, MatchTier, Reranker,
    ScoreFusion,
};

// Re-export the engine
pub use spinematch_engine::{
    AdvancedMatcher, FitSummary, LegacyMatcher, MatchError, MatchOptions, MatchStrategy, Matcher,
    MatcherConfig,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        normalize, CatalogRecord, FeatureScores, MatchError, MatchOptions, MatchReport,
        MatchResult, MatchTier, Matcher, MatcherConfig,
    };
}
