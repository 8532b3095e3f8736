//! # spinematch Engine
//!
//! Matcher orchestration for spinematch.
//!
//! - [`MatcherConfig`] - Layered configuration (defaults, JSON file, environment)
//! - [`AdvancedMatcher`] - N-gram retrieval followed by multi-feature reranking
//! - [`LegacyMatcher`] - Whole-catalog fuzzy scoring, used as a fallback
//! - [`Matcher`] - Fits the strategies and routes queries between them
//!
//! ## Example
//!
//! ```rust
//! use spinematch_core::CatalogRecord;
//! use spinematch_engine::{Matcher, MatcherConfig};
//!
//! let matcher = Matcher::new(MatcherConfig::default()).unwrap();
//! matcher
//!     .fit(&[CatalogRecord::new("1", "The Hunger Games", ["Suzanne Collins"])])
//!     .unwrap();
//!
//! let results = matcher.match_query("THE HUNGER GAMES COLLINS").unwrap();
//! assert_eq!(results[0].id, "1");
//! ```

pub mod advanced;
pub mod config;
pub mod error;
pub mod legacy;
pub mod matcher;
pub mod strategy;

pub use advanced::AdvancedMatcher;
pub use config::{
    MatchOptions, MatcherConfig, ENV_CONFIDENCE_THRESHOLD, ENV_ENABLE_LEGACY_FALLBACK,
    ENV_OVERSAMPLE_FACTOR, ENV_TOP_K, ENV_USE_CHARACTER_NGRAMS,
};
pub use error::{MatchError, Result};
pub use legacy::LegacyMatcher;
pub use matcher::Matcher;
pub use strategy::{FitSummary, MatchStrategy};
