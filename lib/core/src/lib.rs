//! # spinematch Core
//!
//! Core library for the spinematch OCR spine matcher.
//!
//! This crate provides the text and retrieval layer:
//!
//! - [`normalize()`] - Canonical uppercase form of titles, authors and queries
//! - [`confusion_variants`] - Bounded OCR-confusion spellings of a query
//! - [`CatalogEntry`] - A catalog record with its derived matching keys
//! - [`CorpusStatistics`] - Smoothed IDF over character n-grams and tokens
//! - [`CandidateIndex`] - Character n-gram TF-IDF index with cosine retrieval
//! - [`QueryContext`] - Per-call normalized query and its variants
//!
//! ## Example
//!
//! ```rust
//! use spinematch_core::{CandidateIndex, CandidateSource, CatalogRecord, IndexConfig, QueryContext};
//!
//! let catalog = vec![
//!     CatalogRecord::new("1", "The Hobbit", ["J. R. R. Tolkien"]),
//!     CatalogRecord::new("2", "The Road", ["Cormac McCarthy"]),
//! ];
//! let index = CandidateIndex::fit(&catalog, IndexConfig::default());
//!
//! let query = QueryContext::new("THE H0BBIT", 8);
//! let candidates = index.retrieve(query.variant_texts(), 10);
//! assert_eq!(candidates[0].position, 0);
//! ```

pub mod catalog;
pub mod confusion;
pub mod error;
pub mod index;
pub mod lexicon;
pub mod normalize;
pub mod query;
pub mod vector;

pub use catalog::{parse_catalog, CatalogEntry, CatalogRecord};
pub use confusion::{confusion_variants, VariantSet, DEFAULT_MAX_VARIANTS};
pub use error::{Error, Result};
pub use index::{Candidate, CandidateIndex, CandidateSource, IndexConfig};
pub use lexicon::{char_ngrams, smoothed_idf, CorpusStatistics, NGRAM_MAX, NGRAM_MIN};
pub use normalize::{normalize, token_set, NormalizedText};
pub use query::QueryContext;
pub use vector::SparseVector;
