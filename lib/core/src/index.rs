//! Character n-gram TF-IDF candidate index.
//!
//! Every catalog entry's title and author names are vectorized once at fit
//! time into an L2-normalized sparse vector. Retrieval scores each query
//! variant against all stored vectors and keeps the best similarity per
//! entry.
//!
//! With character n-grams disabled there are no vectors. Entries are then
//! ranked by the IDF mass of query tokens they contain exactly, and every
//! candidate carries similarity 0.

use crate::catalog::{CatalogEntry, CatalogRecord};
use crate::lexicon::{char_ngrams, CorpusStatistics};
use crate::normalize::NormalizedText;
use crate::vector::SparseVector;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use std::cmp::Ordering;

/// Configuration for a candidate index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub use_character_ngrams: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            use_character_ngrams: true,
        }
    }
}

/// A retrieved catalog entry and its best variant similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Insertion position of the entry in the fitted catalog
    pub position: usize,
    pub similarity: f32,
}

/// Anything that can turn query variants into an ordered candidate list.
///
/// The linear-scan [`CandidateIndex`] is the only implementation; an
/// approximate index can slot in behind the same contract.
pub trait CandidateSource {
    /// Up to `limit` candidates ordered by similarity descending, ties by
    /// insertion position.
    ///
    /// An implementation without a similarity signal may return candidates
    /// whose similarity is all 0, in its own relevance order; the `limit`
    /// still applies.
    fn retrieve(&self, variants: &[NormalizedText], limit: usize) -> Vec<Candidate>;
}

/// Immutable fitted index over one catalog
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    config: IndexConfig,
    entries: Vec<CatalogEntry>,
    stats: CorpusStatistics,
    vectors: Vec<SparseVector>,
}

impl CandidateIndex {
    /// Build entries, corpus statistics and entry vectors for `records`.
    pub fn fit(records: &[CatalogRecord], config: IndexConfig) -> Self {
        let entries: Vec<CatalogEntry> = records
            .iter()
            .cloned()
            .enumerate()
            .map(|(position, record)| CatalogEntry::from_record(position, record))
            .collect();

        let stats = CorpusStatistics::build(&entries, config.use_character_ngrams);

        let mut index = Self {
            config,
            entries,
            stats,
            vectors: Vec::new(),
        };

        if config.use_character_ngrams {
            index.vectors = index
                .entries
                .par_iter()
                .map(|entry| index.vectorize(entry.search_text()))
                .collect();
        }

        tracing::debug!(
            entries = index.entries.len(),
            ngrams = index.stats.ngram_vocabulary_size(),
            tokens = index.stats.token_vocabulary_size(),
            "candidate index built"
        );

        index
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> IndexConfig {
        self.config
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[inline]
    pub fn entry(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries.get(position)
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &CorpusStatistics {
        &self.stats
    }

    /// TF-IDF vector of `text` under the fitted vocabulary, L2-normalized.
    /// N-grams outside the vocabulary contribute nothing.
    pub fn vectorize(&self, text: &NormalizedText) -> SparseVector {
        let pairs = char_ngrams(text.as_str())
            .into_iter()
            .filter_map(|(gram, tf)| {
                self.stats
                    .ngram_id(&gram)
                    .map(|id| (id, tf as f32 * self.stats.ngram_idf(id)))
            })
            .collect();
        SparseVector::from_pairs(pairs).normalized()
    }

    /// Best IDF mass of exactly shared title and author tokens, across variants.
    fn token_prescore(&self, variant_tokens: &[Vec<String>], entry: &CatalogEntry) -> f32 {
        variant_tokens
            .iter()
            .map(|tokens| {
                entry
                    .tokens()
                    .iter()
                    .chain(entry.author_tokens())
                    .filter(|t| tokens.contains(t))
                    .map(|t| self.stats.token_idf(t))
                    .sum::<f32>()
            })
            .fold(0.0f32, f32::max)
    }

    fn retrieve_by_tokens(&self, variants: &[NormalizedText], limit: usize) -> Vec<Candidate> {
        let variant_tokens: Vec<Vec<String>> = variants.iter().map(NormalizedText::tokens).collect();

        let mut ranked: Vec<Candidate> = self
            .entries
            .par_iter()
            .map(|entry| Candidate {
                position: entry.position(),
                similarity: self.token_prescore(&variant_tokens, entry),
            })
            .collect();

        if ranked.len() > limit {
            ranked.select_nth_unstable_by(limit, by_similarity_then_position);
            ranked.truncate(limit);
        }
        ranked.sort_by(by_similarity_then_position);

        // the pre-score only orders; it is not a character similarity
        ranked
            .into_iter()
            .map(|c| Candidate {
                similarity: 0.0,
                ..c
            })
            .collect()
    }

    /// Best similarity per entry across all variant vectors.
    fn best_similarities(&self, queries: &[SparseVector]) -> Vec<f32> {
        self.vectors
            .par_iter()
            .map(|vector| {
                queries
                    .iter()
                    .map(|q| q.dot(vector))
                    .fold(0.0f32, f32::max)
                    .clamp(0.0, 1.0)
            })
            .collect()
    }
}

fn by_similarity_then_position(a: &Candidate, b: &Candidate) -> Ordering {
    OrderedFloat(b.similarity)
        .cmp(&OrderedFloat(a.similarity))
        .then_with(|| a.position.cmp(&b.position))
}

impl CandidateSource for CandidateIndex {
    fn retrieve(&self, variants: &[NormalizedText], limit: usize) -> Vec<Candidate> {
        if self.entries.is_empty() || variants.is_empty() || limit == 0 {
            return Vec::new();
        }

        if !self.config.use_character_ngrams {
            return self.retrieve_by_tokens(variants, limit);
        }

        let queries: Vec<SparseVector> = variants
            .iter()
            .map(|v| self.vectorize(v))
            .filter(|v| !v.is_empty())
            .collect();
        if queries.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = self
            .best_similarities(&queries)
            .into_iter()
            .enumerate()
            .filter(|(_, similarity)| *similarity > 0.0)
            .map(|(position, similarity)| Candidate {
                position,
                similarity,
            })
            .collect();

        if candidates.len() > limit {
            candidates.select_nth_unstable_by(limit, by_similarity_then_position);
            candidates.truncate(limit);
        }
        candidates.sort_by(by_similarity_then_position);
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn catalog() -> Vec<CatalogRecord> {
        vec![
            CatalogRecord::new("1", "The Hobbit", ["J. R. R. Tolkien"]),
            CatalogRecord::new("2", "The Road", ["Cormac McCarthy"]),
            CatalogRecord::new("3", "Hobbit Hole Cookbook", ["Anon"]),
            CatalogRecord::new("4", "The Hobbit", ["J. R. R. Tolkien"]),
        ]
    }

    #[test]
    fn test_fit_vectorizes_all_entries() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        assert_eq!(index.len(), 4);
        assert_eq!(index.vectors.len(), 4);
        for v in &index.vectors {
            assert!((v.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_retrieve_exact_title_first() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        let results = index.retrieve(&[normalize("the hobbit j. r. r. tolkien")], 10);
        assert_eq!(results[0].position, 0);
        assert!((results[0].similarity - 1.0).abs() < 1e-4);
        // identical entries tie and fall back to insertion order
        assert_eq!(results[1].position, 3);
        assert!(results.iter().all(|c| c.similarity > 0.0 && c.similarity <= 1.0));
    }

    #[test]
    fn test_retrieve_respects_limit() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        let results = index.retrieve(&[normalize("the hobbit")], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].position, 0);
        assert_eq!(results[1].position, 3);
    }

    #[test]
    fn test_retrieve_takes_best_variant() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        let noisy = index.retrieve(&[normalize("H0BBIT")], 10);
        let both = index.retrieve(&[normalize("H0BBIT"), normalize("HOBBIT")], 10);
        assert!(both[0].similarity > noisy.first().map_or(0.0, |c| c.similarity));
    }

    #[test]
    fn test_unseen_ngrams_retrieve_nothing() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        assert!(index.retrieve(&[normalize("zzzz qqqq")], 10).is_empty());
        assert!(index.retrieve(&[], 10).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let index = CandidateIndex::fit(&[], IndexConfig::default());
        assert!(index.is_empty());
        assert!(index.retrieve(&[normalize("the hobbit")], 10).is_empty());
    }

    #[test]
    fn test_without_ngrams_respects_limit() {
        let config = IndexConfig {
            use_character_ngrams: false,
        };
        let index = CandidateIndex::fit(&catalog(), config);

        let results = index.retrieve(&[normalize("cookbook")], 2);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|c| c.similarity == 0.0));
        assert_eq!(results[0].position, 2);

        // nothing shared: insertion order, still capped
        let results = index.retrieve(&[normalize("anything")], 3);
        let positions: Vec<usize> = results.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);

        assert_eq!(index.retrieve(&[normalize("anything")], 10).len(), 4);
    }

    #[test]
    fn test_without_ngrams_large_catalog() {
        let records: Vec<CatalogRecord> = (0..1000)
            .map(|i| CatalogRecord::new(i.to_string(), format!("Title {i}"), ["Someone"]))
            .collect();
        let index = CandidateIndex::fit(&records, IndexConfig { use_character_ngrams: false });
        let results = index.retrieve(&[normalize("title 5")], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].position, 5);
    }

    #[test]
    fn test_without_ngrams_matches_author_tokens() {
        let config = IndexConfig {
            use_character_ngrams: false,
        };
        let index = CandidateIndex::fit(&catalog(), config);
        let results = index.retrieve(&[normalize("MCCARTHY")], 1);
        assert_eq!(results[0].position, 1);
    }

    #[test]
    fn test_author_only_query_retrieves_entry() {
        let index = CandidateIndex::fit(&catalog(), IndexConfig::default());
        let results = index.retrieve(&[normalize("McCarthy")], 10);
        assert_eq!(results[0].position, 1);
        assert!(results[0].similarity > 0.3);

        let results = index.retrieve(&[normalize("TOLKIEN")], 10);
        assert_eq!(results[0].position, 0);
    }
}
