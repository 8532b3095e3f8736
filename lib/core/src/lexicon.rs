//! Corpus statistics: smoothed IDF for character n-grams and tokens.
//!
//! Recomputed wholesale on every fit and read-only afterwards.

use crate::catalog::CatalogEntry;
use ahash::AHashMap;
use std::iter::once;

/// Shortest character n-gram
pub const NGRAM_MIN: usize = 3;

/// Longest character n-gram
pub const NGRAM_MAX: usize = 5;

/// Smoothed inverse document frequency: `ln((N+1)/(df+1)) + 1`.
#[inline]
#[must_use]
pub fn smoothed_idf(document_count: usize, document_frequency: usize) -> f32 {
    ((document_count as f32 + 1.0) / (document_frequency as f32 + 1.0)).ln() + 1.0
}

/// Character n-grams of lengths 3 to 5 over `text` padded with one space on
/// each side, with term frequencies, in first-occurrence order.
pub fn char_ngrams(text: &str) -> Vec<(String, u32)> {
    let padded: Vec<char> = once(' ').chain(text.chars()).chain(once(' ')).collect();
    let mut positions: AHashMap<String, usize> = AHashMap::new();
    let mut grams: Vec<(String, u32)> = Vec::new();

    if text.is_empty() {
        return grams;
    }

    for n in NGRAM_MIN..=NGRAM_MAX {
        if padded.len() < n {
            break;
        }
        for window in padded.windows(n) {
            let gram: String = window.iter().collect();
            match positions.get(&gram) {
                Some(&i) => grams[i].1 += 1,
                None => {
                    positions.insert(gram.clone(), grams.len());
                    grams.push((gram, 1));
                }
            }
        }
    }
    grams
}

/// Document frequencies turned into IDF weights for one catalog.
#[derive(Debug, Clone, Default)]
pub struct CorpusStatistics {
    document_count: usize,
    // n-gram -> dense id, ids assigned in first-seen order
    ngram_ids: AHashMap<String, u32>,
    // id -> idf
    ngram_idf: Vec<f32>,
    token_idf: AHashMap<String, f32>,
}

impl CorpusStatistics {
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build statistics over `entries`.
    ///
    /// N-grams come from each entry's title plus author names; tokens come
    /// from the title alone. With `include_ngrams = false` only token
    /// statistics are computed.
    pub fn build(entries: &[CatalogEntry], include_ngrams: bool) -> Self {
        let document_count = entries.len();
        if document_count == 0 {
            return Self::empty();
        }

        let mut ngram_ids: AHashMap<String, u32> = AHashMap::new();
        let mut ngram_df: Vec<usize> = Vec::new();
        let mut token_df: AHashMap<String, usize> = AHashMap::new();

        for entry in entries {
            if include_ngrams {
                for (gram, _) in char_ngrams(entry.search_text().as_str()) {
                    let next_id = ngram_df.len() as u32;
                    let id = *ngram_ids.entry(gram).or_insert(next_id);
                    if id == next_id {
                        ngram_df.push(0);
                    }
                    ngram_df[id as usize] += 1;
                }
            }

            // tokens() is already distinct per entry
            for token in entry.tokens() {
                *token_df.entry(token.clone()).or_insert(0) += 1;
            }
        }

        let ngram_idf = ngram_df
            .into_iter()
            .map(|df| smoothed_idf(document_count, df))
            .collect();
        let token_idf = token_df
            .into_iter()
            .map(|(token, df)| (token, smoothed_idf(document_count, df)))
            .collect();

        Self {
            document_count,
            ngram_ids,
            ngram_idf,
            token_idf,
        }
    }

    #[inline]
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.document_count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }

    /// Number of distinct n-grams in the vocabulary
    #[inline]
    #[must_use]
    pub fn ngram_vocabulary_size(&self) -> usize {
        self.ngram_idf.len()
    }

    /// Number of distinct tokens seen across titles
    #[inline]
    #[must_use]
    pub fn token_vocabulary_size(&self) -> usize {
        self.token_idf.len()
    }

    #[inline]
    pub fn ngram_id(&self, gram: &str) -> Option<u32> {
        self.ngram_ids.get(gram).copied()
    }

    #[inline]
    pub fn ngram_idf(&self, id: u32) -> f32 {
        self.ngram_idf.get(id as usize).copied().unwrap_or(0.0)
    }

    /// IDF of a token. Unseen tokens get the `df = 0` weight.
    #[inline]
    pub fn token_idf(&self, token: &str) -> f32 {
        self.token_idf
            .get(token)
            .copied()
            .unwrap_or_else(|| smoothed_idf(self.document_count, 0))
    }
}
