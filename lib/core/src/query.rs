//! Per-call query state: raw text, canonical form and confusion variants.

use crate::confusion::{confusion_variants, VariantSet, DEFAULT_MAX_VARIANTS};
use crate::normalize::{normalize, NormalizedText};
use smallvec::SmallVec;

/// Ephemeral context built once per match call and dropped when it returns.
#[derive(Debug, Clone)]
pub struct QueryContext {
    raw: String,
    normalized: NormalizedText,
    variants: VariantSet,
    // tokens[i] belongs to variants[i]
    tokens: SmallVec<[Vec<String>; DEFAULT_MAX_VARIANTS]>,
}

impl QueryContext {
    /// Normalize `raw` and expand it into at most `max_variants` variants.
    pub fn new(raw: &str, max_variants: usize) -> Self {
        let normalized = normalize(raw);
        let variants = confusion_variants(&normalized, max_variants);
        let tokens = variants.iter().map(NormalizedText::tokens).collect();
        Self {
            raw: raw.to_string(),
            normalized,
            variants,
            tokens,
        }
    }

    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    #[must_use]
    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    /// True when the query has no matchable content
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Variant texts, original first
    #[inline]
    #[must_use]
    pub fn variant_texts(&self) -> &[NormalizedText] {
        &self.variants
    }

    /// `(variant, tokens)` pairs, original first
    pub fn variants(&self) -> impl Iterator<Item = (&NormalizedText, &[String])> {
        self.variants
            .iter()
            .zip(self.tokens.iter().map(Vec::as_slice))
    }

    #[inline]
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }
}
