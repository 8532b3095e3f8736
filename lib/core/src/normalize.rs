//! Text canonicalization
//!
//! Turns catalog titles, author names and OCR query strings into a single
//! canonical form: case-folded, diacritics stripped, punctuation removed
//! (except hyphens and apostrophes inside words), whitespace collapsed and
//! finally uppercased.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical uppercase form of a piece of text.
///
/// Only [`normalize`] and the confusion-variant generator construct values
/// of this type, so holding one means the text went through canonicalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    #[inline]
    pub(crate) fn from_canonical(text: String) -> Self {
        Self(text)
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Distinct whitespace-separated tokens in first-occurrence order
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        token_set(&self.0)
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize raw text.
///
/// Empty or whitespace-only input yields an empty [`NormalizedText`].
/// The function is idempotent.
pub fn normalize(text: &str) -> NormalizedText {
    if text.trim().is_empty() {
        return NormalizedText::default();
    }

    let folded: String = strip_marks(&text.to_lowercase());
    let expanded = fold_symbols(&folded);
    let cleaned = strip_punctuation(&expanded);
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    // Uppercasing can reintroduce combining marks (e.g. U+01F0).
    NormalizedText(strip_marks(&collapsed.to_uppercase()))
}

fn strip_marks(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn fold_symbols(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str(" and "),
            '\u{2018}' | '\u{2019}' | '\u{02BC}' | '\u{0060}' => out.push('\''),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            other => out.push(other),
        }
    }
    out
}

/// Keep alphanumerics; keep `-` and `'` only between two alphabetic chars.
fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() {
            out.push(c);
            continue;
        }

        let internal = (c == '-' || c == '\'')
            && i > 0
            && chars[i - 1].is_alphabetic()
            && chars.get(i + 1).is_some_and(|next| next.is_alphabetic());

        out.push(if internal { c } else { ' ' });
    }
    out
}

/// Distinct whitespace-separated tokens, preserving first occurrence order.
pub fn token_set(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in text.split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}
