//! OCR confusion variants
//!
//! OCR engines routinely swap visually similar glyphs (`0`/`O`, `1`/`I`/`L`,
//! `5`/`S`, `8`/`B`). Before retrieval each normalized query is expanded into
//! a small, bounded and deterministic set of alternate spellings.

use crate::normalize::NormalizedText;
use smallvec::SmallVec;

/// Default and largest number of variants per query, including the original
pub const DEFAULT_MAX_VARIANTS: usize = 8;

/// Substitution table in generation order. Digit rows come first since
/// OCR noise mostly turns letters into digits.
const CONFUSION_TABLE: &[(char, &[char])] = &[
    ('0', &['O']),
    ('1', &['I', 'L']),
    ('5', &['S']),
    ('8', &['B']),
    ('6', &['G']),
    ('2', &['Z']),
    ('O', &['0']),
    ('I', &['L', '1']),
    ('L', &['I', '1']),
    ('S', &['5']),
    ('B', &['8']),
    ('G', &['6']),
    ('Z', &['2']),
];

pub type VariantSet = SmallVec<[NormalizedText; DEFAULT_MAX_VARIANTS]>;

#[inline]
fn substitutes(c: char) -> Option<&'static [char]> {
    CONFUSION_TABLE
        .iter()
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Enumerate confusion variants of `text`.
///
/// The unmodified text is always first. The result holds at most `cap`
/// distinct entries (clamped to `1..=DEFAULT_MAX_VARIANTS`). Empty input
/// yields an empty set.
pub fn confusion_variants(text: &NormalizedText, cap: usize) -> VariantSet {
    if text.is_empty() {
        return VariantSet::new();
    }

    let mut generator = VariantGenerator {
        cap: cap.clamp(1, DEFAULT_MAX_VARIANTS),
        variants: VariantSet::new(),
    };
    generator.push(text.as_str().to_string());
    generator.class_substitutions(text.as_str());
    generator.positional_substitutions(text.as_str());
    generator.variants
}

struct VariantGenerator {
    cap: usize,
    variants: VariantSet,
}

impl VariantGenerator {
    #[inline]
    fn is_full(&self) -> bool {
        self.variants.len() >= self.cap
    }

    fn push(&mut self, candidate: String) {
        if self.is_full() || self.variants.iter().any(|v| v.as_str() == candidate) {
            return;
        }
        self.variants.push(NormalizedText::from_canonical(candidate));
    }

    /// Replace every occurrence of one confusable character at once.
    fn class_substitutions(&mut self, source: &str) {
        for &(from, targets) in CONFUSION_TABLE {
            if !source.contains(from) {
                continue;
            }
            for &to in targets {
                if self.is_full() {
                    return;
                }
                let variant: String = source
                    .chars()
                    .map(|c| if c == from { to } else { c })
                    .collect();
                self.push(variant);
            }
        }
    }

    /// Replace a single position, scanning left to right.
    fn positional_substitutions(&mut self, source: &str) {
        let chars: Vec<char> = source.chars().collect();
        for (i, &c) in chars.iter().enumerate() {
            let Some(targets) = substitutes(c) else {
                continue;
            };
            for &to in targets {
                if self.is_full() {
                    return;
                }
                let mut variant = chars.clone();
                variant[i] = to;
                self.push(variant.into_iter().collect());
            }
        }
    }
}
