//! Score fusion and match tiers
//!
//! A fixed weighted sum over the five features, followed by a discrete tier.

use crate::features::FeatureScores;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionError {
    #[error("Weight for {0} must be finite and non-negative")]
    NegativeWeight(&'static str),

    #[error("Total weight must be positive")]
    ZeroTotalWeight,
}

/// Fusion weights, one per feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub char_ngram: f32,
    pub token_set: f32,
    pub soft_overlap: f32,
    pub author: f32,
    pub distinctive: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            char_ngram: 0.35,
            token_set: 0.25,
            soft_overlap: 0.20,
            author: 0.15,
            distinctive: 0.05,
        }
    }
}

impl FusionWeights {
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> [f32; 5] {
        [
            self.char_ngram,
            self.token_set,
            self.soft_overlap,
            self.author,
            self.distinctive,
        ]
    }

    /// Validate the weights
    /// - Checks that weights are finite and non-negative
    /// - Normalizes weights to sum to 1.0 if they don't
    pub fn validate_and_normalize(&mut self) -> Result<(), FusionError> {
        for (name, weight) in FeatureScores::NAMES.iter().zip(self.as_array()) {
            if !weight.is_finite() || weight < 0.0 {
                return Err(FusionError::NegativeWeight(*name));
            }
        }

        let weight_sum: f32 = self.as_array().iter().sum();
        if weight_sum <= 0.0 {
            return Err(FusionError::ZeroTotalWeight);
        }

        if (weight_sum - 1.0).abs() > 0.001 {
            self.char_ngram /= weight_sum;
            self.token_set /= weight_sum;
            self.soft_overlap /= weight_sum;
            self.author /= weight_sum;
            self.distinctive /= weight_sum;
        }
        Ok(())
    }

    /// Drop the char-ngram weight and spread it proportionally over the rest.
    pub fn without_char_ngrams(&self) -> Result<Self, FusionError> {
        let mut weights = Self {
            char_ngram: 0.0,
            ..*self
        };
        weights.validate_and_normalize()?;
        Ok(weights)
    }
}

/// Discrete confidence bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Poor,
    Weak,
    Moderate,
    Strong,
    Exact,
}

impl MatchTier {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.90 {
            MatchTier::Exact
        } else if confidence >= 0.75 {
            MatchTier::Strong
        } else if confidence >= 0.60 {
            MatchTier::Moderate
        } else if confidence >= 0.40 {
            MatchTier::Weak
        } else {
            MatchTier::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Strong => "strong",
            MatchTier::Moderate => "moderate",
            MatchTier::Weak => "weak",
            MatchTier::Poor => "poor",
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted-sum fusion
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreFusion {
    weights: FusionWeights,
}

impl ScoreFusion {
    pub fn new(mut weights: FusionWeights) -> Result<Self, FusionError> {
        weights.validate_and_normalize()?;
        Ok(Self { weights })
    }

    /// Fusion for an index built without character n-grams
    pub fn without_char_ngrams(&self) -> Result<Self, FusionError> {
        Ok(Self {
            weights: self.weights.without_char_ngrams()?,
        })
    }

    #[inline]
    #[must_use]
    pub fn weights(&self) -> &FusionWeights {
        &self.weights
    }

    /// Fused confidence (clamped to [0, 1] unless non-finite) and tier
    pub fn fuse(&self, features: &FeatureScores) -> (f32, MatchTier) {
        let confidence: f32 = self
            .weights
            .as_array()
            .iter()
            .zip(features.as_array())
            .map(|(w, f)| w * f)
            .sum();
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            confidence
        };
        (confidence, MatchTier::from_confidence(confidence))
    }
}
