//! Matcher configuration
//!
//! Layered as defaults, then an optional JSON file, then `SPINEMATCH_*`
//! environment variables. The CLI applies its flags last.

use crate::error::{MatchError, Result};
use serde::{Deserialize, Serialize};
use spinematch_core::{IndexConfig, DEFAULT_MAX_VARIANTS};
use spinematch_similarity::{FusionWeights, SOFT_MATCH_THRESHOLD};
use std::path::Path;

pub const ENV_CONFIDENCE_THRESHOLD: &str = "SPINEMATCH_CONFIDENCE_THRESHOLD";
pub const ENV_TOP_K: &str = "SPINEMATCH_TOP_K";
pub const ENV_USE_CHARACTER_NGRAMS: &str = "SPINEMATCH_USE_CHARACTER_NGRAMS";
pub const ENV_ENABLE_LEGACY_FALLBACK: &str = "SPINEMATCH_ENABLE_LEGACY_FALLBACK";
pub const ENV_OVERSAMPLE_FACTOR: &str = "SPINEMATCH_OVERSAMPLE_FACTOR";

/// Configuration for a matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Results below this confidence are flagged, not dropped
    pub confidence_threshold: f32,
    pub top_k: usize,
    pub use_character_ngrams: bool,
    pub enable_legacy_fallback: bool,
    /// Retrieval pool is `ceil(top_k * oversample_factor)`...
    pub oversample_factor: f32,
    /// ...but never smaller than this
    pub min_candidate_pool: usize,
    /// Variants per query including the original, at most 8
    pub max_confusion_variants: usize,
    pub soft_match_threshold: f32,
    pub weights: FusionWeights,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.65,
            top_k: 10,
            use_character_ngrams: true,
            enable_legacy_fallback: false,
            oversample_factor: 3.0,
            min_candidate_pool: 50,
            max_confusion_variants: DEFAULT_MAX_VARIANTS,
            soft_match_threshold: SOFT_MATCH_THRESHOLD,
            weights: FusionWeights::default(),
        }
    }
}

impl MatcherConfig {
    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MatchError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| MatchError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Apply `SPINEMATCH_*` variables on top of `self`
    pub fn with_env_overrides(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CONFIDENCE_THRESHOLD) {
            self.confidence_threshold = parse_value(ENV_CONFIDENCE_THRESHOLD, &v)?;
        }
        if let Some(v) = lookup(ENV_TOP_K) {
            self.top_k = parse_value(ENV_TOP_K, &v)?;
        }
        if let Some(v) = lookup(ENV_USE_CHARACTER_NGRAMS) {
            self.use_character_ngrams = parse_flag(ENV_USE_CHARACTER_NGRAMS, &v)?;
        }
        if let Some(v) = lookup(ENV_ENABLE_LEGACY_FALLBACK) {
            self.enable_legacy_fallback = parse_flag(ENV_ENABLE_LEGACY_FALLBACK, &v)?;
        }
        if let Some(v) = lookup(ENV_OVERSAMPLE_FACTOR) {
            self.oversample_factor = parse_value(ENV_OVERSAMPLE_FACTOR, &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MatchError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig("top_k must be at least 1".into()));
        }
        if !self.oversample_factor.is_finite() || self.oversample_factor < 1.0 {
            return Err(MatchError::InvalidConfig(format!(
                "oversample_factor must be >= 1, got {}",
                self.oversample_factor
            )));
        }
        if self.min_candidate_pool == 0 {
            return Err(MatchError::InvalidConfig(
                "min_candidate_pool must be at least 1".into(),
            ));
        }
        if self.max_confusion_variants == 0 || self.max_confusion_variants > DEFAULT_MAX_VARIANTS {
            return Err(MatchError::InvalidConfig(format!(
                "max_confusion_variants must be within 1..={}, got {}",
                DEFAULT_MAX_VARIANTS, self.max_confusion_variants
            )));
        }
        if !(self.soft_match_threshold > 0.0 && self.soft_match_threshold <= 1.0) {
            return Err(MatchError::InvalidConfig(format!(
                "soft_match_threshold must be within (0, 1], got {}",
                self.soft_match_threshold
            )));
        }
        let mut weights = self.weights;
        weights.validate_and_normalize()?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            use_character_ngrams: self.use_character_ngrams,
        }
    }

    /// Per-call options taken from this config
    #[inline]
    #[must_use]
    pub fn options(&self) -> MatchOptions {
        MatchOptions {
            top_k: self.top_k,
            confidence_threshold: self.confidence_threshold,
        }
    }

    /// Number of candidates to retrieve before reranking
    pub fn candidate_pool(&self, top_k: usize) -> usize {
        let oversampled = (top_k as f32 * self.oversample_factor).ceil() as usize;
        oversampled.max(self.min_candidate_pool)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| MatchError::InvalidConfig(format!("{}={:?}: {}", key, raw, e)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(MatchError::InvalidConfig(format!(
            "{}={:?}: expected a boolean",
            key, raw
        ))),
    }
}

/// Options for a single match call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub top_k: usize,
    pub confidence_threshold: f32,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatcherConfig::default().options()
    }
}

impl MatchOptions {
    pub fn new(top_k: usize, confidence_threshold: f32) -> Self {
        Self {
            top_k,
            confidence_threshold,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(MatchError::InvalidConfig("top_k must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(MatchError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}
