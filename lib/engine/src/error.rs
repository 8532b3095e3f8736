use spinematch_similarity::{FeatureError, FusionError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MatchError>;

/// Failures surfaced by a matcher.
///
/// An empty catalog or an empty query is not an error; both produce an
/// empty result list.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Index has not been fit")]
    IndexNotFit,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Engine failure: {0}")]
    EngineFailure(String),
}

impl MatchError {
    /// Whether a fallback strategy may take over
    #[inline]
    #[must_use]
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, MatchError::EngineFailure(_))
    }
}

impl From<spinematch_core::Error> for MatchError {
    fn from(err: spinematch_core::Error) -> Self {
        MatchError::EngineFailure(err.to_string())
    }
}

impl From<FeatureError> for MatchError {
    fn from(err: FeatureError) -> Self {
        MatchError::EngineFailure(err.to_string())
    }
}

impl From<FusionError> for MatchError {
    fn from(err: FusionError) -> Self {
        MatchError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_are_wrapped() {
        let err: MatchError = spinematch_core::Error::MalformedEntry {
            id: "x".into(),
            reason: "empty title".into(),
        }
        .into();
        assert!(err.is_engine_failure());
        assert_eq!(err.to_string(), "Engine failure: Malformed catalog entry x: empty title");
        assert!(!MatchError::IndexNotFit.is_engine_failure());
    }

    #[test]
    fn test_feature_errors_are_engine_failures() {
        let err: MatchError = FeatureError::UnknownCandidate(7).into();
        assert!(err.is_engine_failure());
    }
}
