//! Pipeline error types
//!
//! Errors raised by the flow handler. None of them are fatal: the ingestion
//! loop logs the record and keeps going.

use thiserror::Error;

use crate::validator::Rejection;

/// Pipeline errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Flow failed timestamp validation and was not processed
    #[error("invalid flow: {rejection}")]
    InvalidFlow {
        /// Rule that rejected the flow
        rejection: Rejection,
    },
}

impl PipelineError {
    /// Whether this error came from flow validation
    #[inline]
    pub fn is_invalid_flow(&self) -> bool {
        matches!(self, Self::InvalidFlow { .. })
    }
}

impl From<Rejection> for PipelineError {
    fn from(rejection: Rejection) -> Self {
        Self::InvalidFlow { rejection }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::from(Rejection::StartInFuture);
        assert!(err.is_invalid_flow());
        assert!(err.to_string().contains("invalid flow"));
        assert!(err.to_string().contains("start time"));

        let err = PipelineError::InvalidFlow {
            rejection: Rejection::EndBeforeStart,
        };
        assert!(err.to_string().contains("before start"));
    }
}
