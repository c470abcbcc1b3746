//! Error Types for the Valuation Engine
//!
//! Scoring itself never fails. These errors cover the fallible edges:
//! configuration loading and snapshot sources.

use thiserror::Error;

use crate::classifier::AssetCategory;
use crate::model::{MetricId, Timeframe};

pub type Result<T> = std::result::Result<T, ValuationError>;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid weight {weight} for {metric} in {timeframe} table")]
    InvalidWeight {
        metric: MetricId,
        timeframe: Timeframe,
        weight: f64,
    },

    #[error("Invalid thresholds for {category}: {reason}")]
    InvalidThreshold {
        category: AssetCategory,
        reason: String,
    },

    #[error("Snapshot source error: {0}")]
    Source(String),

    #[error("No snapshot available for {0}")]
    MissingSnapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ValuationError {
    /// Whether the caller may retry the operation that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ValuationError::Source("timeout".into()).is_retryable());
        assert!(!ValuationError::Config("bad".into()).is_retryable());
        assert!(!ValuationError::MissingSnapshot("BTC".into()).is_retryable());
    }

    #[test]
    fn test_invalid_weight_message() {
        let err = ValuationError::InvalidWeight {
            metric: MetricId::Mvrv,
            timeframe: Timeframe::Medium,
            weight: -0.1,
        };
        assert_eq!(err.to_string(), "Invalid weight -0.1 for mvrv in medium table");
    }
}
