//! Valuation Engine
//!
//! Timeframe aggregation, composite scoring and driver attribution.
//!
//! ```text
//! ValuationInput ──► normalize::analyze (per table row)
//!                        │
//!        ┌───────────────┼───────────────┐
//!        ▼               ▼               ▼
//!     short (0.20)   medium (0.35)   long (0.45)
//!        └───────────────┼───────────────┘
//!                        ▼
//!        composite ─► risk level ─► drivers ─► recommendation
//! ```

mod composite;
mod drivers;
mod timeframe;

pub use composite::evaluate_asset;
pub use drivers::{direction, extract_drivers, recommend, severity};
pub use timeframe::assess_timeframe;

use crate::classifier::{classify, normalize_symbol, AssetCategory};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::model::{Timeframe, TimeframeAssessment, ValuationInput, ValuationResult};

/// Stateless valuation engine. Owns its configuration and is safe to share
/// across threads.
#[derive(Clone, Debug, Default)]
pub struct ValuationEngine {
    config: EngineConfig,
}

impl ValuationEngine {
    /// Wrap `config` as given. Use [`Self::try_new`] for configs that did
    /// not come through one of the `EngineConfig` loaders.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Validate `config` before wrapping it
    pub fn try_new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Aggregate one timeframe for an asset of the given category
    pub fn assess(
        &self,
        timeframe: Timeframe,
        input: &ValuationInput,
        category: AssetCategory,
    ) -> TimeframeAssessment {
        assess_timeframe(
            timeframe,
            self.config.timeframes.table(timeframe),
            input,
            self.config.categories.get(category),
        )
    }

    /// Full multi-timeframe valuation
    pub fn evaluate(
        &self,
        symbol: &str,
        input: &ValuationInput,
        category: AssetCategory,
    ) -> ValuationResult {
        evaluate_asset(&self.config, symbol, input, category)
    }

    /// Classify `input.symbol` and evaluate it
    pub fn evaluate_input(&self, input: &ValuationInput) -> ValuationResult {
        let symbol = normalize_symbol(&input.symbol);
        self.evaluate(&symbol, input, classify(&symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverConfig;
    use crate::model::{Action, MetricId, RiskLevel, SentimentRecord, Urgency};
    use crate::normalize::assert_close;

    fn rich_input(mvrv: f64) -> ValuationInput {
        ValuationInput {
            mvrv: Some(mvrv),
            nvt: Some(55.0),
            realized_price: Some(30_000.0),
            exchange_netflow: Some(2_000.0),
            active_addresses: Some(950_000.0),
            active_addresses_30d_avg: Some(1_000_000.0),
            ma50: Some(48_000.0),
            ma200: Some(40_000.0),
            ath: Some(69_000.0),
            cycle_low: Some(15_500.0),
            fear_greed: Some(62.0),
            kimchi_premium: Some(1.5),
            funding_rate: Some(0.01),
            sentiment: Some(SentimentRecord {
                social_score: Some(20.0),
                news_score: Some(-10.0),
            }),
            ..ValuationInput::new("BTC", 50_000.0)
        }
    }

    #[test]
    fn test_try_new_rejects_invalid_thresholds() {
        let mut config = EngineConfig::default();
        config.categories.core.mvrv_oversold = 1.6;
        assert!(matches!(
            ValuationEngine::try_new(config),
            Err(crate::error::ValuationError::InvalidThreshold {
                category: AssetCategory::Core,
                ..
            })
        ));

        let mut config = EngineConfig::default();
        config.categories.speculative.mvrv_overbought = 2.0;
        assert!(ValuationEngine::try_new(config).is_err());

        assert!(ValuationEngine::try_new(EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_price_only_input_is_neutral_hold() {
        let engine = ValuationEngine::default();
        let result = engine.evaluate_input(&ValuationInput::new("BTC", 50_000.0));

        assert_close(result.composite_score, 0.5);
        assert_eq!(result.risk_level, RiskLevel::Elevated);
        assert_eq!(result.recommendation.action, Action::Hold);
        assert_eq!(result.recommendation.urgency, Urgency::Low);
        assert_eq!(result.confidence.overall, 0.0);
        assert_eq!(result.confidence.data_completeness, 0.0);
        assert!(result.key_drivers.is_empty());
    }

    #[test]
    fn test_composite_reproduces_from_timeframes() {
        let engine = ValuationEngine::default();
        let result = engine.evaluate("BTC", &rich_input(2.2), AssetCategory::Core);

        let recomputed = result.short_term.overvaluation_score * 0.20
            + result.medium_term.overvaluation_score * 0.35
            + result.long_term.overvaluation_score * 0.45;
        assert_close(result.composite_score, recomputed);

        let confidence = result.short_term.confidence * 0.20
            + result.medium_term.confidence * 0.35
            + result.long_term.confidence * 0.45;
        assert_close(result.confidence.overall, confidence);
        assert_eq!(result.risk_level, RiskLevel::from_score(result.composite_score));
    }

    #[test]
    fn test_composite_monotonic_in_mvrv() {
        let engine = ValuationEngine::default();
        let mut last = f64::MIN;
        for step in 0..=60_u32 {
            let mvrv = 0.2 + f64::from(step) * 0.1;
            let score = engine
                .evaluate("ETH", &rich_input(mvrv), AssetCategory::Major)
                .composite_score;
            assert!(score >= last, "mvrv {mvrv}: {score} < {last}");
            last = score;
        }
    }

    #[test]
    fn test_key_drivers_bounded_and_sorted() {
        let engine = ValuationEngine::default();
        let result = engine.evaluate("BTC", &rich_input(3.8), AssetCategory::Core);
        assert_eq!(result.key_drivers.len(), 5);
        assert!(result
            .key_drivers
            .windows(2)
            .all(|pair| pair[0].contribution >= pair[1].contribution));
        assert_eq!(result.key_drivers[0].metric, MetricId::Mvrv);
    }

    #[test]
    fn test_data_completeness_counts_degraded_metrics() {
        let engine = ValuationEngine::default();
        let input = ValuationInput {
            ma50: Some(0.0),
            fear_greed: Some(50.0),
            ..ValuationInput::new("BTC", 50_000.0)
        };
        let result = engine.evaluate_input(&input);
        // short: ma50 (degraded) + fear_greed, medium: fear_greed
        assert_close(result.confidence.data_completeness, 2.0 / 3.0);
    }

    #[test]
    fn test_estimated_flag_propagates() {
        let engine = ValuationEngine::default();
        let input = ValuationInput {
            is_estimated: true,
            ..rich_input(2.0)
        };
        let result = engine.evaluate("SOL", &input, AssetCategory::Growth);
        assert!(result.confidence.is_estimated);
        assert_eq!(result.category, AssetCategory::Growth);
    }

    #[test]
    fn test_evaluate_input_classifies_market_pair() {
        let engine = ValuationEngine::default();
        let result = engine.evaluate_input(&ValuationInput::new("KRW-ETH", 4_000_000.0));
        assert_eq!(result.symbol, "ETH");
        assert_eq!(result.category, AssetCategory::Major);
    }

    #[test]
    fn test_reduce_escalation_with_custom_severity() {
        let mut config = EngineConfig::default();
        config.drivers = DriverConfig {
            high_severity: 0.05,
            medium_severity: 0.02,
            ..DriverConfig::default()
        };
        let engine = ValuationEngine::new(config);

        let input = ValuationInput {
            mvrv: Some(3.2),
            nvt: Some(85.0),
            ma200: Some(32_000.0),
            ath: Some(55_000.0),
            cycle_low: Some(15_500.0),
            ..ValuationInput::new("BTC", 50_000.0)
        };
        let result = engine.evaluate("BTC", &input, AssetCategory::Core);

        assert!((0.60..0.75).contains(&result.composite_score), "{}", result.composite_score);
        assert_eq!(result.recommendation.action, Action::Reduce);
        assert_eq!(result.recommendation.urgency, Urgency::High);
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValuationEngine>();
    }
}
