//! Valuation Service
//!
//! One refresh cycle over a snapshot source:
//!
//! ```text
//! source ──► reference (BTC) ──────────────┐
//!    │                                     ▼
//!    ├──► symbol ── on-chain data? ── no ─► CrossAssetEstimator
//!    │                  │ yes                  │
//!    │                  ▼                      ▼
//!    │            ValuationEngine ◄────────────┘
//!    │
//!    └──► cash indicators ──► CashAllocationEngine
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cash::{CashAllocationEngine, CashRecommendation};
use crate::classifier::normalize_symbol;
use crate::config::EngineConfig;
use crate::engine::ValuationEngine;
use crate::error::Result;
use crate::estimator::CrossAssetEstimator;
use crate::model::{ValuationInput, ValuationResult};
use crate::source::SnapshotSource;

/// Default reference asset for cross-asset estimates
pub const DEFAULT_REFERENCE: &str = "BTC";

/// Result of one refresh cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshReport {
    pub cycle_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub valuations: Vec<ValuationResult>,
    pub cash: CashRecommendation,
    /// Symbols that could not be loaded this cycle
    pub skipped: Vec<String>,
}

impl RefreshReport {
    pub fn valuation(&self, symbol: &str) -> Option<&ValuationResult> {
        let symbol = normalize_symbol(symbol);
        self.valuations.iter().find(|v| v.symbol == symbol)
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "═══ VALUATION CYCLE {} ({}) ═══\n\n",
            self.cycle_id,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        for valuation in &self.valuations {
            s.push_str(&valuation.summary());
            s.push('\n');
        }
        if !self.skipped.is_empty() {
            s.push_str(&format!("Skipped: {}\n\n", self.skipped.join(", ")));
        }
        s.push_str(&self.cash.summary());
        s
    }
}

/// Drives the engines from a snapshot source
pub struct ValuationService {
    source: Arc<dyn SnapshotSource>,
    engine: ValuationEngine,
    estimator: CrossAssetEstimator,
    cash_engine: CashAllocationEngine,
    reference_symbol: String,
}

impl ValuationService {
    pub fn new(source: Arc<dyn SnapshotSource>, config: EngineConfig) -> Self {
        Self {
            source,
            estimator: CrossAssetEstimator::new(&config),
            cash_engine: CashAllocationEngine::from_config(&config),
            engine: ValuationEngine::new(config),
            reference_symbol: DEFAULT_REFERENCE.to_string(),
        }
    }

    /// Validate `config` before building the engines
    pub fn try_new(source: Arc<dyn SnapshotSource>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(source, config))
    }

    pub fn with_reference(mut self, symbol: &str) -> Self {
        self.reference_symbol = normalize_symbol(symbol);
        self
    }

    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    /// Evaluate `symbols` and the cash position.
    ///
    /// Symbols the source cannot supply are logged and skipped. A failing
    /// cash source scores an empty indicator set.
    pub async fn refresh(&self, symbols: &[&str]) -> RefreshReport {
        let cycle_id = Uuid::new_v4();
        tracing::info!(
            %cycle_id,
            source = self.source.name(),
            symbols = symbols.len(),
            "Starting valuation cycle"
        );

        let reference = match self.source.valuation_input(&self.reference_symbol).await {
            Ok(input) => Some(input),
            Err(e) => {
                tracing::warn!(
                    reference = %self.reference_symbol,
                    error = %e,
                    "Reference snapshot unavailable, estimates will be minimal"
                );
                None
            }
        };

        let symbols: Vec<String> = symbols.iter().map(|s| normalize_symbol(s)).collect();
        let to_fetch: Vec<String> = symbols
            .iter()
            .filter(|s| **s != self.reference_symbol)
            .cloned()
            .collect();
        let fetched: HashMap<String, Result<ValuationInput>> =
            self.source.valuation_inputs(&to_fetch).await.into_iter().collect();

        let mut valuations = Vec::with_capacity(symbols.len());
        let mut skipped = Vec::new();

        for symbol in symbols {
            let input = if symbol == self.reference_symbol {
                reference.clone()
            } else {
                fetched
                    .get(&symbol)
                    .and_then(|input| input.as_ref().ok())
                    .cloned()
            };

            let Some(input) = input else {
                skipped.push(symbol);
                continue;
            };

            let input = self.with_estimates(input, reference.as_ref());
            valuations.push(self.engine.evaluate_input(&input));
        }

        let indicators = match self.source.cash_indicators().await {
            Ok(indicators) => indicators,
            Err(e) => {
                tracing::warn!(error = %e, "Cash indicators unavailable, scoring neutral");
                Default::default()
            }
        };
        let cash = self.cash_engine.recommend(&indicators);

        tracing::info!(
            %cycle_id,
            evaluated = valuations.len(),
            skipped = skipped.len(),
            cash = %cash.recommended_cash,
            "Valuation cycle complete"
        );

        RefreshReport {
            cycle_id,
            generated_at: Utc::now(),
            valuations,
            cash,
            skipped,
        }
    }

    /// Fill absent on-chain fields from the reference when the snapshot has none
    fn with_estimates(&self, input: ValuationInput, reference: Option<&ValuationInput>) -> ValuationInput {
        if input.has_onchain_data() || input.symbol == self.reference_symbol {
            return input;
        }
        tracing::debug!(symbol = %input.symbol, "No on-chain data, estimating from reference");
        self.estimator.fill_missing(input, reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash::{CashIndicators, CashRiskLevel};
    use crate::classifier::AssetCategory;
    use crate::model::{MetricId, SentimentRecord};
    use crate::source::MemorySource;

    fn btc() -> ValuationInput {
        ValuationInput {
            mvrv: Some(2.4),
            nvt: Some(70.0),
            exchange_netflow: Some(-3_000.0),
            ma200: Some(52_000.0),
            fear_greed: Some(64.0),
            ..ValuationInput::new("BTC", 60_000.0)
        }
    }

    fn service(source: MemorySource) -> ValuationService {
        ValuationService::new(Arc::new(source), EngineConfig::default())
    }

    #[tokio::test]
    async fn test_refresh_estimates_missing_onchain() {
        let source = MemorySource::new()
            .with_input(btc())
            .with_input(ValuationInput {
                ma200: Some(0.25),
                ..ValuationInput::new("DOGE", 0.38)
            });

        let report = service(source).refresh(&["BTC", "DOGE"]).await;
        assert_eq!(report.valuations.len(), 2);
        assert!(report.skipped.is_empty());

        let btc = report.valuation("BTC").unwrap();
        assert!(!btc.confidence.is_estimated);
        assert_eq!(btc.category, AssetCategory::Core);

        let doge = report.valuation("DOGE").unwrap();
        assert!(doge.confidence.is_estimated);
        assert_eq!(doge.category, AssetCategory::Speculative);
        assert!(!doge.long_term.metrics.is_empty());
    }

    #[tokio::test]
    async fn test_estimates_keep_asset_market_data() {
        let source = MemorySource::new().with_input(btc()).with_input(ValuationInput {
            ma50: Some(100.0),
            ath: Some(260.0),
            cycle_low: Some(20.0),
            funding_rate: Some(0.09),
            kimchi_premium: Some(11.0),
            sentiment: Some(SentimentRecord {
                social_score: Some(90.0),
                news_score: None,
            }),
            ..ValuationInput::new("SOL", 150.0)
        });

        let report = service(source).refresh(&["BTC", "SOL"]).await;
        let sol = report.valuation("SOL").unwrap();
        assert!(sol.confidence.is_estimated);

        let metrics = |assessment: &crate::model::TimeframeAssessment| {
            assessment.metrics.iter().map(|m| m.metric).collect::<Vec<_>>()
        };
        let short = metrics(&sol.short_term);
        let long = metrics(&sol.long_term);
        for metric in [
            MetricId::PriceVsMa50,
            MetricId::FundingRate,
            MetricId::KimchiPremium,
            MetricId::SocialSentiment,
            MetricId::ExchangeNetflow,
        ] {
            assert!(short.contains(&metric), "{metric} missing from short term");
        }
        assert!(long.contains(&MetricId::CyclePosition));
        assert!(long.contains(&MetricId::Mvrv));

        let kimchi = sol
            .short_term
            .metrics
            .iter()
            .find(|m| m.metric == MetricId::KimchiPremium)
            .unwrap();
        assert_eq!(kimchi.value, 11.0);
    }

    #[tokio::test]
    async fn test_refresh_skips_unknown_symbols() {
        let source = MemorySource::new().with_input(btc());
        let report = service(source).refresh(&["BTC", "NOTREAL"]).await;

        assert_eq!(report.valuations.len(), 1);
        assert_eq!(report.skipped, vec!["NOTREAL".to_string()]);
        assert!(report.summary().contains("Skipped: NOTREAL"));
    }

    #[tokio::test]
    async fn test_missing_cash_source_is_balanced() {
        let report = service(MemorySource::new()).refresh(&[]).await;
        assert!(report.valuations.is_empty());
        assert_eq!(report.cash.risk_level, CashRiskLevel::Balanced);
    }

    #[tokio::test]
    async fn test_cash_indicators_flow_through() {
        let source = MemorySource::new().with_cash_indicators(CashIndicators {
            fear_greed: Some(90.0),
            mvrv: Some(4.5),
            kimchi_premium: Some(12.0),
            exchange_flow: Some(15_000.0),
            vix: Some(45.0),
            ..Default::default()
        });
        let report = service(source).refresh(&[]).await;
        assert_eq!(report.cash.risk_level, CashRiskLevel::Preservation);
    }

    #[tokio::test]
    async fn test_missing_reference_degrades_estimates() {
        let source = MemorySource::new().with_input(ValuationInput::new("SOL", 150.0));
        let report = service(source).refresh(&["SOL"]).await;

        let sol = report.valuation("SOL").unwrap();
        assert!(sol.confidence.is_estimated);
        assert_eq!(sol.confidence.overall, 0.0);
    }

    #[test]
    fn test_try_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.cash.mvrv = -1.0;
        assert!(ValuationService::try_new(Arc::new(MemorySource::new()), config).is_err());
    }

    #[tokio::test]
    async fn test_cycle_ids_are_unique() {
        let service = service(MemorySource::new());
        let a = service.refresh(&[]).await;
        let b = service.refresh(&[]).await;
        assert_ne!(a.cycle_id, b.cycle_id);
    }
}
