//! Cash Allocation Engine
//!
//! Portfolio-wide cash recommendation from macro and on-chain indicators.
//! This is a separate 0-100 scoring system from the per-asset valuation
//! engine, with its own calibration.

mod scorers;

pub use scorers::{
    exchange_flow_score, fear_greed_score, kimchi_premium_score, market_trend_score, mvrv_score,
    nvt_score, volatility_score,
};

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CashWeights, EngineConfig};
use crate::error::Result;

/// Score used when no indicator is available
const NEUTRAL_SCORE: f64 = 50.0;

/// Raw indicators for the cash engine. All optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashIndicators {
    pub fear_greed: Option<f64>,
    pub mvrv: Option<f64>,
    /// Percent
    pub kimchi_premium: Option<f64>,
    /// Reference-asset exchange netflow, positive = inflow
    pub exchange_flow: Option<f64>,
    /// Reference-asset price for the trend indicator
    pub reference_price: Option<f64>,
    /// Reference-asset 200-day moving average
    pub reference_ma200: Option<f64>,
    /// VIX or an equivalent volatility index
    pub vix: Option<f64>,
    pub nvt: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashIndicator {
    FearGreed,
    Mvrv,
    KimchiPremium,
    ExchangeFlow,
    MarketTrend,
    Volatility,
    Nvt,
}

impl CashIndicator {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FearGreed => "Fear & Greed",
            Self::Mvrv => "MVRV",
            Self::KimchiPremium => "Kimchi Premium",
            Self::ExchangeFlow => "Exchange Flow",
            Self::MarketTrend => "Market Trend",
            Self::Volatility => "Volatility",
            Self::Nvt => "NVT",
        }
    }
}

/// Cash stance bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashRiskLevel {
    Aggressive,
    Growth,
    Balanced,
    Cautious,
    Defensive,
    Preservation,
}

impl CashRiskLevel {
    /// Bucket a 0-100 score. Each upper bound is inclusive.
    pub fn from_score(score: f64) -> Self {
        if score <= 25.0 {
            Self::Aggressive
        } else if score <= 40.0 {
            Self::Growth
        } else if score <= 55.0 {
            Self::Balanced
        } else if score <= 70.0 {
            Self::Cautious
        } else if score <= 85.0 {
            Self::Defensive
        } else {
            Self::Preservation
        }
    }

    /// Recommended cash share of the portfolio, in percent
    pub fn cash_percent(&self) -> Decimal {
        match self {
            Self::Aggressive => dec!(10),
            Self::Growth => dec!(20),
            Self::Balanced => dec!(25),
            Self::Cautious => dec!(35),
            Self::Defensive => dec!(45),
            Self::Preservation => dec!(55),
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            Self::Aggressive => "Fear dominates and valuations are low. Deploy cash into core positions.",
            Self::Growth => "Conditions favor buyers. Keep a small reserve and keep accumulating.",
            Self::Balanced => "Mixed signals. Hold a standard reserve and rebalance to targets.",
            Self::Cautious => "Market warming up. Slow new buys and build the cash buffer.",
            Self::Defensive => "Overheated conditions. Trim speculative positions into cash.",
            Self::Preservation => "Euphoria and stretched valuations. Protect capital with a large cash position.",
        }
    }
}

impl fmt::Display for CashRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aggressive => "AGGRESSIVE",
            Self::Growth => "GROWTH",
            Self::Balanced => "BALANCED",
            Self::Cautious => "CAUTIOUS",
            Self::Defensive => "DEFENSIVE",
            Self::Preservation => "PRESERVATION",
        })
    }
}

/// One indicator's contribution to the cash score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashBreakdown {
    pub indicator: CashIndicator,
    pub value: f64,
    pub score: f64,
    pub weight: f64,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashRecommendation {
    /// 0-100, higher means more cash
    pub score: f64,
    pub recommended_cash: Decimal,
    pub risk_level: CashRiskLevel,
    pub strategy: String,
    pub breakdown: Vec<CashBreakdown>,
}

impl CashRecommendation {
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "Cash Allocation: {}% ({}, score {:.0}/100)\n",
            self.recommended_cash, self.risk_level, self.score
        ));
        s.push_str(&format!("{}\n", self.strategy));
        for entry in &self.breakdown {
            s.push_str(&format!(
                "  {:<15} {:>5.0}  x{:.2}  {}\n",
                entry.indicator.label(),
                entry.score,
                entry.weight,
                entry.description
            ));
        }
        s
    }
}

/// Weighted cash allocation engine
#[derive(Clone, Debug, Default)]
pub struct CashAllocationEngine {
    weights: CashWeights,
}

impl CashAllocationEngine {
    /// Wrap `weights` without validation
    pub fn new(weights: CashWeights) -> Self {
        Self { weights }
    }

    /// Reject negative or non-finite weights
    pub fn try_new(weights: CashWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self::new(weights))
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cash)
    }

    /// Score the indicators that are present.
    ///
    /// The average divides by the weights actually used, so a missing
    /// indicator (NVT in particular) never dilutes the others.
    pub fn recommend(&self, indicators: &CashIndicators) -> CashRecommendation {
        let w = &self.weights;
        let mut breakdown = Vec::new();

        let mut push = |indicator, value: f64, (score, description): (f64, &str), weight| {
            breakdown.push(CashBreakdown {
                indicator,
                value,
                score,
                weight,
                description: description.to_string(),
            });
        };

        if let Some(v) = indicators.fear_greed.filter(|v| v.is_finite()) {
            push(CashIndicator::FearGreed, v, fear_greed_score(v), w.fear_greed);
        }
        if let Some(v) = indicators.mvrv.filter(|v| v.is_finite()) {
            push(CashIndicator::Mvrv, v, mvrv_score(v), w.mvrv);
        }
        if let Some(v) = indicators.kimchi_premium.filter(|v| v.is_finite()) {
            push(CashIndicator::KimchiPremium, v, kimchi_premium_score(v), w.kimchi_premium);
        }
        if let Some(v) = indicators.exchange_flow.filter(|v| v.is_finite()) {
            push(CashIndicator::ExchangeFlow, v, exchange_flow_score(v), w.exchange_flow);
        }
        if let (Some(price), Some(ma200)) = (indicators.reference_price, indicators.reference_ma200) {
            if let Some((deviation, score, description)) = market_trend_score(price, ma200) {
                push(CashIndicator::MarketTrend, deviation, (score, description), w.market_trend);
            }
        }
        if let Some(v) = indicators.vix.filter(|v| v.is_finite()) {
            push(CashIndicator::Volatility, v, volatility_score(v), w.volatility);
        }
        if let Some(v) = indicators.nvt.filter(|v| v.is_finite()) {
            push(CashIndicator::Nvt, v, nvt_score(v), w.nvt);
        }

        let total_weight: f64 = breakdown.iter().map(|b| b.weight).sum();
        let score = if total_weight > 0.0 {
            breakdown.iter().map(|b| b.score * b.weight).sum::<f64>() / total_weight
        } else {
            NEUTRAL_SCORE
        };

        let risk_level = CashRiskLevel::from_score(score);
        debug!(
            score,
            indicators = breakdown.len(),
            risk = %risk_level,
            "cash allocation scored"
        );

        CashRecommendation {
            score,
            recommended_cash: risk_level.cash_percent(),
            risk_level,
            strategy: risk_level.strategy().to_string(),
            breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_greed_is_preservation() {
        let engine = CashAllocationEngine::default();
        let rec = engine.recommend(&CashIndicators {
            fear_greed: Some(90.0),
            mvrv: Some(4.5),
            kimchi_premium: Some(12.0),
            exchange_flow: Some(15_000.0),
            vix: Some(45.0),
            ..Default::default()
        });

        assert!((rec.score - 93.0).abs() < 1e-9, "{}", rec.score);
        assert_eq!(rec.risk_level, CashRiskLevel::Preservation);
        assert_eq!(rec.recommended_cash, dec!(55));
        assert_eq!(rec.breakdown.len(), 5);
    }

    #[test]
    fn test_try_new_rejects_negative_weight() {
        let weights = CashWeights {
            volatility: -0.1,
            ..CashWeights::default()
        };
        assert!(matches!(
            CashAllocationEngine::try_new(weights),
            Err(crate::error::ValuationError::Config(ref msg)) if msg.contains("volatility")
        ));
        assert!(CashAllocationEngine::try_new(CashWeights::default()).is_ok());
    }

    #[test]
    fn test_no_data_is_balanced() {
        let rec = CashAllocationEngine::default().recommend(&CashIndicators::default());
        assert_eq!(rec.score, 50.0);
        assert_eq!(rec.risk_level, CashRiskLevel::Balanced);
        assert_eq!(rec.recommended_cash, dec!(25));
        assert!(rec.breakdown.is_empty());
    }

    #[test]
    fn test_deep_fear_is_aggressive() {
        let rec = CashAllocationEngine::default().recommend(&CashIndicators {
            fear_greed: Some(8.0),
            mvrv: Some(0.85),
            kimchi_premium: Some(-1.0),
            exchange_flow: Some(-12_000.0),
            reference_price: Some(25_000.0),
            reference_ma200: Some(35_000.0),
            vix: Some(14.0),
            nvt: Some(40.0),
        });
        assert!(rec.score <= 25.0, "{}", rec.score);
        assert_eq!(rec.risk_level, CashRiskLevel::Aggressive);
        assert_eq!(rec.recommended_cash, dec!(10));
        assert_eq!(rec.breakdown.len(), 7);
    }

    #[test]
    fn test_nvt_presence_renormalizes() {
        let engine = CashAllocationEngine::default();
        let base = CashIndicators {
            mvrv: Some(2.5),
            ..Default::default()
        };
        assert!((engine.recommend(&base).score - 50.0).abs() < 1e-9);

        let with_nvt = CashIndicators {
            nvt: Some(120.0),
            ..base
        };
        // (50 * 0.15 + 85 * 0.10) / 0.25
        let score = engine.recommend(&with_nvt).score;
        assert!((score - 64.0).abs() < 1e-9, "{score}");
    }

    #[test]
    fn test_bucket_boundaries_inclusive() {
        assert_eq!(CashRiskLevel::from_score(25.0), CashRiskLevel::Aggressive);
        assert_eq!(CashRiskLevel::from_score(25.01), CashRiskLevel::Growth);
        assert_eq!(CashRiskLevel::from_score(40.0), CashRiskLevel::Growth);
        assert_eq!(CashRiskLevel::from_score(55.0), CashRiskLevel::Balanced);
        assert_eq!(CashRiskLevel::from_score(70.0), CashRiskLevel::Cautious);
        assert_eq!(CashRiskLevel::from_score(85.0), CashRiskLevel::Defensive);
        assert_eq!(CashRiskLevel::from_score(85.5), CashRiskLevel::Preservation);
    }

    #[test]
    fn test_summary_lists_breakdown() {
        let rec = CashAllocationEngine::default().recommend(&CashIndicators {
            fear_greed: Some(50.0),
            ..Default::default()
        });
        let summary = rec.summary();
        assert!(summary.contains("25%"));
        assert!(summary.contains("Fear & Greed"));
    }
}
