//! Engine Configuration
//!
//! Weight tables and thresholds are immutable values owned by the engines.
//! `Default` reproduces the calibrated tables; JSON files can override any
//! section for experiments or tests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{AssetCategory, CategoryThresholds};
use crate::error::{Result, ValuationError};
use crate::model::{MetricId, Timeframe};

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "VALUATION_CONFIG";

/// Tolerance for the composite weights summing to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// One row of a timeframe weight table
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricWeight {
    pub metric: MetricId,
    pub weight: f64,
}

const fn w(metric: MetricId, weight: f64) -> MetricWeight {
    MetricWeight { metric, weight }
}

/// Per-timeframe metric weights. Metrics not listed are not evaluated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeframeWeights {
    pub short: Vec<MetricWeight>,
    pub medium: Vec<MetricWeight>,
    pub long: Vec<MetricWeight>,
}

impl Default for TimeframeWeights {
    fn default() -> Self {
        Self {
            short: vec![
                w(MetricId::PriceVsMa50, 0.20),
                w(MetricId::ExchangeNetflow, 0.15),
                w(MetricId::FearGreed, 0.15),
                w(MetricId::KimchiPremium, 0.10),
                w(MetricId::ActiveAddressRatio, 0.10),
                w(MetricId::SocialSentiment, 0.15),
                w(MetricId::FundingRate, 0.15),
            ],
            medium: vec![
                w(MetricId::Mvrv, 0.22),
                w(MetricId::PriceVsMa200, 0.18),
                w(MetricId::Nvt, 0.15),
                w(MetricId::ExchangeNetflow, 0.12),
                w(MetricId::FearGreed, 0.13),
                w(MetricId::SocialSentiment, 0.10),
                w(MetricId::NewsSentiment, 0.10),
            ],
            long: vec![
                w(MetricId::Mvrv, 0.28),
                w(MetricId::CyclePosition, 0.18),
                w(MetricId::Nvt, 0.18),
                w(MetricId::PriceVsMa200, 0.14),
                w(MetricId::RealizedPriceRatio, 0.14),
                w(MetricId::SocialSentiment, 0.08),
            ],
        }
    }
}

impl TimeframeWeights {
    pub fn table(&self, timeframe: Timeframe) -> &[MetricWeight] {
        match timeframe {
            Timeframe::Short => &self.short,
            Timeframe::Medium => &self.medium,
            Timeframe::Long => &self.long,
        }
    }

    pub fn weight(&self, timeframe: Timeframe, metric: MetricId) -> Option<f64> {
        self.table(timeframe)
            .iter()
            .find(|row| row.metric == metric)
            .map(|row| row.weight)
    }

    /// Sum of all weights in one table
    pub fn total(&self, timeframe: Timeframe) -> f64 {
        self.table(timeframe).iter().map(|row| row.weight).sum()
    }
}

/// Blend of the three timeframe scores into the composite
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub short: f64,
    pub medium: f64,
    pub long: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            short: 0.20,
            medium: 0.35,
            long: 0.45,
        }
    }
}

impl CompositeWeights {
    pub fn weight(&self, timeframe: Timeframe) -> f64 {
        match timeframe {
            Timeframe::Short => self.short,
            Timeframe::Medium => self.medium,
            Timeframe::Long => self.long,
        }
    }

    pub fn sum(&self) -> f64 {
        self.short + self.medium + self.long
    }

    /// Weighted blend of per-timeframe values
    pub fn blend(&self, short: f64, medium: f64, long: f64) -> f64 {
        short * self.weight(Timeframe::Short)
            + medium * self.weight(Timeframe::Medium)
            + long * self.weight(Timeframe::Long)
    }
}

/// Driver ranking and recommendation escalation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub max_drivers: usize,
    /// Contribution above this is high severity
    pub high_severity: f64,
    /// Contribution above this is medium severity
    pub medium_severity: f64,
    /// Scores below this read as bullish
    pub bullish_below: f64,
    /// Scores above this read as bearish
    pub bearish_above: f64,
    /// High-severity bearish drivers needed to escalate a REDUCE
    pub escalation_count: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_drivers: 5,
            high_severity: 0.15,
            medium_severity: 0.08,
            bullish_below: 0.4,
            bearish_above: 0.6,
            escalation_count: 2,
        }
    }
}

/// Thresholds for every category
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub core: CategoryThresholds,
    pub major: CategoryThresholds,
    pub growth: CategoryThresholds,
    pub speculative: CategoryThresholds,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            core: CategoryThresholds::for_category(AssetCategory::Core),
            major: CategoryThresholds::for_category(AssetCategory::Major),
            growth: CategoryThresholds::for_category(AssetCategory::Growth),
            speculative: CategoryThresholds::for_category(AssetCategory::Speculative),
        }
    }
}

impl CategoryTable {
    pub fn get(&self, category: AssetCategory) -> &CategoryThresholds {
        match category {
            AssetCategory::Core => &self.core,
            AssetCategory::Major => &self.major,
            AssetCategory::Growth => &self.growth,
            AssetCategory::Speculative => &self.speculative,
        }
    }
}

/// Cross-asset estimation bounds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub mvrv_min: f64,
    pub mvrv_max: f64,
    /// Share of the beta excess applied to NVT
    pub nvt_beta_damping: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            mvrv_min: 0.5,
            mvrv_max: 5.0,
            nvt_beta_damping: 0.3,
        }
    }
}

/// Weights of the cash allocation indicators (0-100 scale system)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashWeights {
    pub fear_greed: f64,
    pub mvrv: f64,
    pub kimchi_premium: f64,
    pub exchange_flow: f64,
    pub market_trend: f64,
    pub volatility: f64,
    /// Only used when NVT is present
    pub nvt: f64,
}

impl Default for CashWeights {
    fn default() -> Self {
        Self {
            fear_greed: 0.20,
            mvrv: 0.15,
            kimchi_premium: 0.10,
            exchange_flow: 0.15,
            market_trend: 0.15,
            volatility: 0.15,
            nvt: 0.10,
        }
    }
}

impl CashWeights {
    /// Every weight must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.all() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ValuationError::Config(format!(
                    "cash weight {name} must be non-negative, got {weight}"
                )));
            }
        }
        Ok(())
    }

    fn all(&self) -> [(&'static str, f64); 7] {
        [
            ("fear_greed", self.fear_greed),
            ("mvrv", self.mvrv),
            ("kimchi_premium", self.kimchi_premium),
            ("exchange_flow", self.exchange_flow),
            ("market_trend", self.market_trend),
            ("volatility", self.volatility),
            ("nvt", self.nvt),
        ]
    }
}

/// Complete engine configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeframes: TimeframeWeights,
    pub composite: CompositeWeights,
    pub drivers: DriverConfig,
    pub categories: CategoryTable,
    pub estimator: EstimatorConfig,
    pub cash: CashWeights,
}

impl EngineConfig {
    /// Parse and validate a JSON document. Missing sections keep defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading valuation config");
        Self::from_json_str(&json)
    }

    /// Load from the file named by `VALUATION_CONFIG`, or defaults if unset
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_path(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        for timeframe in Timeframe::ALL {
            for row in self.timeframes.table(timeframe) {
                if !row.weight.is_finite() || row.weight < 0.0 {
                    return Err(ValuationError::InvalidWeight {
                        metric: row.metric,
                        timeframe,
                        weight: row.weight,
                    });
                }
            }
        }

        let composite = [self.composite.short, self.composite.medium, self.composite.long];
        if composite.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ValuationError::Config(
                "composite weights must be non-negative".into(),
            ));
        }
        if (self.composite.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValuationError::Config(format!(
                "composite weights sum to {}, expected 1.0",
                self.composite.sum()
            )));
        }

        let drivers = &self.drivers;
        if drivers.medium_severity > drivers.high_severity {
            return Err(ValuationError::Config(
                "medium severity threshold exceeds high severity threshold".into(),
            ));
        }
        if drivers.bullish_below > drivers.bearish_above {
            return Err(ValuationError::Config(
                "bullish band overlaps bearish band".into(),
            ));
        }

        for category in AssetCategory::ALL {
            self.categories
                .get(category)
                .check()
                .map_err(|reason| ValuationError::InvalidThreshold { category, reason })?;
        }

        let estimator = &self.estimator;
        if !(estimator.mvrv_min < estimator.mvrv_max) {
            return Err(ValuationError::Config(format!(
                "estimator MVRV bounds [{}, {}] are inverted",
                estimator.mvrv_min, estimator.mvrv_max
            )));
        }

        self.cash.validate()
    }
}
