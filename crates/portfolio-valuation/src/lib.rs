//! # portfolio-valuation
//!
//! Multi-timeframe valuation and risk scoring for crypto assets, plus a
//! portfolio-level cash allocation recommendation.
//!
//! ## Scoring
//!
//! Every metric is normalized to `0.0..=1.0` where higher means more
//! overvalued. Metrics are grouped into three horizons and blended:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Composite = 0.20·short + 0.35·medium + 0.45·long            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  short   MA50, netflow, fear/greed, kimchi, addresses,       │
//! │          social, funding                                     │
//! │  medium  MVRV, MA200, NVT, netflow, fear/greed, social, news │
//! │  long    MVRV, cycle, NVT, MA200, realized price, social     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  < 0.45  ACCUMULATE                                          │
//! │  < 0.60  HOLD                                                │
//! │  < 0.75  REDUCE                                              │
//! │  ≥ 0.75  EXIT                                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Assets are classified into categories (core, major, growth,
//! speculative) whose thresholds shift the overbought lines. Assets
//! without on-chain data get estimates derived from the reference asset
//! scaled by category beta.
//!
//! ## Example
//!
//! ```
//! use portfolio_valuation::{ValuationEngine, ValuationInput};
//!
//! let engine = ValuationEngine::default();
//! let input = ValuationInput {
//!     mvrv: Some(2.4),
//!     ma200: Some(52_000.0),
//!     fear_greed: Some(64.0),
//!     ..ValuationInput::new("BTC", 60_000.0)
//! };
//! let result = engine.evaluate_input(&input);
//! assert!((0.0..=1.0).contains(&result.composite_score));
//! ```

pub mod cash;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod model;
pub mod normalize;
pub mod rebalance;
pub mod service;
pub mod source;

pub use cash::{CashAllocationEngine, CashIndicators, CashRecommendation, CashRiskLevel};
pub use classifier::{classify, normalize_symbol, AssetCategory, CategoryThresholds};
pub use config::EngineConfig;
pub use engine::ValuationEngine;
pub use error::{Result, ValuationError};
pub use estimator::CrossAssetEstimator;
pub use model::{
    Action, KeyDriver, MetricAnalysis, MetricId, RiskLevel, Timeframe, TimeframeAssessment,
    ValuationInput, ValuationResult,
};
pub use rebalance::{RebalanceAction, RebalanceCheck};
pub use service::{RefreshReport, ValuationService};
pub use source::{MemorySource, SnapshotSource};
