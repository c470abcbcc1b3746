//! Domain Models
//!
//! Input snapshots and result records for the valuation engine.
//! Scores are plain `f64` ratios on a [0,1] scale; nothing here is money.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::AssetCategory;

/// Analysis horizon for a timeframe assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// Days to weeks: flows, funding, sentiment, 50-day trend
    Short,
    /// Weeks to months: on-chain valuation plus 200-day trend
    Medium,
    /// Cycle scale: MVRV, NVT, cycle position, realized price
    Long,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Short, Timeframe::Medium, Timeframe::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overvaluation bucket shared by timeframe and composite scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Undervalued,
    FairValue,
    Elevated,
    Overvalued,
    Extreme,
}

impl RiskLevel {
    /// Bucket a [0,1] score. Each boundary belongs to the upper bucket.
    pub fn from_score(score: f64) -> Self {
        if score < 0.2 {
            Self::Undervalued
        } else if score < 0.4 {
            Self::FairValue
        } else if score < 0.6 {
            Self::Elevated
        } else if score < 0.8 {
            Self::Overvalued
        } else {
            Self::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Undervalued => "UNDERVALUED",
            Self::FairValue => "FAIR_VALUE",
            Self::Elevated => "ELEVATED",
            Self::Overvalued => "OVERVALUED",
            Self::Extreme => "EXTREME",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier of a normalized metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    PriceVsMa50,
    PriceVsMa200,
    ExchangeNetflow,
    FearGreed,
    KimchiPremium,
    ActiveAddressRatio,
    SocialSentiment,
    NewsSentiment,
    FundingRate,
    Mvrv,
    Nvt,
    CyclePosition,
    RealizedPriceRatio,
}

impl MetricId {
    pub const ALL: [MetricId; 13] = [
        MetricId::PriceVsMa50,
        MetricId::PriceVsMa200,
        MetricId::ExchangeNetflow,
        MetricId::FearGreed,
        MetricId::KimchiPremium,
        MetricId::ActiveAddressRatio,
        MetricId::SocialSentiment,
        MetricId::NewsSentiment,
        MetricId::FundingRate,
        MetricId::Mvrv,
        MetricId::Nvt,
        MetricId::CyclePosition,
        MetricId::RealizedPriceRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceVsMa50 => "price_vs_ma50",
            Self::PriceVsMa200 => "price_vs_ma200",
            Self::ExchangeNetflow => "exchange_netflow",
            Self::FearGreed => "fear_greed",
            Self::KimchiPremium => "kimchi_premium",
            Self::ActiveAddressRatio => "active_address_ratio",
            Self::SocialSentiment => "social_sentiment",
            Self::NewsSentiment => "news_sentiment",
            Self::FundingRate => "funding_rate",
            Self::Mvrv => "mvrv",
            Self::Nvt => "nvt",
            Self::CyclePosition => "cycle_position",
            Self::RealizedPriceRatio => "realized_price_ratio",
        }
    }

    /// Human-readable name for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::PriceVsMa50 => "Price vs 50D MA",
            Self::PriceVsMa200 => "Price vs 200D MA",
            Self::ExchangeNetflow => "Exchange Netflow",
            Self::FearGreed => "Fear & Greed",
            Self::KimchiPremium => "Kimchi Premium",
            Self::ActiveAddressRatio => "Active Addresses",
            Self::SocialSentiment => "Social Sentiment",
            Self::NewsSentiment => "News Sentiment",
            Self::FundingRate => "Funding Rate",
            Self::Mvrv => "MVRV",
            Self::Nvt => "NVT",
            Self::CyclePosition => "Cycle Position",
            Self::RealizedPriceRatio => "Realized Price Ratio",
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one normalizer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricAnalysis {
    /// Which metric produced this analysis
    pub metric: MetricId,

    /// Raw (or derived) input value, in the metric's own unit
    pub value: f64,

    /// 0 = strong undervaluation signal, 1 = strong overvaluation signal
    pub normalized_score: f64,

    /// Table weight; normalizers emit 0 and the aggregator fills it in
    pub weight: f64,

    /// Trust in this reading, 0 when the input was degraded
    pub confidence: f64,

    /// Explanation of the bucket reached
    pub reason: String,
}

impl MetricAnalysis {
    pub fn new(
        metric: MetricId,
        value: f64,
        normalized_score: f64,
        confidence: f64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            metric,
            value,
            normalized_score: normalized_score.clamp(0.0, 1.0),
            weight: 0.0,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }

    /// Degraded-input result: neutral score, zero confidence
    pub fn neutral(metric: MetricId, value: f64, reason: impl Into<String>) -> Self {
        Self::new(metric, value, 0.5, 0.0, reason)
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Social and news sentiment, each on a -100..+100 scale
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    #[serde(default)]
    pub social_score: Option<f64>,

    #[serde(default)]
    pub news_score: Option<f64>,
}

/// Per-asset indicator snapshot supplied by external fetchers.
///
/// Every indicator is optional; a missing value suppresses its metric.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationInput {
    pub symbol: String,
    pub current_price: f64,
    pub mvrv: Option<f64>,
    pub nvt: Option<f64>,
    pub realized_price: Option<f64>,
    /// Coins moved onto exchanges minus coins moved off (positive = inflow)
    pub exchange_netflow: Option<f64>,
    pub active_addresses: Option<f64>,
    pub active_addresses_30d_avg: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
    pub ath: Option<f64>,
    pub cycle_low: Option<f64>,
    pub fear_greed: Option<f64>,
    /// Percent
    pub kimchi_premium: Option<f64>,
    /// Percent per funding interval
    pub funding_rate: Option<f64>,
    pub sentiment: Option<SentimentRecord>,
    /// Set when on-chain values were derived from a reference asset
    pub is_estimated: bool,
}

impl ValuationInput {
    pub fn new(symbol: impl Into<String>, current_price: f64) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            current_price,
            ..Default::default()
        }
    }

    /// Whether any asset-specific on-chain valuation metric is present
    pub fn has_onchain_data(&self) -> bool {
        self.mvrv.is_some() || self.nvt.is_some() || self.exchange_netflow.is_some()
    }
}

/// Result of aggregating one timeframe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAssessment {
    pub timeframe: Timeframe,
    pub overvaluation_score: f64,
    pub risk_level: RiskLevel,
    pub metrics: Vec<MetricAnalysis>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A metric that moved the composite score, ranked by contribution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyDriver {
    pub metric: MetricId,
    pub timeframe: Timeframe,
    pub value: f64,
    pub normalized_score: f64,
    /// `|score - 0.5| * weight * confidence`
    pub contribution: f64,
    pub direction: Direction,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfidence {
    pub overall: f64,
    /// Share of collected metrics with confidence above zero
    pub data_completeness: f64,
    pub is_estimated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Accumulate,
    Hold,
    Reduce,
    Exit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accumulate => "ACCUMULATE",
            Self::Hold => "HOLD",
            Self::Reduce => "REDUCE",
            Self::Exit => "EXIT",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: String,
    pub urgency: Urgency,
}

/// Full multi-timeframe valuation of one asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub symbol: String,
    pub category: AssetCategory,
    pub composite_score: f64,
    pub risk_level: RiskLevel,
    pub short_term: TimeframeAssessment,
    pub medium_term: TimeframeAssessment,
    pub long_term: TimeframeAssessment,
    pub key_drivers: Vec<KeyDriver>,
    pub confidence: ValuationConfidence,
    pub recommendation: Recommendation,
}

impl ValuationResult {
    pub fn timeframe(&self, timeframe: Timeframe) -> &TimeframeAssessment {
        match timeframe {
            Timeframe::Short => &self.short_term,
            Timeframe::Medium => &self.medium_term,
            Timeframe::Long => &self.long_term,
        }
    }

    /// Plain-text report
    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "{} ({}) - {} {:.0}/100\n",
            self.symbol,
            self.category,
            self.risk_level,
            self.composite_score * 100.0
        ));
        for timeframe in Timeframe::ALL {
            let assessment = self.timeframe(timeframe);
            s.push_str(&format!(
                "  {:<7} {:>5.1}  {:<12} ({} metrics, confidence {:.0}%)\n",
                timeframe.as_str(),
                assessment.overvaluation_score * 100.0,
                assessment.risk_level.label(),
                assessment.metrics.len(),
                assessment.confidence * 100.0
            ));
        }

        if !self.key_drivers.is_empty() {
            s.push_str("  Key drivers:\n");
            for driver in &self.key_drivers {
                s.push_str(&format!(
                    "    - {} [{}] {}\n",
                    driver.metric.label(),
                    driver.timeframe,
                    driver.reason
                ));
            }
        }

        s.push_str(&format!(
            "  Action: {} ({:?} urgency) - {}\n",
            self.recommendation.action, self.recommendation.urgency, self.recommendation.reason
        ));
        s.push_str(&format!(
            "  Confidence: {:.0}%, data completeness {:.0}%{}\n",
            self.confidence.overall * 100.0,
            self.confidence.data_completeness * 100.0,
            if self.confidence.is_estimated { " (estimated)" } else { "" }
        ));
        s
    }
}
