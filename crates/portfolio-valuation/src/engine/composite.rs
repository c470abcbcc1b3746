//! Composite Risk Engine
//!
//! Blends the three timeframe assessments into one valuation result.

use tracing::debug;

use super::drivers::{extract_drivers, recommend};
use super::timeframe::assess_timeframe;
use crate::classifier::AssetCategory;
use crate::config::EngineConfig;
use crate::model::{RiskLevel, Timeframe, ValuationConfidence, ValuationInput, ValuationResult};

pub fn evaluate_asset(
    config: &EngineConfig,
    symbol: &str,
    input: &ValuationInput,
    category: AssetCategory,
) -> ValuationResult {
    let thresholds = config.categories.get(category);
    let assess = |timeframe: Timeframe| {
        assess_timeframe(timeframe, config.timeframes.table(timeframe), input, thresholds)
    };

    let short_term = assess(Timeframe::Short);
    let medium_term = assess(Timeframe::Medium);
    let long_term = assess(Timeframe::Long);

    let composite = &config.composite;
    let composite_score = composite
        .blend(
            short_term.overvaluation_score,
            medium_term.overvaluation_score,
            long_term.overvaluation_score,
        )
        .clamp(0.0, 1.0);
    let overall_confidence = composite
        .blend(short_term.confidence, medium_term.confidence, long_term.confidence)
        .clamp(0.0, 1.0);

    let assessments = [&short_term, &medium_term, &long_term];
    let collected: usize = assessments.iter().map(|a| a.metrics.len()).sum();
    let usable: usize = assessments
        .iter()
        .flat_map(|a| a.metrics.iter())
        .filter(|m| m.confidence > 0.0)
        .count();
    let data_completeness = if collected > 0 {
        usable as f64 / collected as f64
    } else {
        0.0
    };

    let key_drivers = extract_drivers(&assessments, &config.drivers);
    let recommendation = recommend(composite_score, &key_drivers, &config.drivers);
    let risk_level = RiskLevel::from_score(composite_score);

    debug!(
        symbol,
        %category,
        composite_score,
        risk = %risk_level,
        action = %recommendation.action,
        data_completeness,
        "asset evaluated"
    );

    ValuationResult {
        symbol: symbol.to_string(),
        category,
        composite_score,
        risk_level,
        short_term,
        medium_term,
        long_term,
        key_drivers,
        confidence: ValuationConfidence {
            overall: overall_confidence,
            data_completeness,
            is_estimated: input.is_estimated,
        },
        recommendation,
    }
}
