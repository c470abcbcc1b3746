//! Timeframe Aggregator
//!
//! Confidence-weighted average of the normalizers listed in one timeframe's
//! weight table.

use tracing::debug;

use crate::classifier::CategoryThresholds;
use crate::config::MetricWeight;
use crate::model::{RiskLevel, Timeframe, TimeframeAssessment, ValuationInput};
use crate::normalize;

/// Score when no metric in the table was available
const NEUTRAL_SCORE: f64 = 0.5;

/// Aggregate every table metric present in `input`.
///
/// Each metric adds `score * weight * confidence` to the numerator and its
/// bare `weight` to the denominator, so low-confidence readings pull the
/// score toward zero rather than being renormalized away.
pub fn assess_timeframe(
    timeframe: Timeframe,
    table: &[MetricWeight],
    input: &ValuationInput,
    thresholds: &CategoryThresholds,
) -> TimeframeAssessment {
    let mut metrics = Vec::with_capacity(table.len());
    let mut weighted_score = 0.0;
    let mut weighted_confidence = 0.0;
    let mut total_weight = 0.0;

    for row in table {
        let Some(analysis) = normalize::analyze(row.metric, input, thresholds) else {
            continue;
        };
        let analysis = analysis.with_weight(row.weight);

        weighted_score += analysis.normalized_score * analysis.weight * analysis.confidence;
        weighted_confidence += analysis.weight * analysis.confidence;
        total_weight += analysis.weight;
        metrics.push(analysis);
    }

    let (overvaluation_score, confidence) = if total_weight > 0.0 {
        (
            (weighted_score / total_weight).clamp(0.0, 1.0),
            (weighted_confidence / total_weight).clamp(0.0, 1.0),
        )
    } else {
        (NEUTRAL_SCORE, 0.0)
    };

    debug!(
        symbol = %input.symbol,
        %timeframe,
        metrics = metrics.len(),
        score = overvaluation_score,
        confidence,
        "timeframe assessed"
    );

    TimeframeAssessment {
        timeframe,
        overvaluation_score,
        risk_level: RiskLevel::from_score(overvaluation_score),
        metrics,
        confidence,
    }
}
