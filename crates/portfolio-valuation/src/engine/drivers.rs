//! Driver attribution and action recommendation.

use crate::config::DriverConfig;
use crate::model::{
    Action, Direction, KeyDriver, Recommendation, Severity, TimeframeAssessment, Urgency,
};

pub fn direction(normalized_score: f64, config: &DriverConfig) -> Direction {
    if normalized_score < config.bullish_below {
        Direction::Bullish
    } else if normalized_score > config.bearish_above {
        Direction::Bearish
    } else {
        Direction::Neutral
    }
}

pub fn severity(contribution: f64, config: &DriverConfig) -> Severity {
    if contribution > config.high_severity {
        Severity::High
    } else if contribution > config.medium_severity {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// Pool metrics from every assessment and keep the strongest contributors.
///
/// A metric used by several timeframes appears once per timeframe.
pub fn extract_drivers(assessments: &[&TimeframeAssessment], config: &DriverConfig) -> Vec<KeyDriver> {
    let mut drivers: Vec<KeyDriver> = assessments
        .iter()
        .flat_map(|assessment| {
            assessment.metrics.iter().map(|metric| {
                let contribution =
                    (metric.normalized_score - 0.5).abs() * metric.weight * metric.confidence;
                KeyDriver {
                    metric: metric.metric,
                    timeframe: assessment.timeframe,
                    value: metric.value,
                    normalized_score: metric.normalized_score,
                    contribution,
                    direction: direction(metric.normalized_score, config),
                    severity: severity(contribution, config),
                    reason: metric.reason.clone(),
                }
            })
        })
        .collect();

    drivers.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    drivers.truncate(config.max_drivers);
    drivers
}

/// Map the composite score to an action.
///
/// A REDUCE escalates to high urgency when enough high-severity bearish
/// drivers agree.
pub fn recommend(composite_score: f64, drivers: &[KeyDriver], config: &DriverConfig) -> Recommendation {
    let high_bearish = drivers
        .iter()
        .filter(|d| d.direction == Direction::Bearish && d.severity == Severity::High)
        .count();

    let (action, urgency, headline) = if composite_score < 0.15 {
        (Action::Accumulate, Urgency::High, "Deep value across timeframes")
    } else if composite_score < 0.25 {
        (Action::Accumulate, Urgency::Medium, "Undervalued, scale in")
    } else if composite_score < 0.45 {
        (Action::Accumulate, Urgency::Low, "Fairly valued, accumulate gradually")
    } else if composite_score < 0.60 {
        (Action::Hold, Urgency::Low, "Valuation elevated but not stretched")
    } else if composite_score < 0.75 {
        let urgency = if high_bearish >= config.escalation_count {
            Urgency::High
        } else {
            Urgency::Medium
        };
        (Action::Reduce, urgency, "Overvalued, trim exposure")
    } else {
        (Action::Exit, Urgency::High, "Extreme overvaluation, take profit")
    };

    let lead = match action {
        Action::Accumulate => drivers.iter().find(|d| d.direction == Direction::Bullish),
        Action::Reduce | Action::Exit => drivers.iter().find(|d| d.direction == Direction::Bearish),
        Action::Hold => None,
    };

    let reason = match lead {
        Some(driver) => format!(
            "{headline} (score {:.0}/100, led by {})",
            composite_score * 100.0,
            driver.metric.label()
        ),
        None => format!("{headline} (score {:.0}/100)", composite_score * 100.0),
    };

    Recommendation {
        action,
        reason,
        urgency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricAnalysis, MetricId, RiskLevel, Timeframe};

    fn assessment(timeframe: Timeframe, metrics: Vec<MetricAnalysis>) -> TimeframeAssessment {
        TimeframeAssessment {
            timeframe,
            overvaluation_score: 0.5,
            risk_level: RiskLevel::Elevated,
            metrics,
            confidence: 1.0,
        }
    }

    fn metric(id: MetricId, score: f64, weight: f64) -> MetricAnalysis {
        MetricAnalysis::new(id, 0.0, score, 1.0, "test").with_weight(weight)
    }

    fn bearish_high(metric: MetricId) -> KeyDriver {
        KeyDriver {
            metric,
            timeframe: Timeframe::Long,
            value: 0.0,
            normalized_score: 0.95,
            contribution: 0.2,
            direction: Direction::Bearish,
            severity: Severity::High,
            reason: String::new(),
        }
    }

    #[test]
    fn test_direction_and_severity_bands() {
        let config = DriverConfig::default();
        assert_eq!(direction(0.39, &config), Direction::Bullish);
        assert_eq!(direction(0.4, &config), Direction::Neutral);
        assert_eq!(direction(0.6, &config), Direction::Neutral);
        assert_eq!(direction(0.61, &config), Direction::Bearish);
        assert_eq!(severity(0.16, &config), Severity::High);
        assert_eq!(severity(0.15, &config), Severity::Medium);
        assert_eq!(severity(0.08, &config), Severity::Low);
    }

    #[test]
    fn test_drivers_sorted_and_capped() {
        let config = DriverConfig::default();
        let short = assessment(
            Timeframe::Short,
            vec![
                metric(MetricId::FearGreed, 0.9, 0.15),
                metric(MetricId::FundingRate, 0.5, 0.15),
                metric(MetricId::KimchiPremium, 0.1, 0.10),
                metric(MetricId::PriceVsMa50, 0.7, 0.20),
            ],
        );
        let long = assessment(
            Timeframe::Long,
            vec![
                metric(MetricId::Mvrv, 1.0, 0.28),
                metric(MetricId::Nvt, 0.2, 0.18),
                metric(MetricId::SocialSentiment, 0.6, 0.08),
            ],
        );

        let drivers = extract_drivers(&[&short, &long], &config);
        assert_eq!(drivers.len(), 5);
        assert_eq!(drivers[0].metric, MetricId::Mvrv);
        assert!(drivers
            .windows(2)
            .all(|pair| pair[0].contribution >= pair[1].contribution));
        assert!(drivers.iter().all(|d| d.metric != MetricId::FundingRate));
        assert_eq!(drivers[0].direction, Direction::Bearish);
    }

    #[test]
    fn test_recommendation_table() {
        let config = DriverConfig::default();
        let cases = [
            (0.10, Action::Accumulate, Urgency::High),
            (0.15, Action::Accumulate, Urgency::Medium),
            (0.25, Action::Accumulate, Urgency::Low),
            (0.45, Action::Hold, Urgency::Low),
            (0.60, Action::Reduce, Urgency::Medium),
            (0.75, Action::Exit, Urgency::High),
            (0.99, Action::Exit, Urgency::High),
        ];
        for (score, action, urgency) in cases {
            let rec = recommend(score, &[], &config);
            assert_eq!((rec.action, rec.urgency), (action, urgency), "score {score}");
        }
    }

    #[test]
    fn test_reduce_escalates_with_bearish_drivers() {
        let config = DriverConfig::default();
        let one = [bearish_high(MetricId::Mvrv)];
        assert_eq!(recommend(0.7, &one, &config).urgency, Urgency::Medium);

        let two = [bearish_high(MetricId::Mvrv), bearish_high(MetricId::Nvt)];
        let rec = recommend(0.7, &two, &config);
        assert_eq!(rec.action, Action::Reduce);
        assert_eq!(rec.urgency, Urgency::High);
        assert!(rec.reason.contains("MVRV"));
    }
}
