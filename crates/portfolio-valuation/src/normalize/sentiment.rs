//! Crowd sentiment normalizers. These map linearly with no reshaping.

use crate::model::{MetricAnalysis, MetricId};

const FEAR_GREED_CONFIDENCE: f64 = 1.0;
const SOCIAL_CONFIDENCE: f64 = 0.9;
const NEWS_CONFIDENCE: f64 = 0.8;

/// Fear & Greed index (0-100)
pub fn fear_greed(value: f64) -> MetricAnalysis {
    if !value.is_finite() {
        return MetricAnalysis::neutral(MetricId::FearGreed, value, "Fear & Greed unavailable");
    }

    let value = value.clamp(0.0, 100.0);
    let mood = if value < 25.0 {
        "Extreme fear"
    } else if value < 45.0 {
        "Fear"
    } else if value <= 55.0 {
        "Neutral"
    } else if value <= 75.0 {
        "Greed"
    } else {
        "Extreme greed"
    };

    MetricAnalysis::new(
        MetricId::FearGreed,
        value,
        value / 100.0,
        FEAR_GREED_CONFIDENCE,
        format!("{mood} ({value:.0})"),
    )
}

/// Aggregated social media sentiment (-100..+100)
pub fn social_sentiment(value: f64) -> MetricAnalysis {
    polarity(MetricId::SocialSentiment, value, SOCIAL_CONFIDENCE, "Social")
}

/// News sentiment (-100..+100). Trusted less than social aggregates.
pub fn news_sentiment(value: f64) -> MetricAnalysis {
    polarity(MetricId::NewsSentiment, value, NEWS_CONFIDENCE, "News")
}

fn polarity(metric: MetricId, value: f64, confidence: f64, source: &str) -> MetricAnalysis {
    if !value.is_finite() {
        return MetricAnalysis::neutral(metric, value, format!("{source} sentiment unavailable"));
    }

    let value = value.clamp(-100.0, 100.0);
    let tone = if value <= -50.0 {
        "very negative"
    } else if value < -10.0 {
        "negative"
    } else if value <= 10.0 {
        "mixed"
    } else if value < 50.0 {
        "positive"
    } else {
        "euphoric"
    };

    MetricAnalysis::new(
        metric,
        value,
        (value + 100.0) / 200.0,
        confidence,
        format!("{source} sentiment {tone} ({value:+.0})"),
    )
}
