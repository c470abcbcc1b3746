//! Price-derived normalizers: moving-average deviation, cycle position,
//! kimchi premium and perpetual funding rate.

use super::{lerp, overbought_tail};
use crate::classifier::CategoryThresholds;
use crate::model::{MetricAnalysis, MetricId};

/// Confidence for values computed directly from exchange prices
const MARKET_CONFIDENCE: f64 = 1.0;

/// Deviation of price from a moving average.
///
/// `metric` selects which average is being scored (50- or 200-day).
pub fn price_vs_ma(
    metric: MetricId,
    price: f64,
    ma: f64,
    thresholds: &CategoryThresholds,
) -> MetricAnalysis {
    if !(ma.is_finite() && ma > 0.0 && price.is_finite() && price > 0.0) {
        return MetricAnalysis::neutral(metric, 0.0, "Moving average unavailable");
    }

    let deviation = (price - ma) * 100.0 / ma;
    let max = thresholds.ma_deviation_max;

    let (score, reason) = if deviation < -30.0 {
        (
            lerp(deviation, -100.0, -30.0, 0.0, 0.1).max(0.0),
            "Deeply below moving average",
        )
    } else if deviation < -10.0 {
        (lerp(deviation, -30.0, -10.0, 0.1, 0.3), "Below moving average")
    } else if deviation < 30.0 {
        (lerp(deviation, -10.0, 30.0, 0.3, 0.6), "Near moving average")
    } else if deviation < max {
        (lerp(deviation, 30.0, max, 0.6, 0.9), "Stretched above moving average")
    } else {
        (overbought_tail(deviation, max, 0.9), "Parabolic above moving average")
    };

    MetricAnalysis::new(
        metric,
        deviation,
        score,
        MARKET_CONFIDENCE,
        format!("{reason} ({deviation:+.1}%)"),
    )
}

/// Placement of price between the cycle low and the all-time high, in percent.
///
/// `None` when the range is degenerate.
pub fn cycle_position_percent(price: f64, cycle_low: f64, ath: f64) -> Option<f64> {
    let valid = price.is_finite()
        && cycle_low.is_finite()
        && ath.is_finite()
        && cycle_low > 0.0
        && ath > 0.0
        && ath > cycle_low;
    if !valid {
        return None;
    }
    Some(((price - cycle_low) / (ath - cycle_low) * 100.0).clamp(0.0, 100.0))
}

pub fn cycle_position(price: f64, cycle_low: f64, ath: f64) -> MetricAnalysis {
    let Some(position) = cycle_position_percent(price, cycle_low, ath) else {
        return MetricAnalysis::neutral(MetricId::CyclePosition, 0.0, "Cycle range unavailable");
    };

    let reason = if position < 25.0 {
        "Early in cycle, near the low"
    } else if position < 50.0 {
        "Lower half of cycle range"
    } else if position < 75.0 {
        "Upper half of cycle range"
    } else {
        "Late cycle, near all-time high"
    };

    MetricAnalysis::new(
        MetricId::CyclePosition,
        position,
        position / 100.0,
        MARKET_CONFIDENCE,
        format!("{reason} ({position:.0}%)"),
    )
}

/// Premium of the domestic (KRW) price over the global USD price, in percent.
///
/// `None` if any input is non-positive.
pub fn kimchi_premium_percent(domestic_krw: f64, global_usd: f64, usd_krw: f64) -> Option<f64> {
    if !(domestic_krw > 0.0 && global_usd > 0.0 && usd_krw > 0.0) {
        return None;
    }
    let premium = (domestic_krw / (global_usd * usd_krw) - 1.0) * 100.0;
    premium.is_finite().then_some(premium)
}

pub fn kimchi_premium(value: f64) -> MetricAnalysis {
    if !value.is_finite() {
        return MetricAnalysis::neutral(MetricId::KimchiPremium, value, "Premium unavailable");
    }

    let (score, reason) = if value < -2.0 {
        (0.1, "Domestic discount: local demand weak")
    } else if value < 2.0 {
        (0.4, "Domestic price in line with global")
    } else if value < 5.0 {
        (0.6, "Mild domestic premium")
    } else if value < 10.0 {
        (0.8, "High domestic premium: retail froth")
    } else {
        (0.95, "Extreme domestic premium")
    };

    MetricAnalysis::new(
        MetricId::KimchiPremium,
        value,
        score,
        MARKET_CONFIDENCE,
        format!("{reason} ({value:+.2}%)"),
    )
}

/// Perpetual futures funding rate, in percent per interval
pub fn funding_rate(value: f64) -> MetricAnalysis {
    if !value.is_finite() {
        return MetricAnalysis::neutral(MetricId::FundingRate, value, "Funding rate unavailable");
    }

    let (score, reason) = if value < -0.05 {
        (0.1, "Shorts paying heavily")
    } else if value < 0.0 {
        (0.3, "Negative funding")
    } else if value < 0.03 {
        (0.5, "Neutral funding")
    } else if value < 0.08 {
        (0.75, "Longs paying a premium")
    } else {
        (0.9, "Overheated leverage")
    };

    MetricAnalysis::new(
        MetricId::FundingRate,
        value,
        score,
        MARKET_CONFIDENCE,
        format!("{reason} ({value:+.3}%)"),
    )
}
