//! Metric Normalizers
//!
//! Each normalizer maps one raw indicator onto a [0,1] overvaluation signal
//! (0 = strongly undervalued, 1 = strongly overvalued) with a confidence and
//! a short reason. Degraded input never fails: it yields a neutral 0.5 score
//! with zero confidence.
//!
//! [`analyze`] is the single registry that knows how to pull each
//! [`MetricId`] out of a [`ValuationInput`]. Timeframe weight tables only
//! name metrics, so adding a metric means one arm here plus a table entry.

mod market;
mod onchain;
mod sentiment;

pub use market::{
    cycle_position, cycle_position_percent, funding_rate, kimchi_premium, kimchi_premium_percent,
    price_vs_ma,
};
pub use onchain::{active_address_ratio, exchange_netflow, mvrv, nvt, realized_price_ratio};
pub use sentiment::{fear_greed, news_sentiment, social_sentiment};

use crate::classifier::CategoryThresholds;
use crate::model::{MetricAnalysis, MetricId, ValuationInput};

/// Run the normalizer for `metric` if its inputs are present.
///
/// Returns `None` when the snapshot does not carry the metric at all, which
/// callers treat as "skip" rather than as a neutral reading.
pub fn analyze(
    metric: MetricId,
    input: &ValuationInput,
    thresholds: &CategoryThresholds,
) -> Option<MetricAnalysis> {
    let price = input.current_price;
    match metric {
        MetricId::PriceVsMa50 => input
            .ma50
            .map(|ma| price_vs_ma(MetricId::PriceVsMa50, price, ma, thresholds)),
        MetricId::PriceVsMa200 => input
            .ma200
            .map(|ma| price_vs_ma(MetricId::PriceVsMa200, price, ma, thresholds)),
        MetricId::ExchangeNetflow => input.exchange_netflow.map(exchange_netflow),
        MetricId::FearGreed => input.fear_greed.map(fear_greed),
        MetricId::KimchiPremium => input.kimchi_premium.map(kimchi_premium),
        MetricId::ActiveAddressRatio => match (input.active_addresses, input.active_addresses_30d_avg) {
            (Some(current), Some(avg)) => Some(active_address_ratio(current, avg)),
            _ => None,
        },
        MetricId::SocialSentiment => input
            .sentiment
            .as_ref()
            .and_then(|s| s.social_score)
            .map(social_sentiment),
        MetricId::NewsSentiment => input
            .sentiment
            .as_ref()
            .and_then(|s| s.news_score)
            .map(news_sentiment),
        MetricId::FundingRate => input.funding_rate.map(funding_rate),
        MetricId::Mvrv => input.mvrv.map(|v| mvrv(v, thresholds)),
        MetricId::Nvt => input.nvt.map(|v| nvt(v, thresholds)),
        MetricId::CyclePosition => match (input.cycle_low, input.ath) {
            (Some(low), Some(ath)) => Some(cycle_position(price, low, ath)),
            _ => None,
        },
        MetricId::RealizedPriceRatio => input
            .realized_price
            .map(|realized| realized_price_ratio(price, realized)),
    }
}

/// Linear interpolation of `x` from `[x0, x1]` onto `[y0, y1]`
pub(crate) fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 <= x0 {
        return y0;
    }
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// Tail above `start`: rises from `floor` and reaches 1.0 at twice `start`
pub(crate) fn overbought_tail(x: f64, start: f64, floor: f64) -> f64 {
    if start <= 0.0 {
        return 1.0;
    }
    let stretch = ((x - start) / start).clamp(0.0, 1.0);
    floor + stretch * (1.0 - floor)
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
