//! On-chain valuation normalizers: MVRV, NVT, realized price, exchange
//! netflow and active addresses.

use super::{lerp, overbought_tail};
use crate::classifier::CategoryThresholds;
use crate::model::{MetricAnalysis, MetricId};

/// Confidence for values reported by on-chain data providers
const ONCHAIN_CONFIDENCE: f64 = 0.9;

/// MVRV ratio, calibrated by the category's oversold/overbought levels
pub fn mvrv(value: f64, thresholds: &CategoryThresholds) -> MetricAnalysis {
    if !value.is_finite() || value < 0.0 {
        return MetricAnalysis::neutral(MetricId::Mvrv, value, "MVRV unavailable");
    }

    let oversold = thresholds.mvrv_oversold;
    let overbought = thresholds.mvrv_overbought;

    let (score, reason) = if value < oversold {
        (0.0, format!("MVRV {value:.2} below oversold {oversold:.2}: holders at a loss"))
    } else if value < 1.5 {
        (
            lerp(value, oversold, 1.5, 0.0, 0.3),
            format!("MVRV {value:.2} near cost basis"),
        )
    } else if value < 2.5 {
        (
            lerp(value, 1.5, 2.5, 0.3, 0.6),
            format!("MVRV {value:.2} in normal range"),
        )
    } else if value < overbought {
        (
            lerp(value, 2.5, overbought, 0.6, 0.9),
            format!("MVRV {value:.2} elevated, approaching {overbought:.2}"),
        )
    } else {
        (
            overbought_tail(value, overbought, 0.9),
            format!("MVRV {value:.2} above overbought {overbought:.2}: heavy unrealized profit"),
        )
    };

    MetricAnalysis::new(MetricId::Mvrv, value, score, ONCHAIN_CONFIDENCE, reason)
}

/// NVT ratio, with the category's overbought level
pub fn nvt(value: f64, thresholds: &CategoryThresholds) -> MetricAnalysis {
    if !value.is_finite() || value < 0.0 {
        return MetricAnalysis::neutral(MetricId::Nvt, value, "NVT unavailable");
    }

    let overbought = thresholds.nvt_overbought;

    let (score, reason) = if value < 45.0 {
        (
            lerp(value, 0.0, 45.0, 0.0, 0.2),
            format!("NVT {value:.1}: network value well supported by transactions"),
        )
    } else if value < 65.0 {
        (
            lerp(value, 45.0, 65.0, 0.2, 0.5),
            format!("NVT {value:.1} in normal range"),
        )
    } else if value < overbought {
        (
            lerp(value, 65.0, overbought, 0.5, 0.85),
            format!("NVT {value:.1} elevated"),
        )
    } else {
        (
            overbought_tail(value, overbought, 0.85),
            format!("NVT {value:.1} above {overbought:.0}: valuation outrunning usage"),
        )
    };

    MetricAnalysis::new(MetricId::Nvt, value, score, ONCHAIN_CONFIDENCE, reason)
}

/// Price relative to the realized price (aggregate cost basis)
pub fn realized_price_ratio(price: f64, realized_price: f64) -> MetricAnalysis {
    if !(realized_price.is_finite() && realized_price > 0.0 && price.is_finite() && price > 0.0) {
        return MetricAnalysis::neutral(
            MetricId::RealizedPriceRatio,
            0.0,
            "Realized price unavailable",
        );
    }

    let ratio = price / realized_price;
    let (score, reason) = if ratio < 0.8 {
        (0.05, "Trading deep below realized price")
    } else if ratio < 1.0 {
        (0.15, "Trading below realized price")
    } else if ratio < 1.5 {
        (0.35, "Modestly above realized price")
    } else if ratio < 2.5 {
        (0.55, "Comfortably above realized price")
    } else if ratio < 3.5 {
        (0.75, "Far above realized price")
    } else {
        (0.9, "Extreme premium over realized price")
    };

    MetricAnalysis::new(
        MetricId::RealizedPriceRatio,
        ratio,
        score,
        ONCHAIN_CONFIDENCE,
        format!("{reason} ({ratio:.2}x)"),
    )
}

/// Exchange netflow in coins; positive means net inflow (sell pressure)
pub fn exchange_netflow(value: f64) -> MetricAnalysis {
    if !value.is_finite() {
        return MetricAnalysis::neutral(MetricId::ExchangeNetflow, value, "Netflow unavailable");
    }

    let (score, reason) = if value < -10_000.0 {
        (0.1, "Heavy exchange outflows: accumulation")
    } else if value < -5_000.0 {
        (0.25, "Exchange outflows")
    } else if value < 5_000.0 {
        (0.5, "Balanced exchange flows")
    } else if value < 10_000.0 {
        (0.75, "Exchange inflows")
    } else {
        (0.9, "Heavy exchange inflows: distribution")
    };

    MetricAnalysis::new(
        MetricId::ExchangeNetflow,
        value,
        score,
        ONCHAIN_CONFIDENCE,
        format!("{reason} ({value:+.0})"),
    )
}

/// Current active addresses as a percentage of the 30-day average
pub fn active_address_ratio(current: f64, average_30d: f64) -> MetricAnalysis {
    if !(average_30d.is_finite() && average_30d > 0.0 && current.is_finite() && current >= 0.0) {
        return MetricAnalysis::neutral(
            MetricId::ActiveAddressRatio,
            0.0,
            "Active address average unavailable",
        );
    }

    let ratio = current * 100.0 / average_30d;
    let (score, reason) = if ratio < 70.0 {
        (0.2, "Network activity well below average")
    } else if ratio < 90.0 {
        (0.35, "Network activity below average")
    } else if ratio < 110.0 {
        (0.5, "Network activity normal")
    } else if ratio < 130.0 {
        (0.65, "Network activity above average")
    } else {
        (0.8, "Network activity surging")
    };

    MetricAnalysis::new(
        MetricId::ActiveAddressRatio,
        ratio,
        score,
        ONCHAIN_CONFIDENCE,
        format!("{reason} ({ratio:.0}% of 30d avg)"),
    )
}
