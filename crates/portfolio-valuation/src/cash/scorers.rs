//! Bucketed 0-100 scorers for the cash allocation indicators.
//!
//! Higher scores mean a hotter, riskier market and therefore more cash.

pub fn fear_greed_score(value: f64) -> (f64, &'static str) {
    if value < 20.0 {
        (10.0, "Extreme fear: deploy cash")
    } else if value < 40.0 {
        (30.0, "Fear")
    } else if value < 60.0 {
        (50.0, "Neutral sentiment")
    } else if value < 80.0 {
        (75.0, "Greed")
    } else {
        (95.0, "Extreme greed: raise cash")
    }
}

pub fn mvrv_score(value: f64) -> (f64, &'static str) {
    if value < 1.0 {
        (10.0, "Below realized value")
    } else if value < 2.0 {
        (30.0, "Modest unrealized profit")
    } else if value < 3.0 {
        (50.0, "Healthy unrealized profit")
    } else if value < 4.0 {
        (75.0, "Large unrealized profit")
    } else {
        (95.0, "Cycle-top territory")
    }
}

pub fn kimchi_premium_score(value: f64) -> (f64, &'static str) {
    if value < 0.0 {
        (20.0, "Domestic discount")
    } else if value < 2.0 {
        (35.0, "Premium normal")
    } else if value < 5.0 {
        (55.0, "Premium rising")
    } else if value < 10.0 {
        (75.0, "Premium high")
    } else {
        (95.0, "Premium overheated")
    }
}

pub fn exchange_flow_score(value: f64) -> (f64, &'static str) {
    if value < -10_000.0 {
        (15.0, "Strong outflows")
    } else if value < -5_000.0 {
        (30.0, "Outflows")
    } else if value < 5_000.0 {
        (50.0, "Flows balanced")
    } else if value < 10_000.0 {
        (70.0, "Inflows")
    } else {
        (90.0, "Heavy inflows")
    }
}

/// Trend of the reference price against its 200-day average.
///
/// `None` if either price is non-positive.
pub fn market_trend_score(price: f64, ma200: f64) -> Option<(f64, f64, &'static str)> {
    if !(price > 0.0 && ma200 > 0.0 && price.is_finite() && ma200.is_finite()) {
        return None;
    }
    let deviation = (price - ma200) * 100.0 / ma200;
    let (score, description) = if deviation < -20.0 {
        (15.0, "Deep below 200D MA")
    } else if deviation < 0.0 {
        (35.0, "Below 200D MA")
    } else if deviation < 20.0 {
        (50.0, "Above 200D MA")
    } else if deviation < 50.0 {
        (70.0, "Extended above 200D MA")
    } else {
        (90.0, "Overextended above 200D MA")
    };
    Some((deviation, score, description))
}

/// VIX level
pub fn volatility_score(value: f64) -> (f64, &'static str) {
    if value < 15.0 {
        (20.0, "Calm markets")
    } else if value < 20.0 {
        (35.0, "Normal volatility")
    } else if value < 25.0 {
        (50.0, "Elevated volatility")
    } else if value < 35.0 {
        (70.0, "High volatility")
    } else {
        (90.0, "Market stress")
    }
}

pub fn nvt_score(value: f64) -> (f64, &'static str) {
    if value < 45.0 {
        (20.0, "Usage supports valuation")
    } else if value < 65.0 {
        (40.0, "NVT normal")
    } else if value < 90.0 {
        (65.0, "NVT elevated")
    } else {
        (85.0, "Valuation outrunning usage")
    }
}
