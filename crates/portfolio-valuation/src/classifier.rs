//! Asset Classifier
//!
//! Maps symbols to an [`AssetCategory`] and the category-specific thresholds
//! the normalizers and the cross-asset estimator depend on.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Quote currencies stripped from market pairs like `KRW-BTC` or `BTC/USDT`
const QUOTE_CURRENCIES: &[&str] = &["KRW", "USDT", "USDC", "BUSD", "USD"];

/// Suffixes stripped from concatenated pairs like `BTCUSDT`
const PAIR_SUFFIXES: &[&str] = &["USDT", "USDC", "BUSD"];

/// Valuation category of an asset.
///
/// Ordered from the reference asset to the most volatile tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// The reference asset itself (BTC)
    Core,
    /// Second-largest network, tracks the reference closely
    Major,
    /// Established large caps
    Growth,
    /// Everything else, including unknown symbols
    Speculative,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 4] = [
        AssetCategory::Core,
        AssetCategory::Major,
        AssetCategory::Growth,
        AssetCategory::Speculative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Major => "major",
            Self::Growth => "growth",
            Self::Speculative => "speculative",
        }
    }

    /// Allowed drift (in allocation percentage points) before rebalancing
    pub fn rebalance_tolerance(&self) -> Decimal {
        match self {
            Self::Core => dec!(3.0),
            Self::Major => dec!(2.5),
            Self::Growth => dec!(2.0),
            Self::Speculative => dec!(1.5),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category-specific calibration for the normalizers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    /// MVRV above this is in the overbought tail
    pub mvrv_overbought: f64,

    /// MVRV below this scores zero
    pub mvrv_oversold: f64,

    /// NVT above this is in the overbought tail
    pub nvt_overbought: f64,

    /// Percent deviation from a moving average treated as the stretch limit
    pub ma_deviation_max: f64,

    /// How strongly on-chain metrics swing relative to the reference asset
    pub beta_to_reference: f64,
}

impl CategoryThresholds {
    /// Built-in calibration for a category
    pub fn for_category(category: AssetCategory) -> Self {
        match category {
            AssetCategory::Core => Self {
                mvrv_overbought: 3.5,
                mvrv_oversold: 1.0,
                nvt_overbought: 95.0,
                ma_deviation_max: 80.0,
                beta_to_reference: 1.0,
            },
            AssetCategory::Major => Self {
                mvrv_overbought: 3.2,
                mvrv_oversold: 0.9,
                nvt_overbought: 90.0,
                ma_deviation_max: 100.0,
                beta_to_reference: 1.2,
            },
            AssetCategory::Growth => Self {
                mvrv_overbought: 3.0,
                mvrv_oversold: 0.8,
                nvt_overbought: 85.0,
                ma_deviation_max: 130.0,
                beta_to_reference: 1.5,
            },
            AssetCategory::Speculative => Self {
                mvrv_overbought: 2.8,
                mvrv_oversold: 0.7,
                nvt_overbought: 80.0,
                ma_deviation_max: 180.0,
                beta_to_reference: 2.0,
            },
        }
    }

    /// Check that the piecewise breakpoints stay ordered
    pub fn check(&self) -> std::result::Result<(), String> {
        if !(self.mvrv_oversold > 0.0 && self.mvrv_oversold < 1.5) {
            return Err(format!("mvrv_oversold {} must be in (0, 1.5)", self.mvrv_oversold));
        }
        if self.mvrv_overbought <= 2.5 {
            return Err(format!("mvrv_overbought {} must exceed 2.5", self.mvrv_overbought));
        }
        if self.nvt_overbought <= 65.0 {
            return Err(format!("nvt_overbought {} must exceed 65", self.nvt_overbought));
        }
        if self.ma_deviation_max <= 30.0 {
            return Err(format!("ma_deviation_max {} must exceed 30", self.ma_deviation_max));
        }
        if !(self.beta_to_reference.is_finite() && self.beta_to_reference >= 0.0) {
            return Err(format!("beta_to_reference {} must be >= 0", self.beta_to_reference));
        }
        Ok(())
    }
}

/// Strip exchange decorations and upper-case a symbol
pub fn normalize_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();

    if let Some((left, right)) = upper.split_once(['-', '/']) {
        if QUOTE_CURRENCIES.contains(&left) && !right.is_empty() {
            return right.to_string();
        }
        if QUOTE_CURRENCIES.contains(&right) && !left.is_empty() {
            return left.to_string();
        }
        return upper;
    }

    for suffix in PAIR_SUFFIXES {
        if let Some(base) = upper.strip_suffix(suffix) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }

    upper
}

/// Category of a symbol. Total: unknown symbols are speculative.
pub fn classify(symbol: &str) -> AssetCategory {
    match normalize_symbol(symbol).as_str() {
        "BTC" => AssetCategory::Core,
        "ETH" => AssetCategory::Major,
        "SOL" | "XRP" | "BNB" | "ADA" | "AVAX" | "DOT" | "LINK" | "TRX" | "LTC" | "BCH"
        | "ATOM" | "MATIC" | "POL" | "NEAR" | "TON" | "SUI" | "APT" => AssetCategory::Growth,
        _ => AssetCategory::Speculative,
    }
}

/// Built-in thresholds for a category
pub fn thresholds_for(category: AssetCategory) -> CategoryThresholds {
    CategoryThresholds::for_category(category)
}

/// Rebalance tolerance (percentage points) for a symbol's category
pub fn rebalance_tolerance(symbol: &str) -> Decimal {
    classify(symbol).rebalance_tolerance()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_symbols() {
        assert_eq!(classify("BTC"), AssetCategory::Core);
        assert_eq!(classify("eth"), AssetCategory::Major);
        assert_eq!(classify("SOL"), AssetCategory::Growth);
        assert_eq!(classify("DOGE"), AssetCategory::Speculative);
    }

    #[test]
    fn test_classify_is_total() {
        for symbol in ["", "   ", "NOTREAL", "KRW-", "-", "/USDT", "🚀"] {
            assert_eq!(classify(symbol), AssetCategory::Speculative, "{symbol:?}");
        }
    }

    #[test]
    fn test_normalize_market_pairs() {
        assert_eq!(normalize_symbol("KRW-BTC"), "BTC");
        assert_eq!(normalize_symbol("eth-krw"), "ETH");
        assert_eq!(normalize_symbol("SOL/USDT"), "SOL");
        assert_eq!(normalize_symbol("xrpusdt"), "XRP");
        assert_eq!(normalize_symbol("USDT"), "USDT");
        assert_eq!(classify("KRW-BTC"), AssetCategory::Core);
    }

    #[test]
    fn test_rebalance_tolerance() {
        assert_eq!(rebalance_tolerance("BTC"), dec!(3.0));
        assert_eq!(rebalance_tolerance("ETH"), dec!(2.5));
        assert_eq!(rebalance_tolerance("ADA"), dec!(2.0));
        assert_eq!(rebalance_tolerance("PEPE"), dec!(1.5));
    }

    #[test]
    fn test_builtin_thresholds_are_ordered() {
        for category in AssetCategory::ALL {
            assert!(thresholds_for(category).check().is_ok(), "{category}");
        }
        assert_eq!(thresholds_for(AssetCategory::Speculative).beta_to_reference, 2.0);
        assert_eq!(thresholds_for(AssetCategory::Core).beta_to_reference, 1.0);
    }

    #[test]
    fn test_threshold_check_rejects_inverted_mvrv() {
        let mut thresholds = thresholds_for(AssetCategory::Core);
        thresholds.mvrv_overbought = 2.0;
        assert!(thresholds.check().is_err());
    }
}
