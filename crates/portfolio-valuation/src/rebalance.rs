//! Rebalance Drift Check
//!
//! Compares a position's current allocation against its target using the
//! category tolerance band. Advisory only; nothing here places orders.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::classifier::{classify, normalize_symbol, AssetCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RebalanceAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for RebalanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        })
    }
}

/// Outcome of one drift check. All percentages are allocation percent points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceCheck {
    pub symbol: String,
    pub category: AssetCategory,
    pub current_pct: Decimal,
    pub target_pct: Decimal,
    /// `current - target`; positive means overweight
    pub drift: Decimal,
    pub tolerance: Decimal,
    pub action: RebalanceAction,
}

impl RebalanceCheck {
    /// Drift inside `[-tolerance, +tolerance]` holds.
    pub fn evaluate(symbol: &str, current_pct: Decimal, target_pct: Decimal) -> Self {
        let symbol = normalize_symbol(symbol);
        let category = classify(&symbol);
        let tolerance = category.rebalance_tolerance();
        let drift = current_pct - target_pct;

        let action = if drift > tolerance {
            RebalanceAction::Sell
        } else if drift < -tolerance {
            RebalanceAction::Buy
        } else {
            RebalanceAction::Hold
        };

        Self {
            symbol,
            category,
            current_pct,
            target_pct,
            drift,
            tolerance,
            action,
        }
    }

    pub fn needs_rebalance(&self) -> bool {
        self.action != RebalanceAction::Hold
    }

    /// Percent points to trade to get back on target
    pub fn adjustment(&self) -> Decimal {
        match self.action {
            RebalanceAction::Hold => Decimal::ZERO,
            _ => self.drift.abs(),
        }
    }

    pub fn rationale(&self) -> String {
        format!(
            "{} {}: {:.1}% vs target {:.1}% (drift {:+.1}, band ±{:.1})",
            self.action, self.symbol, self.current_pct, self.target_pct, self.drift, self.tolerance
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overweight_core_sells() {
        let check = RebalanceCheck::evaluate("BTC", dec!(44), dec!(40));
        assert_eq!(check.action, RebalanceAction::Sell);
        assert_eq!(check.drift, dec!(4));
        assert_eq!(check.tolerance, dec!(3.0));
        assert_eq!(check.adjustment(), dec!(4));
        assert!(check.needs_rebalance());
    }

    #[test]
    fn test_underweight_speculative_buys() {
        let check = RebalanceCheck::evaluate("KRW-DOGE", dec!(3), dec!(5));
        assert_eq!(check.symbol, "DOGE");
        assert_eq!(check.category, AssetCategory::Speculative);
        assert_eq!(check.action, RebalanceAction::Buy);
        assert_eq!(check.drift, dec!(-2));
    }

    #[test]
    fn test_band_edge_holds() {
        let check = RebalanceCheck::evaluate("ETH", dec!(22.5), dec!(20));
        assert_eq!(check.action, RebalanceAction::Hold);
        assert_eq!(check.adjustment(), Decimal::ZERO);

        let check = RebalanceCheck::evaluate("ETH", dec!(17.5), dec!(20));
        assert_eq!(check.action, RebalanceAction::Hold);

        let check = RebalanceCheck::evaluate("ETH", dec!(22.51), dec!(20));
        assert_eq!(check.action, RebalanceAction::Sell);
    }

    #[test]
    fn test_rationale_mentions_action() {
        let check = RebalanceCheck::evaluate("SOL", dec!(15), dec!(10));
        assert!(check.rationale().starts_with("SELL SOL"));
    }
}
