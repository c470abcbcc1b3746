//! Cross-Asset Estimator
//!
//! Approximates on-chain metrics for assets without direct data by pushing
//! the reference asset's readings through the target category's beta.

use tracing::debug;

use crate::classifier::{classify, normalize_symbol};
use crate::config::{CategoryTable, EngineConfig, EstimatorConfig};
use crate::model::ValuationInput;

/// Move `value` away from the midpoint of `[min, max]` by `beta` times its
/// deviation, then clamp into the range.
pub fn adjust_by_beta(value: f64, beta: f64, min: f64, max: f64) -> f64 {
    let mid = (min + max) / 2.0;
    (mid + (value - mid) * beta).clamp(min, max)
}

#[derive(Clone, Debug, Default)]
pub struct CrossAssetEstimator {
    config: EstimatorConfig,
    categories: CategoryTable,
}

impl CrossAssetEstimator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.estimator,
            categories: config.categories,
        }
    }

    /// Build an estimated snapshot for `symbol` from the reference asset.
    ///
    /// Fear/greed and kimchi premium are market-wide and pass through. When
    /// the reference carries no on-chain metrics, only price and fear/greed
    /// survive.
    pub fn estimate(
        &self,
        symbol: &str,
        reference: Option<&ValuationInput>,
        price: f64,
        ma200: Option<f64>,
    ) -> ValuationInput {
        let symbol = normalize_symbol(symbol);
        let category = classify(&symbol);
        let beta = self.categories.get(category).beta_to_reference;

        let Some(reference) = reference.filter(|r| r.has_onchain_data()) else {
            debug!(%symbol, "no reference on-chain data, minimal estimate");
            return ValuationInput {
                fear_greed: reference.and_then(|r| r.fear_greed),
                is_estimated: true,
                ..ValuationInput::new(symbol, price)
            };
        };

        let EstimatorConfig {
            mvrv_min,
            mvrv_max,
            nvt_beta_damping,
        } = self.config;

        let estimate = ValuationInput {
            mvrv: reference
                .mvrv
                .map(|mvrv| adjust_by_beta(mvrv, beta, mvrv_min, mvrv_max)),
            nvt: reference
                .nvt
                .map(|nvt| nvt * (1.0 + (beta - 1.0) * nvt_beta_damping)),
            exchange_netflow: reference.exchange_netflow.map(|flow| flow * beta),
            ma200,
            fear_greed: reference.fear_greed,
            kimchi_premium: reference.kimchi_premium,
            is_estimated: true,
            ..ValuationInput::new(symbol, price)
        };

        debug!(
            symbol = %estimate.symbol,
            %category,
            beta,
            reference = %reference.symbol,
            "estimated from reference"
        );

        estimate
    }

    /// Complete a direct snapshot that lacks on-chain data.
    ///
    /// Only absent fields are filled: MVRV, NVT and netflow from the
    /// estimate, plus fear/greed and kimchi premium when the snapshot has
    /// none. Everything the asset reported itself is kept.
    pub fn fill_missing(&self, input: ValuationInput, reference: Option<&ValuationInput>) -> ValuationInput {
        let estimate = self.estimate(&input.symbol, reference, input.current_price, input.ma200);
        ValuationInput {
            mvrv: input.mvrv.or(estimate.mvrv),
            nvt: input.nvt.or(estimate.nvt),
            exchange_netflow: input.exchange_netflow.or(estimate.exchange_netflow),
            fear_greed: input.fear_greed.or(estimate.fear_greed),
            kimchi_premium: input.kimchi_premium.or(estimate.kimchi_premium),
            is_estimated: true,
            ..input
        }
    }
}
