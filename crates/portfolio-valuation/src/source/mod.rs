//! Snapshot Sources
//!
//! Abstractions over wherever valuation inputs come from. Fetching and
//! caching live behind this trait so the scoring engines stay pure.

mod memory;

pub use memory::MemorySource;

use async_trait::async_trait;

use crate::cash::CashIndicators;
use crate::error::Result;
use crate::model::ValuationInput;

/// Provider of per-asset snapshots and market-wide cash indicators.
///
/// Implement this for each data backend: exchange APIs, on-chain
/// analytics providers, a local cache, etc.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Latest valuation input for a symbol
    async fn valuation_input(&self, symbol: &str) -> Result<ValuationInput>;

    /// Inputs for several symbols, in request order.
    ///
    /// Each failure is logged and returned alongside its symbol.
    async fn valuation_inputs(&self, symbols: &[String]) -> Vec<(String, Result<ValuationInput>)> {
        let mut inputs = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let input = self.valuation_input(symbol).await;
            if let Err(e) = &input {
                tracing::warn!(%symbol, source = self.name(), error = %e, "Snapshot unavailable");
            }
            inputs.push((symbol.clone(), input));
        }
        inputs
    }

    /// Market-wide indicators for the cash allocation engine
    async fn cash_indicators(&self) -> Result<CashIndicators>;

    /// Source name
    fn name(&self) -> &str;
}
