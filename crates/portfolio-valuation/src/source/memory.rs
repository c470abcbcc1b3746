//! In-Memory Snapshot Source
//!
//! Holds snapshots in a map. Used by tests and demos, and as a landing spot
//! for data fetched elsewhere.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::SnapshotSource;
use crate::cash::CashIndicators;
use crate::classifier::normalize_symbol;
use crate::error::{Result, ValuationError};
use crate::model::ValuationInput;

#[derive(Debug, Default)]
pub struct MemorySource {
    inputs: RwLock<HashMap<String, ValuationInput>>,
    cash: RwLock<Option<CashIndicators>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_input(self, input: ValuationInput) -> Self {
        self.insert(input);
        self
    }

    pub fn with_cash_indicators(self, indicators: CashIndicators) -> Self {
        self.set_cash_indicators(indicators);
        self
    }

    /// Store or replace the snapshot for `input.symbol`
    pub fn insert(&self, input: ValuationInput) {
        let key = normalize_symbol(&input.symbol);
        if let Ok(mut inputs) = self.inputs.write() {
            inputs.insert(key, input);
        }
    }

    pub fn set_cash_indicators(&self, indicators: CashIndicators) {
        if let Ok(mut cash) = self.cash.write() {
            *cash = Some(indicators);
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.read().map(|inputs| inputs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotSource for MemorySource {
    async fn valuation_input(&self, symbol: &str) -> Result<ValuationInput> {
        let key = normalize_symbol(symbol);
        let inputs = self
            .inputs
            .read()
            .map_err(|_| ValuationError::Source("snapshot store poisoned".to_string()))?;
        inputs
            .get(&key)
            .cloned()
            .ok_or(ValuationError::MissingSnapshot(key))
    }

    async fn cash_indicators(&self) -> Result<CashIndicators> {
        let cash = self
            .cash
            .read()
            .map_err(|_| ValuationError::Source("snapshot store poisoned".to_string()))?;
        cash.clone()
            .ok_or_else(|| ValuationError::MissingSnapshot("cash indicators".to_string()))
    }

    fn name(&self) -> &str {
        "MemorySource"
    }
}
