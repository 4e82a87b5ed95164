//! Durable budget ledger.

use std::sync::Arc;

use nexus_core::constants::BUDGET_STORAGE_KEY;
use nexus_core::{BudgetItem, NexusResult, StorageError, ValidationError};

use crate::kv::KeyValueStore;

/// Ledger shown when nothing has been saved yet.
pub fn default_budget() -> Vec<BudgetItem> {
    vec![
        BudgetItem::new("1", "Uniforms", 1200.0, "Uniform"),
        BudgetItem::new("2", "Stationery", 600.0, "Other"),
        BudgetItem::new("3", "Fees", 5000.0, "Fees"),
    ]
}

pub fn total_actual(items: &[BudgetItem]) -> f64 {
    items.iter().map(|i| i.actual).sum()
}

pub fn total_estimated(items: &[BudgetItem]) -> f64 {
    items.iter().map(|i| i.estimated).sum()
}

/// Budget items persisted as one JSON array under a fixed key.
#[derive(Debug, Clone)]
pub struct BudgetStore {
    store: Arc<dyn KeyValueStore>,
}

impl BudgetStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Saved ledger, or the defaults when absent or undecodable.
    pub fn load(&self) -> Vec<BudgetItem> {
        let raw = match self.store.get(BUDGET_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default_budget(),
            Err(e) => {
                tracing::warn!(error = %e, "Budget read failed, using defaults");
                return default_budget();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored budget undecodable, using defaults");
            default_budget()
        })
    }

    pub fn save(&self, items: &[BudgetItem]) -> NexusResult<()> {
        let raw = serde_json::to_string(items).map_err(|e| StorageError::Serialization {
            key: BUDGET_STORAGE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(BUDGET_STORAGE_KEY, &raw)
    }

    /// Record spend against item `id` and persist the ledger.
    pub fn set_actual(&self, id: &str, amount: f64) -> NexusResult<Vec<BudgetItem>> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "actual".to_string(),
                reason: format!("amount must be a non-negative number, got {}", amount),
            }
            .into());
        }

        let mut items = self.load();
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "id".to_string(),
                reason: format!("no budget item '{}'", id),
            })?;
        item.actual = amount;

        self.save(&items)?;
        Ok(items)
    }
}
