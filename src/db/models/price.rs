//! Static price reference data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::RecyclableType;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecyclablePrice {
    #[serde(rename = "type")]
    pub recyclable_type: RecyclableType,
    pub price_per_kg: f64,
    pub label: String,
}

/// Price-per-kg lookup, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<RecyclableType, f64>,
    labels: HashMap<RecyclableType, String>,
}

impl PriceTable {
    pub fn from_prices(rows: Vec<RecyclablePrice>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.prices.insert(row.recyclable_type, row.price_per_kg);
            table.labels.insert(row.recyclable_type, row.label);
        }
        table
    }

    pub fn price_per_kg(&self, recyclable_type: RecyclableType) -> Option<f64> {
        self.prices.get(&recyclable_type).copied()
    }

    pub fn label(&self, recyclable_type: RecyclableType) -> Option<&str> {
        self.labels.get(&recyclable_type).map(String::as_str)
    }

    pub fn as_map(&self) -> &HashMap<RecyclableType, f64> {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
