//! Logged recyclable data models.
//!
//! A `LoggedItem` is owned by the household that created it until a collector
//! completes a collection containing it. After that its quantity, type and unit
//! are frozen.

use std::fmt;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RecyclableType {
    Plastic,
    Paper,
    Glass,
    Metal,
    Cardboard,
}

impl RecyclableType {
    pub const ALL: [RecyclableType; 5] = [
        RecyclableType::Plastic,
        RecyclableType::Paper,
        RecyclableType::Glass,
        RecyclableType::Metal,
        RecyclableType::Cardboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecyclableType::Plastic => "plastic",
            RecyclableType::Paper => "paper",
            RecyclableType::Glass => "glass",
            RecyclableType::Metal => "metal",
            RecyclableType::Cardboard => "cardboard",
        }
    }
}

impl fmt::Display for RecyclableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    Kg,
    Items,
}

impl QuantityUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityUnit::Kg => "kg",
            QuantityUnit::Items => "items",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoggedItem {
    pub id: String,
    pub household_id: String,
    #[serde(rename = "type")]
    pub recyclable_type: RecyclableType,
    pub quantity: f64,
    pub unit: QuantityUnit,
    pub logged_at: DateTime<Utc>,
    pub collected: bool,
    pub collector_id: Option<String>,
    /// Set while the item is reserved by a scheduled or completed collection.
    pub collection_id: Option<String>,
}

/// Input for logging a new item or replacing the editable fields of one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedItemInput {
    #[serde(rename = "type")]
    pub recyclable_type: RecyclableType,
    pub quantity: f64,
    pub unit: QuantityUnit,
}

impl LoggedItemInput {
    pub fn new(recyclable_type: RecyclableType, quantity: f64, unit: QuantityUnit) -> Self {
        Self {
            recyclable_type,
            quantity,
            unit,
        }
    }

    /// Rejects quantities the calculators cannot meaningfully weigh.
    pub fn validate(&self) -> Result<()> {
        if !self.quantity.is_finite() {
            bail!("quantity must be a finite number");
        }
        if self.quantity <= 0.0 {
            bail!("quantity must be greater than zero");
        }
        Ok(())
    }
}
