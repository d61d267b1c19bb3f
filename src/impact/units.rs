use crate::db::models::{LoggedItem, QuantityUnit};

/// Weight assumed for one discrete item, regardless of material.
pub const KG_PER_ITEM: f64 = 0.05;

/// Convert a logged `(quantity, unit)` pair into kilograms.
///
/// Callers validate quantities at ingestion; this function does not.
pub fn normalize_to_kg(quantity: f64, unit: QuantityUnit) -> f64 {
    normalize_with_item_weight(quantity, unit, KG_PER_ITEM)
}

pub fn normalize_with_item_weight(quantity: f64, unit: QuantityUnit, kg_per_item: f64) -> f64 {
    match unit {
        QuantityUnit::Kg => quantity,
        QuantityUnit::Items => quantity * kg_per_item,
    }
}

/// Normalized weight of a stored item, or `None` when its quantity is unusable
/// (non-finite or not positive). Aggregations skip such items.
pub fn item_weight_kg(item: &LoggedItem) -> Option<f64> {
    item_weight_with(item, KG_PER_ITEM)
}

pub fn item_weight_with(item: &LoggedItem, kg_per_item: f64) -> Option<f64> {
    if !item.quantity.is_finite() || item.quantity <= 0.0 {
        return None;
    }
    Some(normalize_with_item_weight(item.quantity, item.unit, kg_per_item))
}
