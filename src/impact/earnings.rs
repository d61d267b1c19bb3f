use std::collections::HashMap;

use crate::db::models::{LoggedItem, RecyclableType};
use crate::impact::units::item_weight_kg;

/// Normalized kilograms per recyclable type.
pub fn weight_by_type(items: &[LoggedItem]) -> HashMap<RecyclableType, f64> {
    let mut weights = HashMap::new();
    for item in items {
        if let Some(weight) = item_weight_kg(item) {
            *weights.entry(item.recyclable_type).or_insert(0.0) += weight;
        }
    }
    weights
}

/// Sum of `weight * price_per_kg` over each type present.
///
/// Types without a price contribute nothing; missing reference data is not an error.
pub fn estimate_earnings(
    weight_by_type: &HashMap<RecyclableType, f64>,
    prices: &HashMap<RecyclableType, f64>,
) -> f64 {
    // Summing in a fixed type order keeps the result bit-identical between calls.
    RecyclableType::ALL
        .iter()
        .filter_map(|recyclable_type| {
            let weight = weight_by_type.get(recyclable_type)?;
            let price = prices.get(recyclable_type)?;
            if !weight.is_finite() || !price.is_finite() {
                return None;
            }
            Some(weight * price)
        })
        .sum()
}

/// Household-side quick estimate at a single rate per kilogram.
pub fn estimate_flat_earnings(total_weight_kg: f64, rate_per_kg: f64) -> f64 {
    if !total_weight_kg.is_finite() || total_weight_kg <= 0.0 {
        return 0.0;
    }
    total_weight_kg * rate_per_kg
}
