use crate::impact::units::KG_PER_ITEM;

/// Coefficients shared by the impact and earnings calculators.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactConfig {
    /// Approximate weight of one discrete item, applied to every recyclable type.
    pub kg_per_item: f64,

    /// Linear impact coefficients per normalized kilogram
    pub co2_kg_per_kg: f64,
    pub water_l_per_kg: f64,
    pub energy_kwh_per_kg: f64,

    /// CO2 a single tree absorbs, used to express savings as trees.
    pub co2_kg_per_tree: f64,

    /// Flat household-side estimate, independent of the collector price table.
    pub household_rate_per_kg: f64,

    /// Rolling window for the "this week" totals.
    pub weekly_window_days: u32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            kg_per_item: KG_PER_ITEM,
            co2_kg_per_kg: 2.5,
            water_l_per_kg: 17.0,
            energy_kwh_per_kg: 4.2,
            co2_kg_per_tree: 21.0,
            household_rate_per_kg: 8.0,
            weekly_window_days: 7,
        }
    }
}
