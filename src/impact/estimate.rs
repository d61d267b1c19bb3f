use serde::{Deserialize, Serialize};

use crate::impact::config::ImpactConfig;

/// Environmental savings derived from a recycled weight.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactEstimate {
    pub co2_saved_kg: f64,
    pub water_saved_l: f64,
    pub trees_equivalent: f64,
    pub energy_saved_kwh: f64,
}

pub fn estimate_impact(total_kg: f64) -> ImpactEstimate {
    estimate_impact_with(total_kg, &ImpactConfig::default())
}

/// Linear estimate; the coefficients do not vary by material.
pub fn estimate_impact_with(total_kg: f64, config: &ImpactConfig) -> ImpactEstimate {
    let co2_saved_kg = total_kg * config.co2_kg_per_kg;
    ImpactEstimate {
        co2_saved_kg,
        water_saved_l: total_kg * config.water_l_per_kg,
        trees_equivalent: co2_saved_kg / config.co2_kg_per_tree,
        energy_saved_kwh: total_kg * config.energy_kwh_per_kg,
    }
}
