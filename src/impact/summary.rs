//! Dashboard views derived from item and collection snapshots.
//!
//! Both are recomputed from the caller's snapshot every time; nothing here is
//! stored or incrementally maintained.

use std::collections::HashSet;

use chrono::{DateTime, Days, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::db::models::{Collection, CollectionStatus, LoggedItem};
use crate::impact::{
    achievements::{compute_achievements_with, Achievement},
    config::ImpactConfig,
    earnings::estimate_flat_earnings,
    estimate::{estimate_impact_with, ImpactEstimate},
    streak::{streak_for_policy, StreakPolicy},
    units::item_weight_with,
    window::{aggregate_window_with, local_date, WindowTotals},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdSummary {
    pub total_weight_kg: f64,
    pub item_count: u32,
    pub pending_item_count: u32,
    pub weekly: WindowTotals,
    pub streak_days: u32,
    pub impact: ImpactEstimate,
    pub estimated_earnings: f64,
    pub achievements: Vec<Achievement>,
}

pub fn household_summary(
    items: &[LoggedItem],
    config: &ImpactConfig,
    policy: StreakPolicy,
    now: DateTime<FixedOffset>,
) -> HouseholdSummary {
    let mut total_weight_kg = 0.0;
    let mut item_count = 0u32;
    let mut pending_item_count = 0u32;

    for item in items {
        let Some(weight) = item_weight_with(item, config.kg_per_item) else {
            continue;
        };
        total_weight_kg += weight;
        item_count += 1;
        if !item.collected {
            pending_item_count += 1;
        }
    }

    HouseholdSummary {
        total_weight_kg,
        item_count,
        pending_item_count,
        weekly: aggregate_window_with(items, config.weekly_window_days, config.kg_per_item, now),
        streak_days: streak_for_policy(items, now, policy),
        impact: estimate_impact_with(total_weight_kg, config),
        estimated_earnings: estimate_flat_earnings(total_weight_kg, config.household_rate_per_kg),
        achievements: compute_achievements_with(items, config, policy, now),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorStats {
    pub total_collections: u32,
    pub scheduled_collections: u32,
    pub total_earnings: f64,
    pub total_weight_kg: f64,
    pub households_served: u32,
    pub weekly_earnings: f64,
}

/// Aggregate a collector's collections. Only completed collections count
/// toward earnings, weight and households.
pub fn collector_stats(
    collections: &[Collection],
    window_days: u32,
    now: DateTime<FixedOffset>,
) -> CollectorStats {
    let cutoff = now
        .date_naive()
        .checked_sub_days(Days::new(u64::from(window_days)));
    let mut households = HashSet::new();
    let mut stats = CollectorStats::default();

    for collection in collections {
        match collection.status {
            CollectionStatus::Scheduled => stats.scheduled_collections += 1,
            CollectionStatus::Cancelled => {}
            CollectionStatus::Completed => {
                let earnings = collection
                    .actual_earnings
                    .unwrap_or(collection.estimated_earnings);

                stats.total_collections += 1;
                stats.total_earnings += earnings;
                stats.total_weight_kg += collection.total_weight_kg;
                households.insert(collection.household_id.as_str());

                let in_window = match (collection.completed_at.as_ref(), cutoff) {
                    (Some(completed_at), Some(cutoff)) => local_date(completed_at, &now) >= cutoff,
                    (Some(_), None) => true,
                    (None, _) => false,
                };
                if in_window {
                    stats.weekly_earnings += earnings;
                }
            }
        }
    }

    stats.households_served = households.len() as u32;
    stats
}
