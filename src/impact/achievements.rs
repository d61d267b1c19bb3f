use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::db::models::{LoggedItem, RecyclableType};
use crate::impact::config::ImpactConfig;
use crate::impact::streak::{streak_for_policy, StreakPolicy};
use crate::impact::units::item_weight_with;

const STREAK_TARGET_DAYS: u32 = 7;
const BRONZE_TARGET_KG: f64 = 10.0;
const GOLD_TARGET_KG: f64 = 50.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKind {
    FirstLog,
    WeekStreak,
    TenKilograms,
    FiftyKilograms,
    EveryMaterial,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub kind: AchievementKind,
    pub unlocked: bool,
    /// Fraction of the target reached, clamped to [0, 1].
    pub progress: f64,
}

impl Achievement {
    fn from_ratio(kind: AchievementKind, current: f64, target: f64) -> Self {
        let progress = if target > 0.0 {
            (current / target).clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            kind,
            unlocked: progress >= 1.0,
            progress,
        }
    }
}

/// Badges under the default coefficients and the observed streak rule.
pub fn compute_achievements(items: &[LoggedItem], now: DateTime<FixedOffset>) -> Vec<Achievement> {
    compute_achievements_with(items, &ImpactConfig::default(), StreakPolicy::Observed, now)
}

/// Badges using the same item weight and streak rule as the dashboard they sit on.
pub fn compute_achievements_with(
    items: &[LoggedItem],
    config: &ImpactConfig,
    policy: StreakPolicy,
    now: DateTime<FixedOffset>,
) -> Vec<Achievement> {
    let total_kg: f64 = items
        .iter()
        .filter_map(|item| item_weight_with(item, config.kg_per_item))
        .sum();
    let streak = streak_for_policy(items, now, policy);
    let materials: HashSet<RecyclableType> =
        items.iter().map(|item| item.recyclable_type).collect();

    vec![
        Achievement::from_ratio(AchievementKind::FirstLog, items.len() as f64, 1.0),
        Achievement::from_ratio(
            AchievementKind::WeekStreak,
            f64::from(streak),
            f64::from(STREAK_TARGET_DAYS),
        ),
        Achievement::from_ratio(AchievementKind::TenKilograms, total_kg, BRONZE_TARGET_KG),
        Achievement::from_ratio(AchievementKind::FiftyKilograms, total_kg, GOLD_TARGET_KG),
        Achievement::from_ratio(
            AchievementKind::EveryMaterial,
            materials.len() as f64,
            RecyclableType::ALL.len() as f64,
        ),
    ]
}
