//! Recycling impact and earnings calculators.
//!
//! Everything here is a pure function over an in-memory snapshot plus an
//! injected `now`. Calendar days are taken in the UTC offset carried by `now`.

pub mod achievements;
pub mod config;
pub mod earnings;
pub mod estimate;
pub mod streak;
pub mod summary;
pub mod units;
pub mod window;

pub use achievements::{
    compute_achievements, compute_achievements_with, Achievement, AchievementKind,
};
pub use config::ImpactConfig;
pub use earnings::{estimate_earnings, estimate_flat_earnings, weight_by_type};
pub use estimate::{estimate_impact, estimate_impact_with, ImpactEstimate};
pub use streak::{compute_current_streak, compute_streak, streak_for_policy, StreakPolicy};
pub use summary::{collector_stats, household_summary, CollectorStats, HouseholdSummary};
pub use units::{normalize_to_kg, KG_PER_ITEM};
pub use window::{aggregate_window, aggregate_window_with, WindowTotals};
