use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::models::LoggedItem;
use crate::impact::window::local_date;

/// Which streak a dashboard reports.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StreakPolicy {
    /// Longest consecutive run ending at the most recent log, however old.
    #[default]
    Observed,
    /// Same run, but zero once the most recent log is older than yesterday.
    ResetWhenStale,
}

/// Distinct local calendar dates, most recent first.
fn distinct_days_desc(items: &[LoggedItem], now: &DateTime<FixedOffset>) -> Vec<NaiveDate> {
    let days: BTreeSet<NaiveDate> = items
        .iter()
        .map(|item| local_date(&item.logged_at, now))
        .collect();
    days.into_iter().rev().collect()
}

fn run_length(days: &[NaiveDate]) -> u32 {
    if days.is_empty() {
        return 0;
    }

    let mut streak = 1u32;
    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Count consecutive calendar days with at least one log, walking back from
/// the most recent logged day.
///
/// The run is not required to reach today; see [`compute_current_streak`].
pub fn compute_streak(items: &[LoggedItem], now: DateTime<FixedOffset>) -> u32 {
    run_length(&distinct_days_desc(items, &now))
}

/// Like [`compute_streak`], but a run whose latest day is before yesterday
/// counts as broken.
pub fn compute_current_streak(items: &[LoggedItem], now: DateTime<FixedOffset>) -> u32 {
    let days = distinct_days_desc(items, &now);
    let Some(latest) = days.first() else {
        return 0;
    };

    let today = now.date_naive();
    let stale = match today.pred_opt() {
        Some(yesterday) => *latest < yesterday,
        None => false,
    };
    if stale {
        return 0;
    }

    run_length(&days)
}

pub fn streak_for_policy(
    items: &[LoggedItem],
    now: DateTime<FixedOffset>,
    policy: StreakPolicy,
) -> u32 {
    match policy {
        StreakPolicy::Observed => compute_streak(items, now),
        StreakPolicy::ResetWhenStale => compute_current_streak(items, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{QuantityUnit, RecyclableType};
    use crate::impact::test_support::{arb_items, fixed_now, item_days_ago};
    use proptest::prelude::*;

    fn logs_on(now: &DateTime<FixedOffset>, days_ago: &[i64]) -> Vec<LoggedItem> {
        days_ago
            .iter()
            .map(|d| item_days_ago(now, *d, RecyclableType::Plastic, 1.0, QuantityUnit::Kg))
            .collect()
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(compute_streak(&[], fixed_now()), 0);
        assert_eq!(compute_current_streak(&[], fixed_now()), 0);
    }

    #[test]
    fn three_consecutive_days() {
        let now = fixed_now();
        assert_eq!(compute_streak(&logs_on(&now, &[0, 1, 2]), now), 3);
    }

    #[test]
    fn gap_stops_the_run() {
        let now = fixed_now();
        assert_eq!(compute_streak(&logs_on(&now, &[0, 3]), now), 1);
    }

    #[test]
    fn duplicate_days_count_once() {
        let now = fixed_now();
        assert_eq!(compute_streak(&logs_on(&now, &[0, 0, 1, 1, 1]), now), 2);
    }

    #[test]
    fn input_order_is_irrelevant() {
        let now = fixed_now();
        assert_eq!(compute_streak(&logs_on(&now, &[2, 0, 1, 5]), now), 3);
    }

    #[test]
    fn stale_run_still_counts_under_observed_rule() {
        let now = fixed_now();
        let items = logs_on(&now, &[60, 61, 62, 63]);
        assert_eq!(compute_streak(&items, now), 4);
    }

    #[test]
    fn stale_run_resets_under_current_rule() {
        let now = fixed_now();
        let items = logs_on(&now, &[60, 61, 62, 63]);
        assert_eq!(compute_current_streak(&items, now), 0);
        assert_eq!(streak_for_policy(&items, now, StreakPolicy::ResetWhenStale), 0);
        assert_eq!(streak_for_policy(&items, now, StreakPolicy::Observed), 4);
    }

    proptest! {
        #[test]
        fn repeated_calls_agree(items in arb_items()) {
            let now = fixed_now();
            prop_assert_eq!(compute_streak(&items, now), compute_streak(&items, now));
            prop_assert_eq!(
                compute_current_streak(&items, now),
                compute_current_streak(&items, now)
            );
        }

        #[test]
        fn reordering_logs_keeps_the_streak(mut items in arb_items()) {
            let now = fixed_now();
            let forward = compute_streak(&items, now);
            items.reverse();
            prop_assert_eq!(compute_streak(&items, now), forward);
            prop_assert!(compute_current_streak(&items, now) <= forward);
        }
    }

    #[test]
    fn run_ending_yesterday_is_still_current() {
        let now = fixed_now();
        let items = logs_on(&now, &[1, 2]);
        assert_eq!(compute_current_streak(&items, now), 2);
    }
}
