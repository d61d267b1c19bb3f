use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::LoggedItem;
use crate::impact::units::{item_weight_with, KG_PER_ITEM};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WindowTotals {
    pub total_weight_kg: f64,
    pub item_count: u32,
}

/// Calendar date of `timestamp` in the offset carried by `now`.
///
/// Every day-granular calculation projects through this so day boundaries stay
/// consistent with the caller's clock.
pub fn local_date(timestamp: &DateTime<Utc>, now: &DateTime<FixedOffset>) -> NaiveDate {
    timestamp.with_timezone(now.offset()).date_naive()
}

/// Sum normalized weight and count of items logged within the last
/// `window_days` calendar days (inclusive of the cutoff day).
pub fn aggregate_window(
    items: &[LoggedItem],
    window_days: u32,
    now: DateTime<FixedOffset>,
) -> WindowTotals {
    aggregate_window_with(items, window_days, KG_PER_ITEM, now)
}

/// [`aggregate_window`] with an explicit per-item weight.
pub fn aggregate_window_with(
    items: &[LoggedItem],
    window_days: u32,
    kg_per_item: f64,
    now: DateTime<FixedOffset>,
) -> WindowTotals {
    let cutoff = now
        .date_naive()
        .checked_sub_days(Days::new(u64::from(window_days)));

    items
        .iter()
        .filter(|item| match cutoff {
            Some(cutoff) => local_date(&item.logged_at, &now) >= cutoff,
            None => true,
        })
        .filter_map(|item| item_weight_with(item, kg_per_item))
        .fold(WindowTotals::default(), |mut totals, weight| {
            totals.total_weight_kg += weight;
            totals.item_count += 1;
            totals
        })
}
