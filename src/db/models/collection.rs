//! Collection (pickup) data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CollectionStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Scheduled => "scheduled",
            CollectionStatus::Completed => "completed",
            CollectionStatus::Cancelled => "cancelled",
        }
    }

    /// Only scheduled collections move, and only into a terminal state.
    pub fn can_transition_to(&self, next: CollectionStatus) -> bool {
        matches!(
            (self, next),
            (CollectionStatus::Scheduled, CollectionStatus::Completed)
                | (CollectionStatus::Scheduled, CollectionStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub collector_id: String,
    pub household_id: String,
    pub status: CollectionStatus,
    pub scheduled_for: DateTime<Utc>,
    pub total_weight_kg: f64,
    pub estimated_earnings: f64,
    pub actual_earnings: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
