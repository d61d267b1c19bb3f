use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::logged_items::{items_by_ids, items_for_collection};
use crate::db::{
    connection::Database,
    helpers::{parse_collection_status, parse_datetime, parse_optional_datetime, to_bool},
    models::{Collection, CollectionStatus, LoggedItem, RecyclableType},
};
use crate::impact::{estimate_earnings, weight_by_type};

const COLLECTION_COLUMNS: &str = "id, collector_id, household_id, status, scheduled_for, total_weight_kg, estimated_earnings, actual_earnings, created_at, updated_at, completed_at";

/// Request to schedule a pickup of specific items from one household.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub collector_id: String,
    pub household_id: String,
    pub item_ids: Vec<String>,
    pub scheduled_for: DateTime<Utc>,
}

fn row_to_collection(row: &Row) -> Result<Collection> {
    let status: String = row.get("status")?;
    let scheduled_for: String = row.get("scheduled_for")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    let completed_at: Option<String> = row.get("completed_at")?;

    Ok(Collection {
        id: row.get("id")?,
        collector_id: row.get("collector_id")?,
        household_id: row.get("household_id")?,
        status: parse_collection_status(&status)?,
        scheduled_for: parse_datetime(&scheduled_for, "scheduled_for")?,
        total_weight_kg: row.get("total_weight_kg")?,
        estimated_earnings: row.get("estimated_earnings")?,
        actual_earnings: row.get("actual_earnings")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
        completed_at: parse_optional_datetime(completed_at, "completed_at")?,
    })
}

fn fetch_collection(conn: &Connection, collection_id: &str) -> Result<Option<Collection>> {
    let sql = format!("SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![collection_id])?;
    let collection = match rows.next()? {
        Some(row) => Some(row_to_collection(row)?),
        None => None,
    };
    Ok(collection)
}

fn list_collections(conn: &Connection, column: &str, owner_id: &str) -> Result<Vec<Collection>> {
    let sql = format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections
         WHERE {column} = ?1
         ORDER BY scheduled_for DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![owner_id])?;
    let mut collections = Vec::new();
    while let Some(row) = rows.next()? {
        collections.push(row_to_collection(row)?);
    }
    Ok(collections)
}

fn require_transition(conn: &Connection, collection_id: &str, next: CollectionStatus) -> Result<()> {
    let current = fetch_collection(conn, collection_id)?
        .ok_or_else(|| anyhow!("Collection not found"))?
        .status;

    if !current.can_transition_to(next) {
        bail!(
            "Collection is {} and cannot become {}",
            current.as_str(),
            next.as_str()
        );
    }
    Ok(())
}

/// Total normalized weight and priced value of a set of items.
fn weigh(items: &[LoggedItem], prices: &HashMap<RecyclableType, f64>) -> (f64, f64) {
    let weights = weight_by_type(items);
    let total_weight_kg: f64 = RecyclableType::ALL
        .iter()
        .filter_map(|recyclable_type| weights.get(recyclable_type))
        .sum();
    (total_weight_kg, estimate_earnings(&weights, prices))
}

impl Database {
    /// Schedule a collection and reserve its items.
    ///
    /// Every requested item must belong to the household and be neither
    /// collected nor reserved already.
    pub async fn insert_collection(
        &self,
        request: NewCollection,
        prices: HashMap<RecyclableType, f64>,
        now: DateTime<Utc>,
    ) -> Result<Collection> {
        self.execute(move |conn| {
            let is_collector: Option<i64> = conn
                .query_row(
                    "SELECT is_collector FROM profiles WHERE id = ?1",
                    params![request.collector_id],
                    |row| row.get(0),
                )
                .optional()?;
            match is_collector {
                Some(flag) if to_bool(flag) => {}
                Some(_) => bail!("Profile {} is not a collector", request.collector_id),
                None => bail!("Collector not found"),
            }

            let mut item_ids = request.item_ids.clone();
            item_ids.sort();
            item_ids.dedup();

            let items = items_by_ids(conn, &item_ids)?;
            if items.len() != item_ids.len() {
                bail!("Some requested items do not exist");
            }
            if let Some(item) = items.iter().find(|item| item.household_id != request.household_id) {
                bail!("Item {} belongs to another household", item.id);
            }
            if let Some(item) = items
                .iter()
                .find(|item| item.collected || item.collection_id.is_some())
            {
                bail!("Item {} is already collected or scheduled", item.id);
            }

            let (total_weight_kg, estimated_earnings) = weigh(&items, &prices);
            let collection = Collection {
                id: Uuid::new_v4().to_string(),
                collector_id: request.collector_id,
                household_id: request.household_id,
                status: CollectionStatus::Scheduled,
                scheduled_for: request.scheduled_for,
                total_weight_kg,
                estimated_earnings,
                actual_earnings: None,
                created_at: now,
                updated_at: now,
                completed_at: None,
            };

            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO collections (id, collector_id, household_id, status, scheduled_for, total_weight_kg, estimated_earnings, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    collection.id,
                    collection.collector_id,
                    collection.household_id,
                    collection.status.as_str(),
                    collection.scheduled_for.to_rfc3339(),
                    collection.total_weight_kg,
                    collection.estimated_earnings,
                    collection.created_at.to_rfc3339(),
                    collection.updated_at.to_rfc3339(),
                ],
            )
            .context("failed to insert collection")?;

            for item_id in &item_ids {
                tx.execute(
                    "UPDATE logged_items SET collection_id = ?1 WHERE id = ?2",
                    params![collection.id, item_id],
                )?;
            }
            tx.commit()?;

            Ok(collection)
        })
        .await
    }

    pub async fn get_collection(&self, collection_id: &str) -> Result<Option<Collection>> {
        let collection_id = collection_id.to_string();
        self.execute(move |conn| fetch_collection(conn, &collection_id))
            .await
    }

    pub async fn list_collections_for_collector(&self, collector_id: &str) -> Result<Vec<Collection>> {
        let collector_id = collector_id.to_string();
        self.execute(move |conn| list_collections(conn, "collector_id", &collector_id))
            .await
    }

    pub async fn list_collections_for_household(&self, household_id: &str) -> Result<Vec<Collection>> {
        let household_id = household_id.to_string();
        self.execute(move |conn| list_collections(conn, "household_id", &household_id))
            .await
    }

    /// Finalize a scheduled collection: items become collected and the
    /// earnings are priced from the items actually attached.
    pub async fn complete_collection(
        &self,
        collection_id: &str,
        prices: HashMap<RecyclableType, f64>,
        completed_at: DateTime<Utc>,
    ) -> Result<Collection> {
        let collection_id = collection_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            require_transition(&tx, &collection_id, CollectionStatus::Completed)?;

            let items = items_for_collection(&tx, &collection_id)?;
            let (total_weight_kg, actual_earnings) = weigh(&items, &prices);

            tx.execute(
                "UPDATE logged_items
                 SET collected = 1,
                     collector_id = (SELECT collector_id FROM collections WHERE id = ?1)
                 WHERE collection_id = ?1",
                params![collection_id],
            )?;

            tx.execute(
                "UPDATE collections
                 SET status = ?1,
                     total_weight_kg = ?2,
                     actual_earnings = ?3,
                     completed_at = ?4,
                     updated_at = ?4
                 WHERE id = ?5",
                params![
                    CollectionStatus::Completed.as_str(),
                    total_weight_kg,
                    actual_earnings,
                    completed_at.to_rfc3339(),
                    collection_id,
                ],
            )?;

            let collection = fetch_collection(&tx, &collection_id)?
                .ok_or_else(|| anyhow!("Collection not found after update"))?;
            tx.commit()?;
            Ok(collection)
        })
        .await
    }

    /// Cancel a scheduled collection and release its items back to the household.
    pub async fn cancel_collection(
        &self,
        collection_id: &str,
        cancelled_at: DateTime<Utc>,
    ) -> Result<Collection> {
        let collection_id = collection_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            require_transition(&tx, &collection_id, CollectionStatus::Cancelled)?;

            tx.execute(
                "UPDATE logged_items SET collection_id = NULL WHERE collection_id = ?1",
                params![collection_id],
            )?;
            tx.execute(
                "UPDATE collections
                 SET status = ?1,
                     updated_at = ?2
                 WHERE id = ?3",
                params![
                    CollectionStatus::Cancelled.as_str(),
                    cancelled_at.to_rfc3339(),
                    collection_id,
                ],
            )?;

            let collection = fetch_collection(&tx, &collection_id)?
                .ok_or_else(|| anyhow!("Collection not found after update"))?;
            tx.commit()?;
            Ok(collection)
        })
        .await
    }
}
