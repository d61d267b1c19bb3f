use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use log::warn;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_recyclable_type, parse_unit, to_bool},
    models::{LoggedItem, LoggedItemInput},
};

const ITEM_COLUMNS: &str =
    "id, household_id, type, quantity, unit, logged_at, collected, collector_id, collection_id";

fn row_to_item(row: &Row) -> Result<LoggedItem> {
    let recyclable_type: String = row.get("type")?;
    let unit: String = row.get("unit")?;
    let logged_at: String = row.get("logged_at")?;
    let collected: i64 = row.get("collected")?;

    Ok(LoggedItem {
        id: row.get("id")?,
        household_id: row.get("household_id")?,
        recyclable_type: parse_recyclable_type(&recyclable_type)?,
        quantity: row.get("quantity")?,
        unit: parse_unit(&unit)?,
        logged_at: parse_datetime(&logged_at, "logged_at")?,
        collected: to_bool(collected),
        collector_id: row.get("collector_id")?,
        collection_id: row.get("collection_id")?,
    })
}

/// Run an item query, dropping rows that fail to parse.
///
/// A single malformed record must not take down a whole dashboard.
pub(crate) fn query_items(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<LoggedItem>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        match row_to_item(row) {
            Ok(item) => items.push(item),
            Err(err) => {
                let id: Option<String> = row.get("id").ok();
                warn!("Skipping malformed logged item {:?}: {err:#}", id);
            }
        }
    }
    Ok(items)
}

pub(crate) fn items_by_ids(conn: &Connection, ids: &[String]) -> Result<Vec<LoggedItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT {ITEM_COLUMNS} FROM logged_items WHERE id IN ({placeholders})");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(ids.iter()))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        match row_to_item(row) {
            Ok(item) => items.push(item),
            Err(err) => warn!("Skipping malformed logged item: {err:#}"),
        }
    }
    Ok(items)
}

pub(crate) fn items_for_collection(conn: &Connection, collection_id: &str) -> Result<Vec<LoggedItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM logged_items WHERE collection_id = ?1");
    query_items(conn, &sql, &[&collection_id])
}

/// Explain why `household_id` was refused an edit to `item_id`.
fn locked_reason(conn: &Connection, household_id: &str, item_id: &str) -> Result<anyhow::Error> {
    let state: Option<(String, i64, Option<String>)> = conn
        .query_row(
            "SELECT household_id, collected, collection_id FROM logged_items WHERE id = ?1",
            params![item_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    Ok(match state {
        None => anyhow!("Logged item not found"),
        Some((owner, _, _)) if owner != household_id => {
            anyhow!("Logged item belongs to another household")
        }
        Some((_, collected, _)) if to_bool(collected) => {
            anyhow!("Logged item has already been collected")
        }
        Some((_, _, Some(collection_id))) => {
            anyhow!("Logged item is reserved by collection {collection_id}")
        }
        Some(_) => anyhow!("Logged item could not be changed"),
    })
}

impl Database {
    pub async fn insert_logged_item(
        &self,
        household_id: &str,
        input: LoggedItemInput,
        logged_at: DateTime<Utc>,
    ) -> Result<LoggedItem> {
        input.validate()?;

        let item = LoggedItem {
            id: Uuid::new_v4().to_string(),
            household_id: household_id.to_string(),
            recyclable_type: input.recyclable_type,
            quantity: input.quantity,
            unit: input.unit,
            logged_at,
            collected: false,
            collector_id: None,
            collection_id: None,
        };

        let record = item.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO logged_items (id, household_id, type, quantity, unit, logged_at, collected)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![
                    record.id,
                    record.household_id,
                    record.recyclable_type.as_str(),
                    record.quantity,
                    record.unit.as_str(),
                    record.logged_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(item)
    }

    /// All items logged by a household, most recent first.
    pub async fn list_items_for_household(&self, household_id: &str) -> Result<Vec<LoggedItem>> {
        let household_id = household_id.to_string();
        self.execute(move |conn| {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM logged_items
                 WHERE household_id = ?1
                 ORDER BY logged_at DESC"
            );
            query_items(conn, &sql, &[&household_id])
        })
        .await
    }

    /// Items still waiting for a pickup, across all households.
    pub async fn list_uncollected_items(&self) -> Result<Vec<LoggedItem>> {
        self.execute(|conn| {
            let sql = format!(
                "SELECT {ITEM_COLUMNS} FROM logged_items
                 WHERE collected = 0 AND collection_id IS NULL
                 ORDER BY household_id ASC, logged_at ASC"
            );
            query_items(conn, &sql, &[])
        })
        .await
    }

    pub async fn get_items_by_ids(&self, ids: Vec<String>) -> Result<Vec<LoggedItem>> {
        self.execute(move |conn| items_by_ids(conn, &ids)).await
    }

    /// Replace the editable fields of an item owned by `household_id`.
    ///
    /// Items that are collected, or reserved by a collection, are frozen.
    pub async fn update_logged_item(
        &self,
        household_id: &str,
        item_id: &str,
        input: LoggedItemInput,
    ) -> Result<LoggedItem> {
        input.validate()?;

        let household_id = household_id.to_string();
        let item_id = item_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "UPDATE logged_items
                 SET type = ?1,
                     quantity = ?2,
                     unit = ?3
                 WHERE id = ?4
                   AND household_id = ?5
                   AND collected = 0
                   AND collection_id IS NULL",
                params![
                    input.recyclable_type.as_str(),
                    input.quantity,
                    input.unit.as_str(),
                    item_id,
                    household_id,
                ],
            )?;

            if rows_affected == 0 {
                return Err(locked_reason(conn, &household_id, &item_id)?);
            }

            let mut items = items_by_ids(conn, std::slice::from_ref(&item_id))?;
            match items.pop() {
                Some(item) => Ok(item),
                None => bail!("Logged item not found after update"),
            }
        })
        .await
    }

    pub async fn delete_logged_item(&self, household_id: &str, item_id: &str) -> Result<()> {
        let household_id = household_id.to_string();
        let item_id = item_id.to_string();
        self.execute(move |conn| {
            let rows_affected = conn.execute(
                "DELETE FROM logged_items
                 WHERE id = ?1
                   AND household_id = ?2
                   AND collected = 0
                   AND collection_id IS NULL",
                params![item_id, household_id],
            )?;

            if rows_affected == 0 {
                return Err(locked_reason(conn, &household_id, &item_id)?);
            }
            Ok(())
        })
        .await
    }
}
