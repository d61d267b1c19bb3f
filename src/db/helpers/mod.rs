use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::{CollectionStatus, QuantityUnit, RecyclableType};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn parse_recyclable_type(value: &str) -> Result<RecyclableType> {
    match value {
        "plastic" => Ok(RecyclableType::Plastic),
        "paper" => Ok(RecyclableType::Paper),
        "glass" => Ok(RecyclableType::Glass),
        "metal" => Ok(RecyclableType::Metal),
        "cardboard" => Ok(RecyclableType::Cardboard),
        other => Err(anyhow!("unknown recyclable type {other}")),
    }
}

pub fn parse_unit(value: &str) -> Result<QuantityUnit> {
    match value {
        "kg" => Ok(QuantityUnit::Kg),
        "items" => Ok(QuantityUnit::Items),
        other => Err(anyhow!("unknown quantity unit {other}")),
    }
}

pub fn parse_collection_status(value: &str) -> Result<CollectionStatus> {
    match value {
        "scheduled" => Ok(CollectionStatus::Scheduled),
        "completed" => Ok(CollectionStatus::Completed),
        "cancelled" => Ok(CollectionStatus::Cancelled),
        other => Err(anyhow!("unknown collection status {other}")),
    }
}

/// SQLite hands booleans back as integers.
pub fn to_bool(value: i64) -> bool {
    value != 0
}
