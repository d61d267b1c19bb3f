use anyhow::Result;
use rusqlite::Row;

use crate::db::{connection::Database, helpers::parse_recyclable_type, models::RecyclablePrice};

fn row_to_price(row: &Row) -> Result<RecyclablePrice> {
    let recyclable_type: String = row.get("type")?;

    Ok(RecyclablePrice {
        recyclable_type: parse_recyclable_type(&recyclable_type)?,
        price_per_kg: row.get("price_per_kg")?,
        label: row.get("label")?,
    })
}

impl Database {
    /// Reference prices seeded by the schema. Read once at startup.
    pub async fn list_prices(&self) -> Result<Vec<RecyclablePrice>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT type, price_per_kg, label
                 FROM recyclable_prices
                 ORDER BY type ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut prices = Vec::new();
            while let Some(row) = rows.next()? {
                prices.push(row_to_price(row)?);
            }

            Ok(prices)
        })
        .await
    }
}
