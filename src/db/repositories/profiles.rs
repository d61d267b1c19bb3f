use anyhow::{bail, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_bool},
    models::{Profile, ProfileInput},
};

fn row_to_profile(row: &Row) -> Result<Profile> {
    let created_at: String = row.get("created_at")?;
    let is_collector: i64 = row.get("is_collector")?;

    Ok(Profile {
        id: row.get("id")?,
        full_name: row.get("full_name")?,
        email: row.get("email")?,
        is_collector: to_bool(is_collector),
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Create a profile. Emails are stored lowercased and must be unique.
    pub async fn insert_profile(&self, input: ProfileInput) -> Result<Profile> {
        let full_name = input.full_name.trim().to_string();
        let email = input.email.trim().to_lowercase();
        if full_name.is_empty() {
            bail!("full name is required");
        }
        if !email.contains('@') {
            bail!("a valid email is required");
        }

        self.execute(move |conn| {
            let taken: Option<String> = conn
                .query_row(
                    "SELECT id FROM profiles WHERE email = ?1",
                    params![email],
                    |row| row.get(0),
                )
                .optional()?;
            if taken.is_some() {
                bail!("a profile with email {email} already exists");
            }

            let profile = Profile {
                id: Uuid::new_v4().to_string(),
                full_name,
                email,
                is_collector: input.is_collector,
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO profiles (id, full_name, email, is_collector, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    profile.id,
                    profile.full_name,
                    profile.email,
                    profile.is_collector,
                    profile.created_at.to_rfc3339(),
                ],
            )?;

            Ok(profile)
        })
        .await
    }

    pub async fn get_profile(&self, profile_id: &str) -> Result<Option<Profile>> {
        let profile_id = profile_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, full_name, email, is_collector, created_at
                 FROM profiles
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![profile_id])?;
            let profile = match rows.next()? {
                Some(row) => Some(row_to_profile(row)?),
                None => None,
            };
            Ok(profile)
        })
        .await
    }

    pub async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        let email = email.trim().to_lowercase();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, full_name, email, is_collector, created_at
                 FROM profiles
                 WHERE email = ?1",
            )?;

            let mut rows = stmt.query(params![email])?;
            let profile = match rows.next()? {
                Some(row) => Some(row_to_profile(row)?),
                None => None,
            };
            Ok(profile)
        })
        .await
    }
}
