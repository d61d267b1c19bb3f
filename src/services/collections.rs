use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};

use crate::db::{Collection, Database, LoggedItem, NewCollection, PriceTable, Profile};
use crate::impact::{collector_stats, CollectorStats};
use crate::services::{AuthService, MutationResult};
use crate::settings::SettingsStore;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Collector-side pickup management.
pub struct CollectionService {
    db: Database,
    auth: Arc<AuthService>,
    settings: Arc<SettingsStore>,
    prices: Arc<PriceTable>,
}

impl CollectionService {
    pub fn new(
        db: Database,
        auth: Arc<AuthService>,
        settings: Arc<SettingsStore>,
        prices: Arc<PriceTable>,
    ) -> Self {
        Self {
            db,
            auth,
            settings,
            prices,
        }
    }

    /// Items households have logged that nobody has scheduled yet.
    pub async fn available_items(&self) -> Result<Vec<LoggedItem>> {
        self.auth.require_collector()?;
        self.db.list_uncollected_items().await
    }

    pub async fn schedule(
        &self,
        household_id: &str,
        item_ids: Vec<String>,
        scheduled_for: DateTime<Utc>,
    ) -> MutationResult<Collection> {
        let result = self.try_schedule(household_id, item_ids, scheduled_for).await;
        if let Err(err) = &result {
            log_warn!("Failed to schedule collection for {household_id}: {err:#}");
        }
        result.into()
    }

    async fn try_schedule(
        &self,
        household_id: &str,
        item_ids: Vec<String>,
        scheduled_for: DateTime<Utc>,
    ) -> Result<Collection> {
        let collector = self.auth.require_collector()?;
        let request = NewCollection {
            collector_id: collector.id,
            household_id: household_id.to_string(),
            item_ids,
            scheduled_for,
        };

        let collection = self
            .db
            .insert_collection(request, self.prices.as_map().clone(), Utc::now())
            .await?;
        log_info!(
            "Scheduled collection {} ({:.2} kg, est. {:.2})",
            collection.id,
            collection.total_weight_kg,
            collection.estimated_earnings
        );
        Ok(collection)
    }

    pub async fn complete(&self, collection_id: &str) -> MutationResult<Collection> {
        let result = self.try_complete(collection_id).await;
        if let Err(err) = &result {
            log_warn!("Failed to complete collection {collection_id}: {err:#}");
        }
        result.into()
    }

    async fn try_complete(&self, collection_id: &str) -> Result<Collection> {
        let collector = self.auth.require_collector()?;
        self.require_owner(&collector, collection_id).await?;

        let collection = self
            .db
            .complete_collection(collection_id, self.prices.as_map().clone(), Utc::now())
            .await?;
        log_info!(
            "Completed collection {} for {:.2}",
            collection.id,
            collection.actual_earnings.unwrap_or_default()
        );
        Ok(collection)
    }

    pub async fn cancel(&self, collection_id: &str) -> MutationResult<Collection> {
        let result = self.try_cancel(collection_id).await;
        if let Err(err) = &result {
            log_warn!("Failed to cancel collection {collection_id}: {err:#}");
        }
        result.into()
    }

    async fn try_cancel(&self, collection_id: &str) -> Result<Collection> {
        let collector = self.auth.require_collector()?;
        self.require_owner(&collector, collection_id).await?;

        let collection = self.db.cancel_collection(collection_id, Utc::now()).await?;
        log_info!("Cancelled collection {}", collection.id);
        Ok(collection)
    }

    /// Collections visible to the signed-in profile: owned ones for a
    /// collector, incoming ones for a household.
    pub async fn collections(&self) -> Result<Vec<Collection>> {
        let profile = self.auth.require_profile()?;
        if profile.is_collector {
            self.db.list_collections_for_collector(&profile.id).await
        } else {
            self.db.list_collections_for_household(&profile.id).await
        }
    }

    /// Recomputed from stored collections on every call.
    pub async fn stats(&self) -> Result<CollectorStats> {
        let collector = self.auth.require_collector()?;
        let collections = self.db.list_collections_for_collector(&collector.id).await?;
        let settings = self.settings.settings();
        Ok(collector_stats(
            &collections,
            settings.weekly_window_days,
            self.settings.now()?,
        ))
    }

    async fn require_owner(&self, collector: &Profile, collection_id: &str) -> Result<()> {
        let collection = self
            .db
            .get_collection(collection_id)
            .await?
            .ok_or_else(|| anyhow!("Collection not found"))?;
        if collection.collector_id != collector.id {
            bail!("Collection belongs to another collector");
        }
        Ok(())
    }
}
