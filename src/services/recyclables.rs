use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use crate::db::{Database, LoggedItem, LoggedItemInput};
use crate::impact::{household_summary, HouseholdSummary};
use crate::services::{AuthService, MutationResult};
use crate::settings::SettingsStore;
use crate::{log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Items cached for one household. A snapshot is only ever read back for the
/// profile that loaded it.
#[derive(Default)]
struct Snapshot {
    owner: Option<String>,
    items: Vec<LoggedItem>,
}

impl Snapshot {
    fn owned_by(&self, profile_id: &str) -> bool {
        self.owner.as_deref() == Some(profile_id)
    }
}

/// The signed-in household's logged items, plus a local snapshot the UI reads
/// without another round trip. The snapshot is patched after each accepted write
/// and reloaded whenever a different profile reads it.
pub struct RecyclablesService {
    db: Database,
    auth: Arc<AuthService>,
    settings: Arc<SettingsStore>,
    snapshot: Mutex<Snapshot>,
}

impl RecyclablesService {
    pub fn new(db: Database, auth: Arc<AuthService>, settings: Arc<SettingsStore>) -> Self {
        Self {
            db,
            auth,
            settings,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    async fn load(&self, profile_id: &str) -> Result<Vec<LoggedItem>> {
        match self.db.list_items_for_household(profile_id).await {
            Ok(items) => Ok(items),
            Err(err) => {
                log_error!("Failed to load items for {profile_id}: {err:#}");
                Err(err)
            }
        }
    }

    /// Lock the snapshot, reloading it first if another profile filled it.
    async fn snapshot_for(&self, profile_id: &str) -> Result<MutexGuard<'_, Snapshot>> {
        let mut snapshot = self.snapshot.lock().await;
        if !snapshot.owned_by(profile_id) {
            let items = self.load(profile_id).await?;
            *snapshot = Snapshot {
                owner: Some(profile_id.to_string()),
                items,
            };
        }
        Ok(snapshot)
    }

    /// Reload the snapshot from the store.
    pub async fn refresh(&self) -> Result<Vec<LoggedItem>> {
        let profile = self.auth.require_profile()?;
        let items = self.load(&profile.id).await?;
        *self.snapshot.lock().await = Snapshot {
            owner: Some(profile.id),
            items: items.clone(),
        };
        Ok(items)
    }

    pub async fn items(&self) -> Result<Vec<LoggedItem>> {
        let profile = self.auth.require_profile()?;
        Ok(self.snapshot_for(&profile.id).await?.items.clone())
    }

    pub async fn log_item(&self, input: LoggedItemInput) -> MutationResult<LoggedItem> {
        let result = self.try_log_item(input).await;
        if let Err(err) = &result {
            log_warn!("Failed to log item: {err:#}");
        }
        result.into()
    }

    async fn try_log_item(&self, input: LoggedItemInput) -> Result<LoggedItem> {
        let profile = self.auth.require_profile()?;
        let item = self
            .db
            .insert_logged_item(&profile.id, input, Utc::now())
            .await?;

        let mut snapshot = self.snapshot.lock().await;
        if snapshot.owned_by(&profile.id) {
            snapshot.items.insert(0, item.clone());
        }
        log_info!(
            "Logged {} {} of {} for {}",
            item.quantity,
            item.unit.as_str(),
            item.recyclable_type,
            profile.id
        );
        Ok(item)
    }

    pub async fn update_item(&self, item_id: &str, input: LoggedItemInput) -> MutationResult<LoggedItem> {
        let result = self.try_update_item(item_id, input).await;
        if let Err(err) = &result {
            log_warn!("Failed to update item {item_id}: {err:#}");
        }
        result.into()
    }

    async fn try_update_item(&self, item_id: &str, input: LoggedItemInput) -> Result<LoggedItem> {
        let profile = self.auth.require_profile()?;
        let updated = self
            .db
            .update_logged_item(&profile.id, item_id, input)
            .await?;

        let mut snapshot = self.snapshot.lock().await;
        if snapshot.owned_by(&profile.id) {
            if let Some(existing) = snapshot.items.iter_mut().find(|item| item.id == updated.id) {
                *existing = updated.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete_item(&self, item_id: &str) -> MutationResult {
        match self.try_delete_item(item_id).await {
            Ok(()) => MutationResult::done(),
            Err(err) => {
                log_warn!("Failed to delete item {item_id}: {err:#}");
                MutationResult::failed(err.to_string())
            }
        }
    }

    async fn try_delete_item(&self, item_id: &str) -> Result<()> {
        let profile = self.auth.require_profile()?;
        self.db.delete_logged_item(&profile.id, item_id).await?;

        let mut snapshot = self.snapshot.lock().await;
        if snapshot.owned_by(&profile.id) {
            snapshot.items.retain(|item| item.id != item_id);
        }
        Ok(())
    }

    /// Dashboard numbers over the signed-in household's snapshot.
    pub async fn summary(&self) -> Result<HouseholdSummary> {
        let profile = self.auth.require_profile()?;
        let settings = self.settings.settings();
        let now = self.settings.now()?;
        let snapshot = self.snapshot_for(&profile.id).await?;
        Ok(household_summary(
            &snapshot.items,
            &settings.impact_config(),
            settings.streak_policy,
            now,
        ))
    }
}
