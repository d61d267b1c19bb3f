use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, bail, Result};

use crate::db::{Database, Profile, ProfileInput};
use crate::services::MutationResult;
use crate::log_info;

const ENABLE_LOGS: bool = true;

/// Tracks which profile is signed in on this device.
///
/// Credential checks happen in the hosted auth backend; this service only
/// resolves the profile row and remembers it.
pub struct AuthService {
    db: Database,
    current: RwLock<Option<Profile>>,
}

impl AuthService {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            current: RwLock::new(None),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Profile>> {
        self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Profile>> {
        self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn sign_up(&self, input: ProfileInput) -> MutationResult<Profile> {
        let result = self.db.insert_profile(input).await;
        if let Ok(profile) = &result {
            log_info!(
                "Signed up {} (collector: {})",
                profile.id,
                profile.is_collector
            );
            *self.write() = Some(profile.clone());
        }
        result.into()
    }

    pub async fn sign_in(&self, email: &str) -> MutationResult<Profile> {
        let result = match self.db.find_profile_by_email(email).await {
            Ok(Some(profile)) => Ok(profile),
            Ok(None) => Err(anyhow!("No account found for {}", email.trim())),
            Err(err) => Err(err),
        };
        if let Ok(profile) = &result {
            log_info!("Signed in {}", profile.id);
            *self.write() = Some(profile.clone());
        }
        result.into()
    }

    pub fn sign_out(&self) {
        if let Some(profile) = self.write().take() {
            log_info!("Signed out {}", profile.id);
        }
    }

    pub fn current_profile(&self) -> Option<Profile> {
        self.read().clone()
    }

    pub fn require_profile(&self) -> Result<Profile> {
        self.current_profile()
            .ok_or_else(|| anyhow!("You need to be signed in"))
    }

    pub fn require_collector(&self) -> Result<Profile> {
        let profile = self.require_profile()?;
        if !profile.is_collector {
            bail!("Only collectors can manage collections");
        }
        Ok(profile)
    }
}
