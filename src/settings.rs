use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::impact::{ImpactConfig, StreakPolicy};

const UTC_OFFSET_ENV: &str = "RECOZA_UTC_OFFSET_MINUTES";
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// Offset used to decide where one calendar day ends and the next begins.
    pub utc_offset_minutes: i32,
    pub household_rate_per_kg: f64,
    pub weekly_window_days: u32,
    pub streak_policy: StreakPolicy,
}

impl Default for AppSettings {
    fn default() -> Self {
        let impact = ImpactConfig::default();
        Self {
            utc_offset_minutes: 0,
            household_rate_per_kg: impact.household_rate_per_kg,
            weekly_window_days: impact.weekly_window_days,
            streak_policy: StreakPolicy::Observed,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            bail!("UTC offset must be within ±14 hours");
        }
        if !self.household_rate_per_kg.is_finite() || self.household_rate_per_kg < 0.0 {
            bail!("Household rate must be a non-negative number");
        }
        if self.weekly_window_days == 0 {
            bail!("Weekly window must cover at least one day");
        }
        Ok(())
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or_else(|| anyhow!("invalid UTC offset {} minutes", self.utc_offset_minutes))
    }

    pub fn impact_config(&self) -> ImpactConfig {
        ImpactConfig {
            household_rate_per_kg: self.household_rate_per_kg,
            weekly_window_days: self.weekly_window_days,
            ..ImpactConfig::default()
        }
    }

    fn apply_env_overrides(&mut self) {
        let Ok(raw) = std::env::var(UTC_OFFSET_ENV) else {
            return;
        };
        match raw.trim().parse::<i32>() {
            Ok(minutes) if minutes.abs() <= MAX_OFFSET_MINUTES => {
                self.utc_offset_minutes = minutes;
            }
            _ => log::warn!("Ignoring invalid {UTC_OFFSET_ENV} value '{raw}'"),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<AppSettings>(&contents) {
                Ok(parsed) if parsed.validate().is_ok() => parsed,
                _ => {
                    log::warn!(
                        "Settings at {} are unreadable; using defaults",
                        path.display()
                    );
                    AppSettings::default()
                }
            }
        } else {
            AppSettings::default()
        };
        data.apply_env_overrides();

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn settings(&self) -> AppSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: AppSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self.write();
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    /// Current time in the configured offset.
    pub fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Utc::now().with_timezone(&self.read().offset()?))
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
