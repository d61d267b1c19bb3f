pub mod db;
pub mod impact;
pub mod services;
pub mod settings;
pub mod utils;

use std::{path::Path, sync::Arc};

use anyhow::{bail, Context, Result};
use log::{info, warn};

use db::{Database, PriceTable};
use services::{AuthService, CollectionService, RecyclablesService};
use settings::SettingsStore;

/// Everything the UI layer talks to, wired together once at startup.
pub struct AppState {
    pub db: Database,
    pub settings: Arc<SettingsStore>,
    pub prices: Arc<PriceTable>,
    pub auth: Arc<AuthService>,
    pub recyclables: RecyclablesService,
    pub collections: CollectionService,
}

/// Open (or create) the app's data directory and construct the services.
pub async fn bootstrap(data_dir: &Path) -> Result<AppState> {
    utils::logging::init_logging();
    info!("Recoza starting up...");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let database = Database::new(data_dir.join("recoza.sqlite3"))?;

    let prices = PriceTable::from_prices(database.list_prices().await?);
    if prices.is_empty() {
        bail!("recyclable price table is empty");
    }
    info!("Loaded {} recyclable prices", prices.len());

    let settings = Arc::new(SettingsStore::new(data_dir.join("settings.json"))?);
    let offset = settings.settings().utc_offset_minutes;
    if offset == 0 {
        warn!("Day boundaries use UTC; set utcOffsetMinutes to follow local midnight");
    }

    let prices = Arc::new(prices);
    let auth = Arc::new(AuthService::new(database.clone()));
    let recyclables = RecyclablesService::new(database.clone(), auth.clone(), settings.clone());
    let collections =
        CollectionService::new(database.clone(), auth.clone(), settings.clone(), prices.clone());

    Ok(AppState {
        db: database,
        settings,
        prices,
        auth,
        recyclables,
        collections,
    })
}
