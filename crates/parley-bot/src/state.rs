use anyhow::{Context, Result};
use parley_dispatch::DispatchCoordinator;
use parley_persist::{PersistBuilder, Stores};
use std::sync::Arc;

use crate::config::Config;

/// Everything the console needs, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stores: Stores,
    pub coordinator: DispatchCoordinator,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, coordinator: DispatchCoordinator) -> Self {
        Self {
            config: Arc::new(config),
            stores,
            coordinator,
        }
    }

    /// Open storage, seed it from config and wire an HTTP-backed coordinator
    pub async fn init(config: Config) -> Result<Self> {
        let stores = PersistBuilder::new()
            .storage(config.storage.clone())
            .build()
            .await
            .context("Failed to open storage")?;

        seed(&stores, &config).await?;

        let coordinator = DispatchCoordinator::builder()
            .stores(&stores)
            .provider(config.provider.clone())
            .config(config.dispatch_config())
            .build()
            .context("Failed to build dispatch coordinator")?;

        Ok(Self::new(config, stores, coordinator))
    }
}

/// Load configured models and allow-list entries into the catalog
pub async fn seed(stores: &Stores, config: &Config) -> Result<()> {
    for profile in config.model_profiles() {
        if profile.api_key.is_empty() {
            tracing::warn!(
                model = %profile.name,
                "No API key for model; set OPENROUTER_API_KEY or api_key in config"
            );
        }
        tracing::info!(
            model = %profile.name,
            provider_id = %profile.provider_id,
            tier = profile.access_tier.as_str(),
            enabled = profile.is_enabled,
            "Seeding model"
        );
        stores
            .admin
            .upsert_model(profile)
            .await
            .context("Failed to seed model")?;
    }

    for identity in &config.access.allowlist {
        stores
            .admin
            .allow(identity)
            .await
            .context("Failed to seed allow-list")?;
    }

    Ok(())
}
