use anyhow::{anyhow, Result};
use parley_llm::{CompletionClient, ProviderClient, ProviderConfig};
use parley_persist::{CatalogStore, ContextStore, HistoryStore, Stores};
use std::sync::Arc;

use crate::catalog::{ModelCatalog, ShapeTable};
use crate::coordinator::DispatchCoordinator;
use crate::types::DispatchConfig;

/// Builder for constructing a DispatchCoordinator with optional components
pub struct DispatchBuilder {
    catalog_store: Option<Arc<dyn CatalogStore>>,
    history: Option<Arc<dyn HistoryStore>>,
    client: Option<Arc<dyn CompletionClient>>,
    provider: ProviderConfig,
    shapes: ShapeTable,
    config: DispatchConfig,
}

impl DispatchBuilder {
    pub fn new() -> Self {
        Self {
            catalog_store: None,
            history: None,
            client: None,
            provider: ProviderConfig::default(),
            shapes: ShapeTable::default(),
            config: DispatchConfig::default(),
        }
    }

    /// Use one backend for both history and catalog
    pub fn stores(mut self, stores: &Stores) -> Self {
        self.catalog_store = Some(Arc::clone(&stores.catalog));
        self.history = Some(Arc::clone(&stores.history));
        self
    }

    pub fn catalog_store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.catalog_store = Some(store);
        self
    }

    pub fn history_store(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(store);
        self
    }

    /// Completion client; defaults to an HTTP `ProviderClient` over `provider`
    pub fn client(mut self, client: Arc<dyn CompletionClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Config for the default HTTP client. Ignored when a client is injected.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn shapes(mut self, shapes: ShapeTable) -> Self {
        self.shapes = shapes;
        self
    }

    pub fn config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DispatchCoordinator> {
        let catalog_store = self
            .catalog_store
            .ok_or_else(|| anyhow!("Catalog store is required"))?;
        let history = self
            .history
            .ok_or_else(|| anyhow!("History store is required"))?;

        let client: Arc<dyn CompletionClient> = match self.client {
            Some(client) => client,
            None => Arc::new(ProviderClient::new(self.provider)?),
        };

        Ok(DispatchCoordinator::new(
            ModelCatalog::new(catalog_store).with_shapes(self.shapes),
            ContextStore::new(history),
            client,
            self.config,
        ))
    }
}

impl Default for DispatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}
