use serde::Deserialize;
use std::sync::Arc;

use crate::dbs::MemoryStore;
use crate::error::Result;
use crate::trait_client::{CatalogAdmin, CatalogStore, HistoryStore};

/// Which backend holds history and the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Memory,
    Sqlite {
        url: String,
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory
    }
}

/// Handles onto one backend, seen through each trait
#[derive(Clone)]
pub struct Stores {
    pub history: Arc<dyn HistoryStore>,
    pub catalog: Arc<dyn CatalogStore>,
    pub admin: Arc<dyn CatalogAdmin>,
}

impl Stores {
    fn from_backend<S>(store: S) -> Self
    where
        S: HistoryStore + CatalogAdmin + Clone + 'static,
    {
        Self {
            history: Arc::new(store.clone()),
            catalog: Arc::new(store.clone()),
            admin: Arc::new(store),
        }
    }

    pub fn memory() -> Self {
        Self::from_backend(MemoryStore::new())
    }
}

pub struct PersistBuilder {
    storage: StorageConfig,
}

impl PersistBuilder {
    pub fn new() -> Self {
        Self {
            storage: StorageConfig::default(),
        }
    }

    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn sqlite(mut self, url: impl Into<String>) -> Self {
        self.storage = StorageConfig::Sqlite {
            url: url.into(),
            max_connections: default_max_connections(),
        };
        self
    }

    pub async fn build(self) -> Result<Stores> {
        match self.storage {
            StorageConfig::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Stores::memory())
            }
            #[cfg(feature = "sqlite")]
            StorageConfig::Sqlite { url, max_connections } => {
                let store = crate::dbs::SqliteStore::connect(&url, max_connections).await?;
                Ok(Stores::from_backend(store))
            }
            #[cfg(not(feature = "sqlite"))]
            StorageConfig::Sqlite { .. } => Err(crate::error::PersistError::Connection(
                "sqlite storage requires the `sqlite` feature".to_string(),
            )),
        }
    }
}

impl Default for PersistBuilder {
    fn default() -> Self {
        Self::new()
    }
}
