//! Registry of live tables.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::actor::{TableActor, TableHandle, TableId};
use super::config::{ConfigError, TableConfig};

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    #[error("unknown table {0}")]
    UnknownTable(TableId),
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Tracks every table this process is hosting. Clones share state.
#[derive(Clone)]
pub struct TableRegistry {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    next_id: TableId,
    tables: HashMap<TableId, TableHandle>,
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                next_id: 1,
                tables: HashMap::new(),
            })),
        }
    }

    /// Validate the config, spawn the actor, and register its handle.
    pub async fn create(&self, config: TableConfig) -> Result<TableHandle, RegistryError> {
        config.validate()?;
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;
        let handle = TableActor::spawn(id, config);
        inner.tables.insert(id, handle.clone());
        log::info!("registered table {id}");
        Ok(handle)
    }

    pub async fn get(&self, id: TableId) -> Option<TableHandle> {
        self.inner.read().await.tables.get(&id).cloned()
    }

    /// Shut a table down and forget it.
    pub async fn close(&self, id: TableId) -> Result<(), RegistryError> {
        let handle = {
            let mut inner = self.inner.write().await;
            inner
                .tables
                .remove(&id)
                .ok_or(RegistryError::UnknownTable(id))?
        };
        let _ = handle.close().await;
        log::info!("closed table {id}");
        Ok(())
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.tables.len()
    }

    pub async fn ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.inner.read().await.tables.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
