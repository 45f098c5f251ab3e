use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::record::FragmentRecord;
use super::traits::FragmentStore;

#[derive(Debug, Default)]
struct OwnerTables {
    metadata: BTreeMap<String, FragmentRecord>,
    data: BTreeMap<String, Vec<u8>>,
}

impl OwnerTables {
    fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.data.is_empty()
    }
}

/// In-process fragment store.
///
/// Each owner gets an ordered metadata table and data table, so listings come
/// back sorted by id. A single lock covers both tables, which makes `delete`
/// atomic for readers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: RwLock<HashMap<String, OwnerTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_key(owner_id: &str, id: &str) -> Result<(), StorageError> {
    if owner_id.is_empty() {
        return Err(StorageError::InvalidKey("owner id is empty".into()));
    }
    if id.is_empty() {
        return Err(StorageError::InvalidKey("fragment id is empty".into()));
    }
    Ok(())
}

#[async_trait]
impl FragmentStore for MemoryStore {
    async fn write_metadata(
        &self,
        owner_id: &str,
        id: &str,
        record: &FragmentRecord,
    ) -> Result<(), StorageError> {
        check_key(owner_id, id)?;
        record.check_key(owner_id, id)?;
        let mut owners = self.owners.write().await;
        owners
            .entry(owner_id.to_string())
            .or_default()
            .metadata
            .insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn read_metadata(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<FragmentRecord>, StorageError> {
        check_key(owner_id, id)?;
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner_id)
            .and_then(|tables| tables.metadata.get(id))
            .cloned())
    }

    async fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StorageError> {
        check_key(owner_id, id)?;
        let mut owners = self.owners.write().await;
        owners
            .entry(owner_id.to_string())
            .or_default()
            .data
            .insert(id.to_string(), data.to_vec());
        Ok(())
    }

    async fn read_data(&self, owner_id: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        check_key(owner_id, id)?;
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner_id)
            .and_then(|tables| tables.data.get(id))
            .cloned())
    }

    async fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StorageError> {
        let owners = self.owners.read().await;
        Ok(owners
            .get(owner_id)
            .map(|tables| tables.metadata.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        check_key(owner_id, id)?;
        let mut owners = self.owners.write().await;
        let Some(tables) = owners.get_mut(owner_id) else {
            return Err(StorageError::NotFound(format!("{owner_id}/{id}")));
        };

        let had_metadata = tables.metadata.remove(id).is_some();
        let had_data = tables.data.remove(id).is_some();
        if tables.is_empty() {
            owners.remove(owner_id);
        }

        if had_metadata || had_data {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("{owner_id}/{id}")))
        }
    }
}
