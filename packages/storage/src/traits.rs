use async_trait::async_trait;

use super::error::StorageError;
use super::record::FragmentRecord;

/// Owner-scoped fragment storage, split into metadata records and data payloads.
///
/// Operations on distinct `owner_id/id` keys are independent. Implementations do
/// not have to serialize concurrent writes to the same key; the bundled backends
/// are last-write-wins, so two callers racing `write_*` or `delete` on one
/// fragment may observe each other's effects in any order.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Write (create or replace) the metadata record for a fragment.
    async fn write_metadata(
        &self,
        owner_id: &str,
        id: &str,
        record: &FragmentRecord,
    ) -> Result<(), StorageError>;

    /// Read the metadata record for a fragment, `None` if absent.
    async fn read_metadata(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<FragmentRecord>, StorageError>;

    /// Write (create or replace) the data payload for a fragment.
    async fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Read the data payload for a fragment, `None` if absent.
    async fn read_data(&self, owner_id: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// List the ids of every fragment with metadata for the owner.
    ///
    /// Each call enumerates current state afresh.
    async fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StorageError>;

    /// Remove both metadata and data for a fragment.
    ///
    /// Returns [`StorageError::NotFound`] if neither exists.
    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StorageError>;

    /// Check whether metadata exists for a fragment.
    async fn exists(&self, owner_id: &str, id: &str) -> Result<bool, StorageError> {
        Ok(self.read_metadata(owner_id, id).await?.is_some())
    }
}
