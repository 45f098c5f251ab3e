use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fragments::{Fragment, FragmentRecord, FragmentStore, NewFragment, StorageError};
use storage::MemoryStore;

/// Memory-backed store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_data_writes: AtomicBool,
    fail_metadata_writes: AtomicBool,
}

impl FlakyStore {
    pub fn fail_data_writes(&self, fail: bool) {
        self.fail_data_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_metadata_writes(&self, fail: bool) {
        self.fail_metadata_writes.store(fail, Ordering::SeqCst);
    }
}

fn injected(what: &str) -> StorageError {
    StorageError::Backend(format!("injected {what} failure"))
}

#[async_trait]
impl FragmentStore for FlakyStore {
    async fn write_metadata(
        &self,
        owner_id: &str,
        id: &str,
        record: &FragmentRecord,
    ) -> Result<(), StorageError> {
        if self.fail_metadata_writes.load(Ordering::SeqCst) {
            return Err(injected("metadata write"));
        }
        self.inner.write_metadata(owner_id, id, record).await
    }

    async fn read_metadata(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<FragmentRecord>, StorageError> {
        self.inner.read_metadata(owner_id, id).await
    }

    async fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_data_writes.load(Ordering::SeqCst) {
            return Err(injected("data write"));
        }
        self.inner.write_data(owner_id, id, data).await
    }

    async fn read_data(&self, owner_id: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.read_data(owner_id, id).await
    }

    async fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StorageError> {
        self.inner.list_ids(owner_id).await
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        self.inner.delete(owner_id, id).await
    }
}

/// Create a fragment for `owner_id` and store `data` in it.
pub async fn create(
    store: &dyn FragmentStore,
    owner_id: &str,
    content_type: &str,
    data: &[u8],
) -> Fragment {
    let mut fragment = Fragment::new(NewFragment::new(owner_id, content_type)).unwrap();
    fragment.set_data(store, data).await.unwrap();
    fragment
}
