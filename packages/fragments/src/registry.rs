//! Lookup, listing and deletion of stored fragments by owner.

use futures::future::try_join_all;
use serde::Serialize;
use storage::{FragmentStore, StorageError};
use tracing::{debug, instrument};

use crate::error::FragmentError;
use crate::fragment::Fragment;

/// Result of [`Fragment::by_user`].
///
/// Serializes as a bare JSON array of ids or of fragment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Ids(Vec<String>),
    Expanded(Vec<Fragment>),
}

impl Listing {
    pub fn len(&self) -> usize {
        match self {
            Self::Ids(ids) => ids.len(),
            Self::Expanded(fragments) => fragments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fragment ids in listing order, whichever form the listing takes.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::Ids(ids) => ids.iter().map(String::as_str).collect(),
            Self::Expanded(fragments) => fragments.iter().map(Fragment::id).collect(),
        }
    }
}

impl Fragment {
    /// List an owner's fragments in the store's order, as ids or, when `expand`
    /// is set, as fully loaded fragments.
    #[instrument(skip(store))]
    pub async fn by_user(
        store: &dyn FragmentStore,
        owner_id: &str,
        expand: bool,
    ) -> Result<Listing, FragmentError> {
        let ids = store.list_ids(owner_id).await?;
        debug!(count = ids.len(), "Listed fragments");
        if !expand {
            return Ok(Listing::Ids(ids));
        }

        let fragments =
            try_join_all(ids.iter().map(|id| Fragment::by_id(store, owner_id, id))).await?;
        Ok(Listing::Expanded(fragments))
    }

    /// Load one fragment's metadata.
    ///
    /// The stored `created`/`updated` values are kept exactly.
    #[instrument(skip(store))]
    pub async fn by_id(
        store: &dyn FragmentStore,
        owner_id: &str,
        id: &str,
    ) -> Result<Fragment, FragmentError> {
        let record = store
            .read_metadata(owner_id, id)
            .await?
            .ok_or_else(|| FragmentError::not_found(owner_id, id))?;
        Fragment::from_record(record)
    }

    /// Remove a fragment's metadata and data.
    #[instrument(skip(store))]
    pub async fn delete(
        store: &dyn FragmentStore,
        owner_id: &str,
        id: &str,
    ) -> Result<(), FragmentError> {
        match store.delete(owner_id, id).await {
            Ok(()) => Ok(()),
            Err(StorageError::NotFound(_)) => Err(FragmentError::not_found(owner_id, id)),
            Err(e) => Err(e.into()),
        }
    }
}
