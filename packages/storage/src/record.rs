use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Plain metadata record for one fragment, as held by a backend.
///
/// Serialized as `{"id", "ownerId", "created", "updated", "type", "size"}` with
/// RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: String,
    pub owner_id: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Full `Content-Type` value, possibly carrying a `charset` parameter.
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
}

impl FragmentRecord {
    /// Ensure the record belongs under the `owner_id/id` key it is being written to.
    pub(crate) fn check_key(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        if self.owner_id != owner_id || self.id != id {
            return Err(StorageError::InvalidKey(format!(
                "record {}/{} written under {owner_id}/{id}",
                self.owner_id, self.id
            )));
        }
        Ok(())
    }
}
