use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storage::{FragmentRecord, FragmentStore};
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::error::FragmentError;
use crate::formats;

/// Construction input for a [`Fragment`].
///
/// Only `owner_id` and `content_type` are required; everything else is filled
/// in by [`Fragment::new`]. Missing strings deserialize as empty and are then
/// rejected by validation, not by the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewFragment {
    pub id: Option<String>,
    pub owner_id: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: Option<i64>,
}

impl NewFragment {
    pub fn new(owner_id: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            content_type: content_type.into(),
            ..Default::default()
        }
    }
}

/// Metadata for one owner-scoped fragment.
///
/// `id`, `owner_id` and the content type are fixed once constructed. `size` and
/// `updated` only change through [`Fragment::save`], [`Fragment::set_data`] and
/// [`Fragment::update_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    #[serde(flatten)]
    record: FragmentRecord,
    #[serde(skip)]
    mime_type: String,
}

/// Validate owner and type, returning the type's essence.
fn validate(owner_id: &str, content_type: &str) -> Result<String, FragmentError> {
    if owner_id.is_empty() {
        return Err(FragmentError::Validation("ownerId is required".into()));
    }
    if content_type.trim().is_empty() {
        return Err(FragmentError::Validation("type is required".into()));
    }
    let mime_type = formats::essence(content_type).ok_or_else(|| {
        FragmentError::Validation(format!("type is not a valid MIME type: {content_type}"))
    })?;
    if formats::renderings(&mime_type).is_empty() {
        return Err(FragmentError::Validation(format!(
            "unsupported type: {content_type}"
        )));
    }
    Ok(mime_type)
}

impl Fragment {
    /// Validate `init` and build a fragment, generating a UUID v4 id and the
    /// current time for whatever was not supplied.
    pub fn new(init: NewFragment) -> Result<Self, FragmentError> {
        let mime_type = validate(&init.owner_id, &init.content_type)?;
        let size = match init.size {
            None => 0,
            Some(size) => u64::try_from(size).map_err(|_| {
                FragmentError::Validation(format!("size must be non-negative, got {size}"))
            })?,
        };

        let now = Utc::now();
        let id = init
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Ok(Self {
            record: FragmentRecord {
                id,
                owner_id: init.owner_id,
                created: init.created.unwrap_or(now),
                updated: init.updated.unwrap_or(now),
                content_type: init.content_type,
                size,
            },
            mime_type,
        })
    }

    /// Rebuild a fragment from a stored record, keeping its timestamps as-is.
    pub fn from_record(record: FragmentRecord) -> Result<Self, FragmentError> {
        let mime_type = validate(&record.owner_id, &record.content_type)?;
        if record.id.is_empty() {
            return Err(FragmentError::Validation("stored record has no id".into()));
        }
        Ok(Self { record, mime_type })
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn owner_id(&self) -> &str {
        &self.record.owner_id
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.record.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.record.updated
    }

    /// The full type as supplied at construction, parameters included.
    pub fn content_type(&self) -> &str {
        &self.record.content_type
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    /// The type without parameters: `text/html; charset=utf-8` -> `text/html`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_text(&self) -> bool {
        self.mime_type.starts_with("text/")
    }

    /// Types this fragment can be rendered as, most preferred first.
    pub fn formats(&self) -> Vec<&'static str> {
        formats::renderings(&self.mime_type)
            .iter()
            .map(|rendering| rendering.mime)
            .collect()
    }

    pub fn record(&self) -> &FragmentRecord {
        &self.record
    }

    pub fn into_record(self) -> FragmentRecord {
        self.record
    }

    /// Refresh `updated` and persist the metadata record.
    #[instrument(skip_all, fields(owner_id = %self.record.owner_id, id = %self.record.id))]
    pub async fn save(&mut self, store: &dyn FragmentStore) -> Result<(), FragmentError> {
        self.record.updated = Utc::now();
        store
            .write_metadata(&self.record.owner_id, &self.record.id, &self.record)
            .await?;
        Ok(())
    }

    /// Read the fragment's stored bytes.
    #[instrument(skip_all, fields(owner_id = %self.record.owner_id, id = %self.record.id))]
    pub async fn get_data(&self, store: &dyn FragmentStore) -> Result<Vec<u8>, FragmentError> {
        store
            .read_data(&self.record.owner_id, &self.record.id)
            .await?
            .ok_or_else(|| FragmentError::not_found(&self.record.owner_id, &self.record.id))
    }

    /// Replace the fragment's data, then persist metadata describing it.
    ///
    /// The data write completes before the metadata write starts, so stored
    /// metadata never claims more bytes than were written. If the data write
    /// fails, neither the store nor `self` changes. If the metadata write fails
    /// afterwards, [`FragmentError::InconsistentWrite`] is returned: the new bytes
    /// are stored while the old metadata remains, and calling `save` again
    /// reconciles them.
    #[instrument(skip_all, fields(owner_id = %self.record.owner_id, id = %self.record.id, size = data.len()))]
    pub async fn set_data(
        &mut self,
        store: &dyn FragmentStore,
        data: &[u8],
    ) -> Result<(), FragmentError> {
        store
            .write_data(&self.record.owner_id, &self.record.id, data)
            .await?;

        self.record.size = data.len() as u64;
        self.record.updated = Utc::now();

        if let Err(source) = store
            .write_metadata(&self.record.owner_id, &self.record.id, &self.record)
            .await
        {
            warn!(error = %source, "Fragment data written without matching metadata");
            return Err(FragmentError::InconsistentWrite {
                owner_id: self.record.owner_id.clone(),
                id: self.record.id.clone(),
                source,
            });
        }
        Ok(())
    }

    /// Replace data on behalf of a caller that states the payload's type.
    ///
    /// A fragment's type is fixed, so a `content_type` whose essence differs
    /// from the fragment's is rejected before anything is written.
    pub async fn update_data(
        &mut self,
        store: &dyn FragmentStore,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), FragmentError> {
        let requested = formats::essence(content_type).ok_or_else(|| {
            FragmentError::Validation(format!("type is not a valid MIME type: {content_type}"))
        })?;
        if requested != self.mime_type {
            return Err(FragmentError::Validation(format!(
                "a fragment's type cannot change after it is created ({} -> {requested})",
                self.mime_type
            )));
        }
        self.set_data(store, data).await
    }

    /// Check that the stored data length matches the recorded `size`.
    #[instrument(skip_all, fields(owner_id = %self.record.owner_id, id = %self.record.id))]
    pub async fn verify(&self, store: &dyn FragmentStore) -> Result<(), FragmentError> {
        let actual = self.get_data(store).await?.len() as u64;
        if actual != self.record.size {
            return Err(FragmentError::SizeMismatch {
                owner_id: self.record.owner_id.clone(),
                id: self.record.id.clone(),
                expected: self.record.size,
                actual,
            });
        }
        Ok(())
    }
}
