use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::error::StorageError;
use super::key::OwnerKey;
use super::record::FragmentRecord;
use super::traits::FragmentStore;

const METADATA_EXT: &str = "json";
const DATA_EXT: &str = "data";
const MAX_ID_LEN: usize = 128;

/// Filesystem-backed fragment store.
///
/// Each owner's fragments live in a sharded directory named after the owner key:
/// `{base_path}/{first 2 hex chars}/{remaining 62 hex chars}/{id}.json` for
/// metadata and `.../{id}.data` for the payload.
pub struct FilesystemStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemStore {
    /// Create a new filesystem store rooted at `base_path`.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    fn owner_dir(&self, owner_id: &str) -> Result<PathBuf, StorageError> {
        if owner_id.is_empty() {
            return Err(StorageError::InvalidKey("owner id is empty".into()));
        }
        let key = OwnerKey::compute(owner_id);
        Ok(self
            .base_path
            .join(key.shard_prefix())
            .join(key.shard_suffix()))
    }

    fn fragment_path(&self, owner_id: &str, id: &str, ext: &str) -> Result<PathBuf, StorageError> {
        validate_id(id)?;
        Ok(self.owner_dir(owner_id)?.join(format!("{id}.{ext}")))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Write through a temp file and rename, so readers never see a torn file.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

/// Fragment ids become file names, so only a conservative character set is allowed.
fn validate_id(id: &str) -> Result<(), StorageError> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(StorageError::InvalidKey(format!(
            "fragment id must be 1-{MAX_ID_LEN} characters, got {}",
            id.len()
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StorageError::InvalidKey(format!(
            "fragment id contains unsupported characters: {id}"
        )));
    }
    Ok(())
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StorageError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_optional(path: &Path) -> Result<bool, StorageError> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl FragmentStore for FilesystemStore {
    async fn write_metadata(
        &self,
        owner_id: &str,
        id: &str,
        record: &FragmentRecord,
    ) -> Result<(), StorageError> {
        record.check_key(owner_id, id)?;
        let path = self.fragment_path(owner_id, id, METADATA_EXT)?;
        let json = serde_json::to_vec(record)?;
        self.write_atomic(&path, &json).await
    }

    async fn read_metadata(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<Option<FragmentRecord>, StorageError> {
        let path = self.fragment_path(owner_id, id, METADATA_EXT)?;
        match read_optional(&path).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_data(&self, owner_id: &str, id: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }
        let path = self.fragment_path(owner_id, id, DATA_EXT)?;
        self.write_atomic(&path, data).await
    }

    async fn read_data(&self, owner_id: &str, id: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.fragment_path(owner_id, id, DATA_EXT)?;
        read_optional(&path).await
    }

    async fn list_ids(&self, owner_id: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.owner_dir(owner_id)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(METADATA_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn delete(&self, owner_id: &str, id: &str) -> Result<(), StorageError> {
        // Metadata goes first: a fragment whose data removal fails is no longer
        // listed or readable, rather than listed with missing data.
        let metadata_path = self.fragment_path(owner_id, id, METADATA_EXT)?;
        let data_path = self.fragment_path(owner_id, id, DATA_EXT)?;
        let had_metadata = remove_optional(&metadata_path).await?;
        let had_data = remove_optional(&data_path).await?;

        if had_metadata || had_data {
            Ok(())
        } else {
            Err(StorageError::NotFound(format!("{owner_id}/{id}")))
        }
    }
}
