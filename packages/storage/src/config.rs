use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use super::error::StorageError;
use super::filesystem::FilesystemStore;
use super::memory::MemoryStore;
use super::traits::FragmentStore;

/// Which backend holds fragment metadata and data.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local maps; contents are lost on exit.
    Memory,
    #[default]
    Filesystem,
}

/// App-level storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    /// Backend to open. Default: filesystem.
    #[serde(default)]
    pub backend: BackendKind,
    /// Root directory for the filesystem backend. Default: "./data/fragments".
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Largest payload the filesystem backend accepts, in bytes. Default: 5 MiB.
    #[serde(default = "default_max_fragment_size")]
    pub max_fragment_size: u64,
}

fn default_storage_path() -> PathBuf {
    "./data/fragments".into()
}
fn default_max_fragment_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_storage_path(),
            max_fragment_size: default_max_fragment_size(),
        }
    }
}

impl StorageAppConfig {
    /// Open the configured backend.
    pub async fn open(&self) -> Result<Arc<dyn FragmentStore>, StorageError> {
        match self.backend {
            BackendKind::Memory => {
                info!("Using in-memory fragment store");
                Ok(Arc::new(MemoryStore::new()))
            }
            BackendKind::Filesystem => {
                info!(
                    path = %self.path.display(),
                    max_fragment_size = self.max_fragment_size,
                    "Using filesystem fragment store"
                );
                let store = FilesystemStore::new(self.path.clone(), self.max_fragment_size).await?;
                Ok(Arc::new(store))
            }
        }
    }
}
