use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FragmentError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fragment not found: {owner_id}/{id}")]
    NotFound { owner_id: String, id: String },

    /// A requested extension that maps to no known MIME type.
    #[error("Unknown extension: .{0}")]
    UnknownExtension(String),

    #[error("Fragment {owner_id}/{id} records {expected} bytes but stores {actual}")]
    SizeMismatch {
        owner_id: String,
        id: String,
        expected: u64,
        actual: u64,
    },

    /// New data reached the store but the metadata describing it did not, so the
    /// stored `size` may no longer match the stored bytes until a retry succeeds.
    #[error("Data for {owner_id}/{id} was written but its metadata was not: {source}")]
    InconsistentWrite {
        owner_id: String,
        id: String,
        source: StorageError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FragmentError {
    pub(crate) fn not_found(owner_id: &str, id: &str) -> Self {
        Self::NotFound {
            owner_id: owner_id.to_string(),
            id: id.to_string(),
        }
    }

    /// Returns true for errors that describe a missing fragment.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
