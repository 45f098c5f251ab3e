use std::fmt;

/// Errors that can occur during fragment storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// No metadata or data exists for the given `owner/id` key.
    NotFound(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// A stored metadata record could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// The owner or fragment id cannot be used as a storage key.
    InvalidKey(String),
    /// The payload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
    /// The backend rejected the operation for a reason of its own.
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(key) => write!(f, "fragment not found in store: {key}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::Serialization(err) => write!(f, "invalid metadata record: {err}"),
            Self::InvalidKey(msg) => write!(f, "invalid storage key: {msg}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "fragment exceeds size limit ({actual} > {limit} bytes)")
            }
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}
