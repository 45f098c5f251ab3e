mod error;
mod key;
mod record;
mod traits;

pub mod config;
pub mod filesystem;
pub mod memory;

pub use config::{BackendKind, StorageAppConfig};
pub use error::StorageError;
pub use filesystem::FilesystemStore;
pub use key::OwnerKey;
pub use memory::MemoryStore;
pub use record::FragmentRecord;
pub use traits::FragmentStore;
