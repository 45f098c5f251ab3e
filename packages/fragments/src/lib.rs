//! Owner-scoped fragments: validated metadata, data persistence through an
//! injected [`FragmentStore`], and content negotiation between supported types.

pub mod convert;
pub mod error;
pub mod formats;
pub mod fragment;
pub mod registry;

pub use convert::{Conversion, FragmentRequest};
pub use error::FragmentError;
pub use formats::{Rendering, is_supported_type};
pub use fragment::{Fragment, NewFragment};
pub use registry::Listing;

pub use storage::{FragmentRecord, FragmentStore, StorageError};
