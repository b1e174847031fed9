pub mod error;
pub mod labels;

pub use error::StoreError;
pub use labels::{LabelStore, BLOB_FILE_NAME};
