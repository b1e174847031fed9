//! Labeled dish photos persisted as one JSON blob.
//!
//! Every write replaces the whole file: the list is read, extended, and
//! written to a sibling temp file that is then renamed over the blob.
//! Writers inside this process are serialized by a mutex.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bestdish_core::LabeledImage;
use tokio::sync::Mutex;

use crate::error::StoreError;

pub const BLOB_FILE_NAME: &str = "labeledImages.json";

#[derive(Debug)]
pub struct LabelStore {
    dir: PathBuf,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LabelStore {
    /// Opens a store rooted at `dir`. Nothing touches the disk until the
    /// first load or append.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(BLOB_FILE_NAME);
        Self {
            dir,
            path,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored record, oldest first. A missing blob is an empty
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the blob cannot be read and
    /// [`StoreError::Corrupt`] if it does not decode.
    pub async fn load(&self) -> Result<Vec<LabeledImage>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "label store not found, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(io_error(&self.path, source)),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Appends `image` and persists the whole list. Returns the new count.
    ///
    /// # Errors
    ///
    /// Fails if the existing blob cannot be loaded or the new one cannot be
    /// written. A corrupt blob is never overwritten.
    pub async fn append(&self, image: LabeledImage) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut images = self.load().await?;
        let id = image.id;
        images.push(image);
        self.write_all(&images).await?;

        tracing::info!(%id, total = images.len(), "labeled image saved");
        Ok(images.len())
    }

    async fn write_all(&self, images: &[LabeledImage]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(images).map_err(StoreError::Serialize)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| io_error(&self.dir, source))?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))?;
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}
