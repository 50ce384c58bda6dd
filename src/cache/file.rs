use crate::errors::CacheError;
use crate::models::Snapshot;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A single snapshot file on local disk, overwritten wholesale on every store.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no artifact exists yet.
    pub async fn load(&self) -> Result<Option<Snapshot>, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(e)),
        };

        let snapshot = serde_json::from_slice(&bytes).map_err(CacheError::Decode)?;
        Ok(Some(snapshot))
    }

    /// Each write goes to its own temp file beside the target, which is then
    /// renamed over it. A concurrent reader sees either the old snapshot or a
    /// complete new one. Last writer wins.
    pub async fn store(&self, snapshot: &Snapshot) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(snapshot).map_err(CacheError::Encode)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&dir).await?;

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)??;

        Ok(())
    }
}
