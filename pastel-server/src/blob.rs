//! Blob store for public assets (PIX QR code images)

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opaque object storage: `put(path, bytes)` then serve it under a public URL
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store (or overwrite) `bytes` at `path`
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError>;

    /// Read a blob; `None` when absent
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Public URL of `path`
    fn public_url(&self, path: &str) -> String;
}

/// Blob store on the local filesystem
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve `path` under the root, rejecting absolute paths and `..`
    fn resolve(&self, path: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), BlobError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let target = self.resolve(path)?;
        match tokio::fs::read(&target).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/assets/");

        store.put("qr-codes/a.png", b"png-bytes").await.unwrap();
        assert_eq!(store.get("qr-codes/a.png").await.unwrap().unwrap(), b"png-bytes");
        assert!(store.get("qr-codes/missing.png").await.unwrap().is_none());
        assert_eq!(
            store.public_url("qr-codes/a.png"),
            "http://localhost:3000/assets/qr-codes/a.png"
        );
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://x");
        for bad in ["../etc/passwd", "/abs.png", "a/../../b", ""] {
            assert!(matches!(
                store.put(bad, b"x").await,
                Err(BlobError::InvalidPath(_))
            ));
        }
    }
}
