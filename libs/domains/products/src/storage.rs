//! Where uploaded product images live.

use async_trait::async_trait;
use axum::body::Bytes;
use core_config::{ConfigError, FromEnv, env_or_default};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::form::ImageUpload;

/// Prefix of every stored path, relative to the public directory
pub const PUBLIC_PREFIX: &str = "images";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported image extension: {0}")]
    UnsupportedExtension(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist the upload and return its public path (`images/{file}`).
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError>;

    /// Remove a file previously returned by [`store`](Self::store). Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;
}

/// `{uuid}.{ext}` under a fixed file name policy; rejects disallowed extensions.
fn file_name_for(upload: &ImageUpload) -> Result<String, StorageError> {
    if !upload.has_allowed_extension() {
        return Err(StorageError::UnsupportedExtension(
            upload.extension().unwrap_or_default(),
        ));
    }
    let ext = upload.extension().unwrap_or_default();
    Ok(format!("{}.{}", Uuid::now_v7(), ext))
}

/// Last path component of a stored path; anything that tries to leave the directory yields `None`.
fn stored_file_name(path: &str) -> Option<&str> {
    Path::new(path).file_name().and_then(|name| name.to_str())
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub image_dir: PathBuf,
}

impl FromEnv for StorageConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            image_dir: PathBuf::from(env_or_default("IMAGE_STORAGE_DIR", "public/images")),
        })
    }
}

/// Files on the local disk via `tokio::fs`.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    root: PathBuf,
}

impl LocalImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.image_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError> {
        let file_name = file_name_for(upload)?;

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&file_name), &upload.bytes).await?;

        tracing::debug!(file = %file_name, bytes = upload.bytes.len(), "Stored image");
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let Some(file_name) = stored_file_name(path) else {
            return Ok(());
        };

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => {
                tracing::debug!(file = %file_name, "Deleted image");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryImageStorage {
    files: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.files.read().await.contains_key(path)
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<String, StorageError> {
        let path = format!("{}/{}", PUBLIC_PREFIX, file_name_for(upload)?);
        self.files
            .write()
            .await
            .insert(path.clone(), upload.bytes.clone());
        Ok(path)
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.files.write().await.remove(path);
        Ok(())
    }
}
