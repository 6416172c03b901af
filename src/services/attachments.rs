// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Attachment storage.
//!
//! Files are written to a [`Disk`] under a fixed folder with a random name.
//! Records keep only the [`Attachment`] metadata; the public URL is derived
//! from the disk's base URL without touching the file.

use crate::error::AppError;
use crate::models::Attachment;
use crate::validation::UploadedFile;
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Folder that profile pictures are stored under.
pub const AVATARS_FOLDER: &str = "avatars";

/// A file storage backend.
#[async_trait]
pub trait Disk: Send + Sync {
    /// Write `bytes` at `path`, replacing any existing file.
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), AppError>;

    async fn exists(&self, path: &str) -> Result<bool, AppError>;

    /// Remove the file at `path`. Missing files are not an error.
    async fn delete(&self, path: &str) -> Result<(), AppError>;

    /// Public URL of `path`. Does not check that the file exists.
    fn url(&self, path: &str) -> String;

    /// Cheap readiness probe for health reporting.
    async fn check(&self) -> Result<String, String>;
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Disk backed by a local directory.
pub struct LocalDisk {
    root: PathBuf,
    public_url: String,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` below the root, rejecting anything that could escape it.
    fn resolve(&self, path: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(AppError::Storage(format!("Invalid storage path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Disk for LocalDisk {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {:?}: {}", target, e)))
    }

    async fn exists(&self, path: &str) -> Result<bool, AppError> {
        let target = self.resolve(path)?;
        tokio::fs::try_exists(&target)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat {:?}: {}", target, e)))
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to delete {:?}: {}",
                target, e
            ))),
        }
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.public_url, path)
    }

    async fn check(&self) -> Result<String, String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| format!("Storage root {:?} unavailable: {}", self.root, e))?;
        Ok(format!("Local disk at {:?} is ready", self.root))
    }
}

/// In-memory disk for tests.
#[derive(Default)]
pub struct FakeDisk {
    files: DashMap<String, Vec<u8>>,
    public_url: String,
}

impl FakeDisk {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            files: DashMap::new(),
            public_url: public_url.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn read(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl Disk for FakeDisk {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<(), AppError> {
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, AppError> {
        Ok(self.files.contains_key(path))
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        self.files.remove(path);
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.public_url, path)
    }

    async fn check(&self) -> Result<String, String> {
        Ok(format!("In-memory disk holding {} file(s)", self.files.len()))
    }
}

/// Stores uploads on a disk under a fixed folder.
#[derive(Clone)]
pub struct AttachmentService {
    disk: Arc<dyn Disk>,
    folder: &'static str,
}

impl AttachmentService {
    pub fn new(disk: Arc<dyn Disk>, folder: &'static str) -> Self {
        Self { disk, folder }
    }

    pub fn disk(&self) -> &Arc<dyn Disk> {
        &self.disk
    }

    /// Storage path of an attachment, relative to the disk root.
    pub fn path_of(&self, attachment: &Attachment) -> String {
        format!("{}/{}", self.folder, attachment.name)
    }

    /// Write an upload to the disk under a random name.
    pub async fn store(&self, file: &UploadedFile) -> Result<Attachment, AppError> {
        let extname = file.extname();
        let name = if extname.is_empty() {
            uuid::Uuid::new_v4().simple().to_string()
        } else {
            format!("{}.{}", uuid::Uuid::new_v4().simple(), extname)
        };

        let attachment = Attachment {
            name,
            original_name: file.client_name.clone(),
            extname,
            size: file.size(),
            mime_type: file.content_type.clone(),
            url: None,
        };

        let path = self.path_of(&attachment);
        self.disk.put(&path, &file.bytes).await?;
        tracing::debug!(path = %path, size = attachment.size, "Stored attachment");

        Ok(attachment)
    }

    /// Remove an attachment's file. Failures are logged, not returned.
    pub async fn remove(&self, attachment: &Attachment) {
        let path = self.path_of(attachment);
        if let Err(e) = self.disk.delete(&path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove attachment");
        }
    }

    /// Fill in the public URL.
    pub fn compute_url(&self, attachment: &mut Attachment) {
        attachment.url = Some(self.disk.url(&self.path_of(attachment)));
    }
}
