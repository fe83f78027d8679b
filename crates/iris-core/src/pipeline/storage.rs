//! Storage access for candidate paths.
//!
//! The pipeline only needs an existence check and a full read. Both may be
//! slow (network mounts, remote sandboxes), so they are async.

use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Whether `path` refers to an existing file.
    async fn exists(&self, path: &str) -> bool;

    /// Read the whole file.
    async fn read_all_bytes(&self, path: &str) -> std::io::Result<Vec<u8>>;
}

/// Local filesystem storage with `~` expansion and an optional base directory
/// for relative paths.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    root: Option<PathBuf>,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root` instead of the process cwd.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
        match &self.root {
            Some(root) if expanded.is_relative() => root.join(expanded),
            _ => expanded,
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> bool {
        match tokio::fs::metadata(self.resolve(path)).await {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    async fn read_all_bytes(&self, path: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(path)).await
    }
}
