mod datatypes;
#[cfg(test)]
mod naughty;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
pub use datatypes::*;
#[cfg(test)]
pub use naughty::*;

/// Operations a single disk of the erasure set offers to the layers above.
///
/// Errors are reported as `anyhow::Error`s carrying a
/// [`StorageError`](crate::errors::StorageError) whenever the failure has a
/// storage meaning (missing volume, missing file, faulty disk, ...).
#[async_trait]
pub trait StorageApi: fmt::Display + Send + Sync {
    async fn make_volume(&self, volume: &str) -> anyhow::Result<()>;

    async fn list_volumes(&self) -> anyhow::Result<Vec<VolInfo>>;

    async fn stat_volume(&self, volume: &str) -> anyhow::Result<VolInfo>;

    async fn delete_volume(&self, volume: &str, force_delete: bool) -> anyhow::Result<()>;

    async fn read_all(&self, volume: &str, path: &str) -> anyhow::Result<Vec<u8>>;

    /// Replaces the whole content of `path` with `data`.
    async fn write_all(&self, volume: &str, path: &str, data: &[u8]) -> anyhow::Result<()>;

    async fn append_file(&self, volume: &str, path: &str, buf: &[u8]) -> anyhow::Result<()>;

    async fn delete(&self, volume: &str, path: &str, recursive: bool) -> anyhow::Result<()>;
}

/// Shared handle to a disk; a slot of the erasure set holds an
/// `Option<StorageDisk>`, `None` meaning the disk is offline.
pub type StorageDisk = Arc<dyn StorageApi>;
