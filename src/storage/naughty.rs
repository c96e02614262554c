use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::errors::StorageError;

/// Fault-injecting disk wrapper used by tests.
///
/// Every call increments a counter; when `call_errs` has an entry for the
/// current call number that error is returned, otherwise `default_err` (if
/// any), otherwise the call goes through to the wrapped disk.
pub struct NaughtyDisk {
    disk: StorageDisk,
    call_errs: HashMap<usize, StorageError>,
    default_err: Option<StorageError>,
    call_nr: AtomicUsize,
}

impl NaughtyDisk {
    pub fn new(
        disk: StorageDisk,
        call_errs: HashMap<usize, StorageError>,
        default_err: Option<StorageError>,
    ) -> Self {
        NaughtyDisk {
            disk,
            call_errs,
            default_err,
            call_nr: AtomicUsize::new(0),
        }
    }

    /// A wrapper failing every call with `err`.
    pub fn failing(disk: StorageDisk, err: StorageError) -> StorageDisk {
        Arc::new(Self::new(disk, HashMap::new(), Some(err)))
    }

    fn calc_error(&self) -> anyhow::Result<()> {
        let call_nr = self.call_nr.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(err) = self.call_errs.get(&call_nr) {
            return Err(err.clone().into());
        }
        if let Some(err) = &self.default_err {
            return Err(err.clone().into());
        }
        Ok(())
    }
}

impl fmt::Display for NaughtyDisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.disk)
    }
}

#[async_trait]
impl StorageApi for NaughtyDisk {
    async fn make_volume(&self, volume: &str) -> anyhow::Result<()> {
        self.calc_error()?;
        self.disk.make_volume(volume).await
    }

    async fn list_volumes(&self) -> anyhow::Result<Vec<VolInfo>> {
        self.calc_error()?;
        self.disk.list_volumes().await
    }

    async fn stat_volume(&self, volume: &str) -> anyhow::Result<VolInfo> {
        self.calc_error()?;
        self.disk.stat_volume(volume).await
    }

    async fn delete_volume(&self, volume: &str, force_delete: bool) -> anyhow::Result<()> {
        self.calc_error()?;
        self.disk.delete_volume(volume, force_delete).await
    }

    async fn read_all(&self, volume: &str, path: &str) -> anyhow::Result<Vec<u8>> {
        self.calc_error()?;
        self.disk.read_all(volume, path).await
    }

    async fn write_all(&self, volume: &str, path: &str, data: &[u8]) -> anyhow::Result<()> {
        self.calc_error()?;
        self.disk.write_all(volume, path, data).await
    }

    async fn append_file(&self, volume: &str, path: &str, buf: &[u8]) -> anyhow::Result<()> {
        self.calc_error()?;
        self.disk.append_file(volume, path, buf).await
    }

    async fn delete(&self, volume: &str, path: &str, recursive: bool) -> anyhow::Result<()> {
        self.calc_error()?;
        self.disk.delete(volume, path, recursive).await
    }
}
