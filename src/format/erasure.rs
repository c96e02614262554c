use anyhow::ensure;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::*;
use crate::errors::{AsError, StorageError};
use crate::globals::{FORMAT_CONFIG_FILE, SYSTEM_META_BUCKET};
use crate::storage::StorageApi;

// Represents Erasure backend.
pub const FORMAT_BACKEND_ERASURE: &str = "xl";

// formatErasureV3.Erasure.Version - version '3'.
pub const FORMAT_ERASURE_VERSION_V3: &str = "3";

// Distributed algorithm used, with EC:4 default parity
pub const FORMAT_ERASURE_VERSION_V3DISTRIBUTION_ALGO_V3: &str = "SIPMOD+PARITY";

/// The per-disk identity record, stored as `format.json` in the system meta
/// bucket of every disk.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FormatErasureV3 {
    #[serde(flatten)]
    pub meta: FormatMetaV1,
    #[serde(rename = "xl")]
    pub erasure: ErasureV3,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErasureV3 {
    pub version: String,
    // Identity of the disk holding this record.
    pub this: Uuid,
    // Identities of every disk of the set, in slot order.
    pub sets: Vec<Vec<Uuid>>,
    #[serde(rename = "distributionAlgo")]
    pub distribution_algo: String,
}

impl FormatErasureV3 {
    /// Creates a reference format for a fresh erasure set of `drive_count`
    /// disks. `this` is left nil; use `for_disk` to derive each disk's copy.
    pub fn new(drive_count: usize) -> Self {
        FormatErasureV3 {
            meta: FormatMetaV1 {
                version: FORMAT_META_VERSION_V1.to_owned(),
                format: FORMAT_BACKEND_ERASURE.to_owned(),
                id: Uuid::new_v4(),
            },
            erasure: ErasureV3 {
                version: FORMAT_ERASURE_VERSION_V3.to_owned(),
                this: Uuid::nil(),
                sets: vec![(0..drive_count).map(|_| Uuid::new_v4()).collect()],
                distribution_algo: FORMAT_ERASURE_VERSION_V3DISTRIBUTION_ALGO_V3.to_owned(),
            },
        }
    }

    /// Ordered identities of all sibling disks.
    pub fn drives(&self) -> impl Iterator<Item = &Uuid> {
        self.erasure.sets.iter().flatten()
    }

    pub fn drive_count(&self) -> usize {
        self.erasure.sets.iter().map(|set| set.len()).sum()
    }

    /// Slot position of this disk within the set.
    pub fn disk_index(&self) -> Option<usize> {
        self.drives().position(|id| *id == self.erasure.this)
    }

    /// The copy of this format that belongs on slot `index`.
    pub fn for_disk(&self, index: usize) -> Option<FormatErasureV3> {
        let this = *self.drives().nth(index)?;
        let mut format = self.clone();
        format.erasure.this = this;
        Some(format)
    }

    /// Reports whether both records describe the same set, in the same order.
    pub fn same_set(&self, other: &FormatErasureV3) -> bool {
        self.meta.id == other.meta.id && self.erasure.sets == other.erasure.sets
    }

    pub fn from_json(data: &[u8]) -> anyhow::Result<Self> {
        let format: FormatErasureV3 = serde_json::from_slice(data)?;
        format.check()?;
        Ok(format)
    }

    pub fn to_json(&self) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn check(&self) -> anyhow::Result<()> {
        ensure!(
            self.meta.version == FORMAT_META_VERSION_V1,
            StorageError::CorruptedFormat
        );
        ensure!(
            self.meta.format == FORMAT_BACKEND_ERASURE,
            StorageError::CorruptedFormat
        );
        ensure!(
            self.erasure.version == FORMAT_ERASURE_VERSION_V3,
            StorageError::CorruptedFormat
        );
        ensure!(self.drive_count() > 0, StorageError::CorruptedFormat);
        ensure!(self.disk_index().is_some(), StorageError::CorruptedFormat);
        Ok(())
    }
}

/// State of one disk slot, derived fresh on every healing pass.
#[derive(Debug)]
pub enum DiskState {
    // No disk in the slot, or the disk reports itself gone.
    Offline,
    // Reachable, but carries no format.json.
    Unformatted,
    // Reading format.json failed for any other reason.
    Faulty(anyhow::Error),
    // format.json exists but cannot be decoded or validated.
    Corrupt(anyhow::Error),
    Formatted(FormatErasureV3),
}

/// Reads and classifies the format record of a single slot.
pub async fn load_format_erasure(disk: Option<&dyn StorageApi>) -> DiskState {
    let disk = match disk {
        Some(disk) => disk,
        None => return DiskState::Offline,
    };
    let data = match disk.read_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE).await {
        Ok(data) => data,
        Err(err) => {
            return match err.as_error::<StorageError>() {
                Some(StorageError::DiskNotFound) => DiskState::Offline,
                Some(StorageError::FileNotFound)
                | Some(StorageError::VolumeNotFound)
                | Some(StorageError::UnformattedDisk) => DiskState::Unformatted,
                _ => {
                    warn!("reading format.json from {} failed: {}", disk, err);
                    DiskState::Faulty(err)
                }
            };
        }
    };
    match FormatErasureV3::from_json(&data) {
        Ok(format) => DiskState::Formatted(format),
        Err(err) => {
            warn!("format.json on {} is corrupted: {}", disk, err);
            DiskState::Corrupt(err)
        }
    }
}

/// Persists `format` on `disk`, creating the meta bucket when missing.
pub async fn save_format_erasure(disk: &dyn StorageApi, format: &FormatErasureV3) -> anyhow::Result<()> {
    let data = format.to_json()?;
    if let Err(err) = disk.make_volume(SYSTEM_META_BUCKET).await {
        if !err.is_storage_err(&StorageError::VolumeExists) {
            return Err(err);
        }
    }
    disk.write_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE, &data)
        .await?;
    debug!("saved format.json on {} as {}", disk, format.erasure.this);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_disk_copies() {
        let format = FormatErasureV3::new(4);
        assert_eq!(format.drive_count(), 4);
        assert_eq!(format.disk_index(), None);
        for i in 0..4 {
            let disk_format = format.for_disk(i).unwrap();
            assert_eq!(disk_format.disk_index(), Some(i));
            assert!(disk_format.same_set(&format));
        }
        assert!(format.for_disk(4).is_none());
        assert!(!format.same_set(&FormatErasureV3::new(4)));
    }

    #[test]
    fn test_format_json() {
        let format = FormatErasureV3::new(4).for_disk(2).unwrap();
        let data = format.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(value["version"], "1");
        assert_eq!(value["format"], "xl");
        assert_eq!(value["xl"]["version"], "3");
        assert_eq!(value["xl"]["distributionAlgo"], "SIPMOD+PARITY");
        assert_eq!(value["xl"]["sets"][0].as_array().unwrap().len(), 4);
        assert_eq!(FormatErasureV3::from_json(&data).unwrap(), format);
    }

    #[test]
    fn test_format_json_invalid() {
        let valid = FormatErasureV3::new(4).for_disk(0).unwrap();

        let err = FormatErasureV3::from_json(b"corrupted data").unwrap_err();
        assert!(err.as_error::<serde_json::Error>().is_some());

        let mut data = valid.to_json().unwrap();
        data.extend_from_slice(b"corrupted data");
        let err = FormatErasureV3::from_json(&data).unwrap_err();
        assert!(err.as_error::<serde_json::Error>().is_some());

        let mut wrong_backend = valid.clone();
        wrong_backend.meta.format = "fs".to_owned();
        let err = FormatErasureV3::from_json(&wrong_backend.to_json().unwrap()).unwrap_err();
        assert!(err.is_storage_err(&StorageError::CorruptedFormat));

        // A disk missing from its own sibling list.
        let mut stray = valid;
        stray.erasure.this = Uuid::new_v4();
        let err = FormatErasureV3::from_json(&stray.to_json().unwrap()).unwrap_err();
        assert!(err.is_storage_err(&StorageError::CorruptedFormat));
    }
}
