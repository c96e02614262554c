mod bucket;
mod heal;
mod quorum;
mod utils;

pub use heal::*;
pub use quorum::*;
pub use utils::*;

use crate::config::{storageclass, KVS};
use crate::storage::StorageDisk;
use crate::xl_storage::XlStorage;

/// An erasure set: the ordered disk slots and the quorum shared by every
/// operation over them.
pub struct ErasureObjects {
    storage_disks: Vec<Option<StorageDisk>>,
    quorum: Quorum,
}

impl ErasureObjects {
    /// Takes ownership of the slots, then heals the format and the buckets
    /// before the set is handed out.
    pub async fn new(storage_disks: Vec<Option<StorageDisk>>, quorum: Quorum) -> anyhow::Result<Self> {
        heal_format_erasure_with_quorum(&storage_disks, quorum).await?;
        quick_heal(&storage_disks, quorum).await?;
        Ok(ErasureObjects {
            storage_disks,
            quorum,
        })
    }

    /// Opens a local disk per path, with parity from the storage class
    /// configuration.
    pub async fn from_paths(paths: &[&str], kvs: &KVS) -> anyhow::Result<Self> {
        let config = storageclass::lookup_config(kvs, paths.len())?;
        let quorum = Quorum::from_config(paths.len(), &config)?;
        let mut storage_disks = Vec::with_capacity(paths.len());
        for path in paths {
            let disk: StorageDisk = std::sync::Arc::new(XlStorage::new(path)?);
            storage_disks.push(Some(disk));
        }
        Self::new(storage_disks, quorum).await
    }

    pub fn storage_disks(&self) -> &[Option<StorageDisk>] {
        &self.storage_disks
    }

    /// Slots may be swapped out, never added or removed.
    pub fn storage_disk_mut(&mut self, slot: usize) -> Option<&mut Option<StorageDisk>> {
        self.storage_disks.get_mut(slot)
    }

    pub fn quorum(&self) -> Quorum {
        self.quorum
    }

    pub async fn heal_format(&self) -> anyhow::Result<()> {
        heal_format_erasure_with_quorum(&self.storage_disks, self.quorum).await
    }

    pub async fn quick_heal(&self) -> anyhow::Result<()> {
        quick_heal(&self.storage_disks, self.quorum).await
    }
}
