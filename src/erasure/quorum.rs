use anyhow::ensure;

use crate::config::storageclass;

/// Read and write quorum of an erasure set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quorum {
    pub read: usize,
    pub write: usize,
}

impl Quorum {
    /// Derives both quorums from the set size and its parity count.
    pub fn new(drive_count: usize, parity: usize) -> anyhow::Result<Self> {
        ensure!(drive_count > 0, "erasure set must have at least one disk");
        ensure!(
            parity <= drive_count / 2,
            "parity {} exceeds half of {} disks",
            parity,
            drive_count
        );
        let data = drive_count - parity;
        // With as many data as parity disks two disjoint halves could both
        // reach `data`, one more disk breaks the tie.
        let write = if data == parity { data + 1 } else { data };
        Ok(Quorum { read: data, write })
    }

    pub fn default_for(drive_count: usize) -> anyhow::Result<Self> {
        Self::new(drive_count, storageclass::default_parity_count(drive_count))
    }

    pub fn from_config(drive_count: usize, config: &storageclass::Config) -> anyhow::Result<Self> {
        Self::new(drive_count, config.standard.parity)
    }
}
