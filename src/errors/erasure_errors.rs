use thiserror::Error;

use super::StorageError;

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErasureError {
    #[error("Read failed. Insufficient number of disks online")]
    ReadQuorum,

    #[error("Write failed. Insufficient number of disks online")]
    WriteQuorum,

    // Formatted disks are below read quorum while the rest are a mix of
    // offline and unformatted disks. Reported together so an operator can
    // tell waiting for disks apart from formatting them.
    #[error(
        "Unable to initialize format {} and {}",
        StorageError::SomeDiskOffline,
        StorageError::SomeDiskUnformatted
    )]
    OfflineAndUnformatted,

    #[error("format.json on disk {0} does not belong to this erasure set")]
    InconsistentFormat(usize),
}
