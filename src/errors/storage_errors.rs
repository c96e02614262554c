use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum StorageError {
    #[error("unexpected error, please report this issue")]
    Unexpected,

    #[error("corrupted backend format, specified disk mount has unexpected previous content")]
    CorruptedFormat,

    #[error("unformatted disk found")]
    UnformattedDisk,

    #[error("disk path full")]
    DiskFull,

    #[error("disk is not directory or mountpoint")]
    DiskNotDir,

    #[error("disk not found")]
    DiskNotFound,

    #[error("remote disk is faulty")]
    FaultyRemoteDisk,

    #[error("disk is faulty")]
    FaultyDisk,

    #[error("disk access denied")]
    DiskAccessDenied,

    #[error("some disks are offline")]
    SomeDiskOffline,

    #[error("some disks are found to be unformatted")]
    SomeDiskUnformatted,

    #[error("file not found")]
    FileNotFound,

    #[error("too many open files, please increase 'ulimit -n'")]
    TooManyOpenFiles,

    #[error("file name too long")]
    FileNameTooLong,

    #[error("volume already exists")]
    VolumeExists,

    #[error("not of regular file type")]
    IsNotRegular,

    #[error("volume not found")]
    VolumeNotFound,

    #[error("volume is not empty")]
    VolumeNotEmpty,

    #[error("volume access denied")]
    VolumeAccessDenied,

    #[error("file access denied")]
    FileAccessDenied,

    #[error("invalid arguments specified")]
    InvalidArgument,
}

// Errors meaning the disk itself is gone or unusable, rather than
// anything about the requested volume or file.
pub const BASE_STORAGE_ERRORS: [StorageError; 3] = [
    StorageError::DiskNotFound,
    StorageError::FaultyDisk,
    StorageError::FaultyRemoteDisk,
];
