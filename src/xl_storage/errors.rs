use std::io;

use crate::errors::StorageError;

pub fn err_no_space(err: &io::Error) -> bool {
    is_libc_err(err, libc::ENOSPC)
}

pub fn err_io(err: &io::Error) -> bool {
    is_libc_err(err, libc::EIO)
}

pub fn err_is_dir(err: &io::Error) -> bool {
    is_libc_err(err, libc::EISDIR)
}

pub fn err_not_dir(err: &io::Error) -> bool {
    is_libc_err(err, libc::ENOTDIR)
}

pub fn err_too_long(err: &io::Error) -> bool {
    is_libc_err(err, libc::ENAMETOOLONG)
}

pub fn err_dir_not_empty(err: &io::Error) -> bool {
    is_libc_err(err, libc::ENOTEMPTY) || is_libc_err(err, libc::EEXIST)
}

pub fn err_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

pub fn err_too_many_files(err: &io::Error) -> bool {
    is_libc_err(err, libc::ENFILE) || is_libc_err(err, libc::EMFILE)
}

pub fn err_permission(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

pub fn err_already_exists(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::AlreadyExists
}

fn is_libc_err(err: &io::Error, libc_err: i32) -> bool {
    err.raw_os_error() == Some(libc_err)
}

/// Translates an io error raised while operating on a volume directory.
pub fn to_volume_error(err: io::Error) -> anyhow::Error {
    if err_not_found(&err) {
        return StorageError::VolumeNotFound.into();
    }
    if err_permission(&err) {
        return StorageError::VolumeAccessDenied.into();
    }
    if err_already_exists(&err) {
        return StorageError::VolumeExists.into();
    }
    if err_dir_not_empty(&err) {
        return StorageError::VolumeNotEmpty.into();
    }
    if err_not_dir(&err) {
        return StorageError::DiskNotDir.into();
    }
    to_disk_error(err)
}

/// Translates an io error raised while operating on a file inside a volume.
pub fn to_file_error(err: io::Error) -> anyhow::Error {
    if err_not_found(&err) || err_not_dir(&err) {
        return StorageError::FileNotFound.into();
    }
    if err_permission(&err) {
        return StorageError::FileAccessDenied.into();
    }
    if err_is_dir(&err) {
        return StorageError::IsNotRegular.into();
    }
    if err_too_long(&err) {
        return StorageError::FileNameTooLong.into();
    }
    to_disk_error(err)
}

fn to_disk_error(err: io::Error) -> anyhow::Error {
    if err_no_space(&err) {
        return StorageError::DiskFull.into();
    }
    if err_io(&err) {
        return StorageError::FaultyDisk.into();
    }
    if err_too_many_files(&err) {
        return StorageError::TooManyOpenFiles.into();
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AsError;

    #[test]
    fn test_to_volume_error() {
        let cases = vec![
            (
                io::Error::from(io::ErrorKind::NotFound),
                StorageError::VolumeNotFound,
            ),
            (
                io::Error::from(io::ErrorKind::PermissionDenied),
                StorageError::VolumeAccessDenied,
            ),
            (
                io::Error::from(io::ErrorKind::AlreadyExists),
                StorageError::VolumeExists,
            ),
            (
                io::Error::from_raw_os_error(libc::ENOTEMPTY),
                StorageError::VolumeNotEmpty,
            ),
            (io::Error::from_raw_os_error(libc::ENOSPC), StorageError::DiskFull),
            (io::Error::from_raw_os_error(libc::EIO), StorageError::FaultyDisk),
        ];
        for (err, expected) in cases {
            assert!(to_volume_error(err).is_storage_err(&expected), "{}", expected);
        }
    }

    #[test]
    fn test_to_file_error() {
        let err = to_file_error(io::ErrorKind::NotFound.into());
        assert!(err.is_storage_err(&StorageError::FileNotFound));
        let err = to_file_error(io::Error::from_raw_os_error(libc::EISDIR));
        assert!(err.is_storage_err(&StorageError::IsNotRegular));
        let err = to_file_error(io::ErrorKind::Other.into());
        assert!(err.as_error::<io::Error>().is_some());
    }
}
