use lazy_static::lazy_static;

use crate::errors::{self, ErasureError, ReducibleError, StorageError};

lazy_static! {
    // Errors a bucket operation tolerates from individual disks.
    pub static ref BUCKET_OP_IGNORED_ERRORS: Vec<ReducibleError> = {
        let mut errs: Vec<ReducibleError> = errors::BASE_STORAGE_ERRORS
            .iter()
            .cloned()
            .map(|e| e.into())
            .collect();
        errs.push(StorageError::DiskAccessDenied.into());
        errs
    };

    // Errors a quick heal tolerates while listing or healing buckets.
    pub static ref QUICK_HEAL_IGNORED_ERRORS: Vec<ReducibleError> = {
        let mut errs = BUCKET_OP_IGNORED_ERRORS.clone();
        errs.push(StorageError::VolumeNotFound.into());
        errs
    };
}

// Returns the error shared by at least `quorum` disks, `quorum_err` when no
// single outcome reaches it.
fn reduce_quorum_errs(
    errs: &[Option<ReducibleError>],
    ignored_errs: &[ReducibleError],
    quorum: usize,
    quorum_err: ErasureError,
) -> Option<ReducibleError> {
    let (max_count, max_err) = errors::reduce_errs(errs, ignored_errs);
    if max_count >= quorum {
        return max_err;
    }
    Some(quorum_err.into())
}

pub(super) fn reduce_read_quorum_errs(
    errs: &[Option<ReducibleError>],
    ignored_errs: &[ReducibleError],
    read_quorum: usize,
) -> Option<ReducibleError> {
    reduce_quorum_errs(errs, ignored_errs, read_quorum, ErasureError::ReadQuorum)
}

pub(super) fn reduce_write_quorum_errs(
    errs: &[Option<ReducibleError>],
    ignored_errs: &[ReducibleError],
    write_quorum: usize,
) -> Option<ReducibleError> {
    reduce_quorum_errs(errs, ignored_errs, write_quorum, ErasureError::WriteQuorum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_quorum_errs() {
        let not_found: ReducibleError = StorageError::VolumeNotFound.into();
        let offline: ReducibleError = StorageError::DiskNotFound.into();

        let errs = vec![None, None, None, Some(offline.clone())];
        assert_eq!(
            reduce_write_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, 3),
            None
        );

        let errs = vec![
            Some(not_found.clone()),
            Some(not_found.clone()),
            Some(not_found.clone()),
            None,
        ];
        assert_eq!(
            reduce_read_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, 2),
            Some(not_found)
        );

        let errs = vec![None, Some(offline.clone()), Some(offline.clone()), Some(offline)];
        assert_eq!(
            reduce_write_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, 3),
            Some(ErasureError::WriteQuorum.into())
        );
    }
}
