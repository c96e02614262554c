use std::collections::HashMap;
use std::fmt;

use super::{AsError, ErasureError, StorageError};

/// A per-disk error reduced to something comparable and hashable, so that
/// errors from different disks can be counted against a quorum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReducibleError {
    Storage(StorageError),
    Erasure(ErasureError),
    Io(std::io::ErrorKind),
    Other(String),
}

impl From<StorageError> for ReducibleError {
    fn from(err: StorageError) -> Self {
        ReducibleError::Storage(err)
    }
}

impl From<ErasureError> for ReducibleError {
    fn from(err: ErasureError) -> Self {
        ReducibleError::Erasure(err)
    }
}

impl From<&anyhow::Error> for ReducibleError {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(err) = err.as_error::<StorageError>() {
            return ReducibleError::Storage(err.clone());
        }
        if let Some(err) = err.as_error::<ErasureError>() {
            return ReducibleError::Erasure(err.clone());
        }
        if let Some(err) = err.as_error::<std::io::Error>() {
            return ReducibleError::Io(err.kind());
        }
        ReducibleError::Other(err.to_string())
    }
}

impl fmt::Display for ReducibleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReducibleError::Storage(err) => write!(f, "{}", err),
            ReducibleError::Erasure(err) => write!(f, "{}", err),
            ReducibleError::Io(kind) => write!(f, "io error: {:?}", kind),
            ReducibleError::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ReducibleError {}

impl ReducibleError {
    pub fn is(&self, errs: &[ReducibleError]) -> bool {
        errs.iter().any(|e| e == self)
    }

    /// Converts back into an error suitable for returning to a caller,
    /// preserving the typed error where there is one.
    pub fn into_anyhow(self) -> anyhow::Error {
        match self {
            ReducibleError::Storage(err) => err.into(),
            ReducibleError::Erasure(err) => err.into(),
            ReducibleError::Io(kind) => std::io::Error::from(kind).into(),
            ReducibleError::Other(msg) => anyhow::anyhow!(msg),
        }
    }
}

/// Collects the error side of per-disk results, `None` meaning success.
pub fn collect_errs<T>(results: &[anyhow::Result<T>]) -> Vec<Option<ReducibleError>> {
    results
        .iter()
        .map(|r| r.as_ref().err().map(ReducibleError::from))
        .collect()
}

pub fn reduce_errs(
    errs: &[Option<ReducibleError>],
    ignored_errs: &[ReducibleError],
) -> (usize, Option<ReducibleError>) {
    let mut err_counts: HashMap<Option<&ReducibleError>, usize> = HashMap::new();
    for err in errs {
        if let Some(err) = err {
            if err.is(ignored_errs) {
                continue;
            }
        }
        *err_counts.entry(err.as_ref()).or_default() += 1;
    }

    let mut max = 0usize;
    let mut max_err = None;
    for (err, count) in err_counts {
        if max < count {
            max = count;
            max_err = err;
        } else if max == count && err.is_none() {
            // Prefer `None` over other error values with the same
            // number of occurrences.
            max_err = None;
        }
    }
    (max, max_err.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_errs() {
        let not_found: ReducibleError = StorageError::VolumeNotFound.into();
        let disk_gone: ReducibleError = StorageError::DiskNotFound.into();
        let cases: Vec<(Vec<Option<ReducibleError>>, usize, Option<ReducibleError>)> = vec![
            (vec![None, None, Some(not_found.clone())], 2, None),
            (
                vec![Some(not_found.clone()), Some(not_found.clone()), None],
                2,
                Some(not_found.clone()),
            ),
            // Ignored errors never count.
            (
                vec![
                    Some(disk_gone.clone()),
                    Some(disk_gone.clone()),
                    Some(disk_gone.clone()),
                    Some(not_found.clone()),
                ],
                1,
                Some(not_found.clone()),
            ),
            // Ties resolve towards success.
            (vec![Some(not_found.clone()), None], 1, None),
        ];
        for (errs, count, err) in cases {
            let (max, max_err) = reduce_errs(&errs, &[disk_gone.clone()]);
            assert_eq!(max, count);
            assert_eq!(max_err, err);
        }
    }

    #[test]
    fn test_collect_errs() {
        let results: Vec<anyhow::Result<()>> = vec![
            Ok(()),
            Err(StorageError::FaultyDisk.into()),
            Err(anyhow::Error::new(StorageError::VolumeNotFound).context("stat volume")),
        ];
        let errs = collect_errs(&results);
        assert_eq!(errs[0], None);
        assert_eq!(errs[1], Some(StorageError::FaultyDisk.into()));
        assert_eq!(
            errs[2],
            Some(StorageError::VolumeNotFound.into()),
            "typed error must be found through the context chain"
        );
    }
}
