mod erasure_errors;
mod reducible_errors;
mod storage_errors;

pub use erasure_errors::*;
pub use reducible_errors::*;
pub use storage_errors::*;

pub trait AsError {
    fn as_error<E: std::error::Error + 'static>(&self) -> Option<&E>;

    /// Reports whether the chain carries exactly this storage error.
    fn is_storage_err(&self, target: &StorageError) -> bool {
        self.as_error::<StorageError>() == Some(target)
    }
}

impl AsError for anyhow::Error {
    fn as_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        for cause in self.chain() {
            if let Some(err) = cause.downcast_ref::<E>() {
                return Some(err);
            }
        }
        None
    }
}
