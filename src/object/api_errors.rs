use std::fmt;

use thiserror::Error;

use crate::errors::AsError;

/// Names the bucket (and object, where there is one) an API error is about.
#[derive(Debug, Error, Default)]
pub struct GenericError {
    pub bucket: String,
    pub object: String,
    #[source]
    pub err: Option<anyhow::Error>,
}

impl GenericError {
    pub fn bucket(bucket: &str) -> Self {
        GenericError {
            bucket: bucket.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_err(mut self, err: anyhow::Error) -> Self {
        self.err = Some(err);
        self
    }

    fn format_err(&self) -> String {
        match &self.err {
            Some(err) => format!(": ({})", err),
            None => "".to_string(),
        }
    }
}

impl fmt::Display for GenericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.bucket, self.object, self.format_err())
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("Storage resources are insufficient for the read operation {}/{}", .0.bucket, .0.object)]
    InsufficientReadQuorum(GenericError),
    #[error("Storage resources are insufficient for the write operation {}/{}", .0.bucket, .0.object)]
    InsufficientWriteQuorum(GenericError),
    #[error("Bucket not found: {}", .0.bucket)]
    BucketNotFound(GenericError),
    #[error("Bucket exists: {}", .0.bucket)]
    BucketExists(GenericError),
    #[error("Bucket not empty: {}", .0.bucket)]
    BucketNotEmpty(GenericError),
    #[error("Bucket name invalid: {}{}", .0.bucket, .0.format_err())]
    BucketNameInvalid(GenericError),
}

pub fn is_bucket_not_found(err: &anyhow::Error) -> bool {
    matches!(err.as_error::<ApiError>(), Some(ApiError::BucketNotFound(_)))
}

pub fn is_bucket_exists(err: &anyhow::Error) -> bool {
    matches!(err.as_error::<ApiError>(), Some(ApiError::BucketExists(_)))
}

pub fn is_insufficient_write_quorum(err: &anyhow::Error) -> bool {
    matches!(
        err.as_error::<ApiError>(),
        Some(ApiError::InsufficientWriteQuorum(_))
    )
}

pub fn is_insufficient_read_quorum(err: &anyhow::Error) -> bool {
    matches!(
        err.as_error::<ApiError>(),
        Some(ApiError::InsufficientReadQuorum(_))
    )
}
