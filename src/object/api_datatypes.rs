use serde::{Deserialize, Serialize};

use crate::storage::VolInfo;
use crate::utils;

// Bucket as seen by callers of the erasure layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    // Name of the bucket.
    pub name: String,
    // Date and time when the bucket was created.
    pub created: utils::DateTime,
}

impl From<VolInfo> for BucketInfo {
    fn from(vol: VolInfo) -> Self {
        BucketInfo {
            name: vol.name,
            created: vol.created,
        }
    }
}
