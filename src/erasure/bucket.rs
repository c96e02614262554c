use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, info};

use super::*;
use crate::errors::{self, ErasureError, ReducibleError, StorageError};
use crate::globals::{BUCKET_CONFIG_PREFIX, SYSTEM_META_BUCKET};
use crate::object::{ApiError, BucketInfo, BucketLayer, GenericError};
use crate::s3utils;
use crate::storage::VolInfo;

// Converts a reduced per-disk error into the error reported for `bucket`.
fn to_bucket_err(err: ReducibleError, bucket: &str) -> anyhow::Error {
    let generic = GenericError::bucket(bucket);
    match err {
        ReducibleError::Storage(StorageError::VolumeNotFound) => ApiError::BucketNotFound(generic).into(),
        ReducibleError::Storage(StorageError::VolumeExists) => ApiError::BucketExists(generic).into(),
        ReducibleError::Storage(StorageError::VolumeNotEmpty) => ApiError::BucketNotEmpty(generic).into(),
        ReducibleError::Erasure(ErasureError::ReadQuorum) => {
            ApiError::InsufficientReadQuorum(generic.with_err(err.into_anyhow())).into()
        }
        ReducibleError::Erasure(ErasureError::WriteQuorum) => {
            ApiError::InsufficientWriteQuorum(generic.with_err(err.into_anyhow())).into()
        }
        err => err.into_anyhow(),
    }
}

impl ErasureObjects {
    // Best effort removal of the bucket configuration files.
    async fn delete_bucket_metadata(&self, bucket: &str) {
        let prefix = crate::utils::path_join(&[BUCKET_CONFIG_PREFIX, bucket]);
        let prefix = prefix.as_str();
        let deletes = self.storage_disks.iter().flatten().map(|disk| async move {
            if let Err(err) = disk.delete(SYSTEM_META_BUCKET, prefix, true).await {
                debug!("removing {} from {}: {}", prefix, disk, err);
            }
        });
        join_all(deletes).await;
    }
}

#[async_trait]
impl BucketLayer for ErasureObjects {
    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        if let Err(err) = s3utils::check_valid_bucket_name_strict(bucket) {
            return Err(ApiError::BucketNameInvalid(GenericError::bucket(bucket).with_err(err)).into());
        }

        let results = join_all(self.storage_disks.iter().map(|disk| async move {
            match disk {
                Some(disk) => disk.make_volume(bucket).await,
                None => Err(StorageError::DiskNotFound.into()),
            }
        }))
        .await;
        let errs = errors::collect_errs(&results);

        match reduce_write_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, self.quorum.write) {
            None => {
                info!("created bucket {}", bucket);
                Ok(())
            }
            Some(err) => {
                if err == ReducibleError::Erasure(ErasureError::WriteQuorum) {
                    // Volumes left on a minority of disks would otherwise
                    // linger, quick heal skips them.
                    undo_make_bucket(&self.storage_disks, bucket).await;
                }
                Err(to_bucket_err(err, bucket))
            }
        }
    }

    async fn get_bucket_info(&self, bucket: &str) -> anyhow::Result<BucketInfo> {
        let results = join_all(self.storage_disks.iter().map(|disk| async move {
            match disk {
                Some(disk) => disk.stat_volume(bucket).await,
                None => Err(StorageError::DiskNotFound.into()),
            }
        }))
        .await;
        let errs = errors::collect_errs(&results);

        if let Some(err) = reduce_read_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, self.quorum.read) {
            return Err(to_bucket_err(err, bucket));
        }
        match results.into_iter().find_map(Result::ok) {
            Some(vol) => Ok(vol.into()),
            None => Err(to_bucket_err(ErasureError::ReadQuorum.into(), bucket)),
        }
    }

    async fn list_buckets(&self) -> anyhow::Result<Vec<BucketInfo>> {
        let results = join_all(self.storage_disks.iter().map(|disk| async move {
            match disk {
                Some(disk) => disk.list_volumes().await,
                None => Err(StorageError::DiskNotFound.into()),
            }
        }))
        .await;

        let mut listed = 0;
        let mut seen: HashMap<String, (usize, VolInfo)> = HashMap::new();
        for volumes in results.into_iter().flatten() {
            listed += 1;
            for vol in volumes {
                if s3utils::is_reserved_or_invalid_bucket(&vol.name, false) {
                    continue;
                }
                seen.entry(vol.name.clone()).or_insert((0, vol)).0 += 1;
            }
        }
        if listed < self.quorum.read {
            return Err(to_bucket_err(ErasureError::ReadQuorum.into(), ""));
        }

        let mut buckets: Vec<BucketInfo> = seen
            .into_iter()
            .filter(|(_, (count, _))| *count >= self.quorum.read)
            .map(|(_, (_, vol))| vol.into())
            .collect();
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn delete_bucket(&self, bucket: &str, force_delete: bool) -> anyhow::Result<()> {
        let results = join_all(self.storage_disks.iter().map(|disk| async move {
            match disk {
                Some(disk) => disk.delete_volume(bucket, force_delete).await,
                None => Err(StorageError::DiskNotFound.into()),
            }
        }))
        .await;
        let errs = errors::collect_errs(&results);

        if let Some(err) = reduce_write_quorum_errs(&errs, &BUCKET_OP_IGNORED_ERRORS, self.quorum.write) {
            return Err(to_bucket_err(err, bucket));
        }
        self.delete_bucket_metadata(bucket).await;
        info!("deleted bucket {}", bucket);
        Ok(())
    }
}
