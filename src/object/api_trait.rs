use async_trait::async_trait;

use super::*;

/// Bucket level operations of an object layer.
#[async_trait]
pub trait BucketLayer: Send + Sync {
    async fn make_bucket(&self, bucket: &str) -> anyhow::Result<()>;

    async fn get_bucket_info(&self, bucket: &str) -> anyhow::Result<BucketInfo>;

    async fn list_buckets(&self) -> anyhow::Result<Vec<BucketInfo>>;

    async fn delete_bucket(&self, bucket: &str, force_delete: bool) -> anyhow::Result<()>;
}
