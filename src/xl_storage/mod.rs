mod errors;

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use path_absolutize::Absolutize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub use errors::*;

use crate::errors::StorageError;
use crate::globals::{SLASH_SEPARATOR, SYSTEM_META_TMP_BUCKET};
use crate::storage::{StorageApi, VolInfo};
use crate::utils;

/// A disk backed by a local directory, every volume being a sub-directory.
pub struct XlStorage {
    disk_path: PathBuf,
    endpoint: String,
}

impl XlStorage {
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let disk_path = get_valid_path(path)?;
        let endpoint = disk_path
            .to_str()
            .ok_or(StorageError::Unexpected)?
            .to_owned();
        Ok(XlStorage {
            disk_path,
            endpoint,
        })
    }

    pub fn disk_path(&self) -> &Path {
        &self.disk_path
    }

    fn get_volume_dir(&self, volume: &str) -> anyhow::Result<PathBuf> {
        if !is_valid_volname(volume) {
            return Err(StorageError::VolumeNotFound.into());
        }
        Ok(self.disk_path.join(volume))
    }

    fn get_file_path(&self, volume: &str, path: &str) -> anyhow::Result<(PathBuf, PathBuf)> {
        let volume_dir = self.get_volume_dir(volume)?;
        let file_path = volume_dir.join(path.trim_start_matches(SLASH_SEPARATOR));
        check_path_length(&file_path.to_string_lossy())?;
        Ok((volume_dir, file_path))
    }

    // Fails with `VolumeNotFound` unless the volume directory exists.
    async fn check_volume(&self, volume_dir: &Path) -> anyhow::Result<()> {
        let meta = tokio::fs::metadata(volume_dir)
            .await
            .map_err(to_volume_error)?;
        if !meta.is_dir() {
            return Err(StorageError::VolumeNotFound.into());
        }
        Ok(())
    }

    // Distinguishes a missing file from a missing volume.
    async fn file_error(&self, volume_dir: &Path, err: std::io::Error) -> anyhow::Error {
        if err_not_found(&err) {
            if let Err(err) = self.check_volume(volume_dir).await {
                return err;
            }
        }
        to_file_error(err)
    }
}

impl fmt::Display for XlStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)
    }
}

#[async_trait]
impl StorageApi for XlStorage {
    async fn make_volume(&self, volume: &str) -> anyhow::Result<()> {
        let volume_dir = self.get_volume_dir(volume)?;
        match tokio::fs::metadata(&volume_dir).await {
            Ok(_) => Err(StorageError::VolumeExists.into()),
            Err(err) if err_not_found(&err) => {
                tokio::fs::create_dir_all(&volume_dir)
                    .await
                    .map_err(to_volume_error)?;
                debug!("created volume {} on {}", volume, self);
                Ok(())
            }
            Err(err) => Err(to_volume_error(err)),
        }
    }

    async fn list_volumes(&self) -> anyhow::Result<Vec<VolInfo>> {
        let mut entries = tokio::fs::read_dir(&self.disk_path)
            .await
            .map_err(to_volume_error)?;
        let mut volumes = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(to_volume_error)? {
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(_) => continue,
            };
            if !is_valid_volname(&name) {
                continue;
            }
            let meta = entry.metadata().await.map_err(to_volume_error)?;
            if !meta.is_dir() {
                continue;
            }
            volumes.push(VolInfo {
                name,
                created: utils::from_system_time(meta.modified()?),
            });
        }
        Ok(volumes)
    }

    async fn stat_volume(&self, volume: &str) -> anyhow::Result<VolInfo> {
        let volume_dir = self.get_volume_dir(volume)?;
        let meta = tokio::fs::metadata(&volume_dir)
            .await
            .map_err(to_volume_error)?;
        if !meta.is_dir() {
            return Err(StorageError::VolumeNotFound.into());
        }
        Ok(VolInfo {
            name: volume.to_owned(),
            created: utils::from_system_time(meta.modified()?),
        })
    }

    async fn delete_volume(&self, volume: &str, force_delete: bool) -> anyhow::Result<()> {
        let volume_dir = self.get_volume_dir(volume)?;
        let result = if force_delete {
            tokio::fs::remove_dir_all(&volume_dir).await
        } else {
            tokio::fs::remove_dir(&volume_dir).await
        };
        result.map_err(to_volume_error)
    }

    async fn read_all(&self, volume: &str, path: &str) -> anyhow::Result<Vec<u8>> {
        let (volume_dir, file_path) = self.get_file_path(volume, path)?;
        match tokio::fs::read(&file_path).await {
            Ok(data) => Ok(data),
            Err(err) => Err(self.file_error(&volume_dir, err).await),
        }
    }

    async fn write_all(&self, volume: &str, path: &str, data: &[u8]) -> anyhow::Result<()> {
        let (volume_dir, file_path) = self.get_file_path(volume, path)?;
        self.check_volume(&volume_dir).await?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(to_file_error)?;
        }
        // Written aside then renamed, so readers never see a torn file.
        let tmp_dir = self.disk_path.join(SYSTEM_META_TMP_BUCKET);
        tokio::fs::create_dir_all(&tmp_dir)
            .await
            .map_err(to_file_error)?;
        let tmp_path = tmp_dir.join(Uuid::new_v4().to_string());
        let result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp_path, &file_path).await
        }
        .await;
        if let Err(err) = result {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(to_file_error(err));
        }
        Ok(())
    }

    async fn append_file(&self, volume: &str, path: &str, buf: &[u8]) -> anyhow::Result<()> {
        let (volume_dir, file_path) = self.get_file_path(volume, path)?;
        self.check_volume(&volume_dir).await?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(to_file_error)?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(to_file_error)?;
        file.write_all(buf).await.map_err(to_file_error)?;
        file.flush().await.map_err(to_file_error)
    }

    async fn delete(&self, volume: &str, path: &str, recursive: bool) -> anyhow::Result<()> {
        let (volume_dir, file_path) = self.get_file_path(volume, path)?;
        let meta = match tokio::fs::symlink_metadata(&file_path).await {
            Ok(meta) => meta,
            Err(err) => return Err(self.file_error(&volume_dir, err).await),
        };
        let result = if !meta.is_dir() {
            tokio::fs::remove_file(&file_path).await
        } else if recursive {
            tokio::fs::remove_dir_all(&file_path).await
        } else {
            tokio::fs::remove_dir(&file_path).await
        };
        result.map_err(to_file_error)
    }
}

// Volume names are single path segments; `.` and `..` would escape the disk.
fn is_valid_volname(volume: &str) -> bool {
    !(volume.len() < 3 || volume.contains(SLASH_SEPARATOR) || volume.contains('\\'))
}

pub fn check_path_length(path_name: &str) -> anyhow::Result<(), StorageError> {
    // Apple OS X path length is limited to 1016.
    if cfg!(target_os = "macos") && path_name.len() > 1016 {
        return Err(StorageError::FileNameTooLong);
    }

    // Disallow more than 1024 characters on windows, there
    // are no known name_max limits on Windows.
    if cfg!(windows) && path_name.len() > 1024 {
        return Err(StorageError::FileNameTooLong);
    }

    // On Unix we reject paths if they are just '.', '..' or '/'.
    if path_name == "." || path_name == ".." || path_name == SLASH_SEPARATOR {
        return Err(StorageError::FileAccessDenied);
    }

    // Each path segment is limited to NAME_MAX (255) on all Unix platforms.
    let mut count = 0;
    for p in path_name.chars() {
        match p {
            '/' => count = 0,
            '\\' if cfg!(windows) => count = 0,
            _ => {
                count += 1;
                if count > 255 {
                    return Err(StorageError::FileNameTooLong);
                }
            }
        }
    }

    Ok(())
}

/// Absolutizes `path`, creating the directory when it does not exist yet.
pub fn get_valid_path(path: &str) -> anyhow::Result<PathBuf> {
    if path.is_empty() {
        return Err(StorageError::InvalidArgument.into());
    }

    // Disallow relative paths, figure out absolute paths.
    let path = Path::new(path).absolutize()?.into_owned();

    match std::fs::metadata(&path) {
        Err(err) if err_not_found(&err) => {
            std::fs::create_dir_all(&path)?;
        }
        Err(err) => return Err(err.into()),
        Ok(meta) => {
            if !meta.is_dir() {
                return Err(StorageError::DiskNotDir.into());
            }
        }
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AsError;
    use crate::globals::{FORMAT_CONFIG_FILE, SYSTEM_META_BUCKET};

    #[test]
    fn test_check_path_length() {
        assert!(check_path_length("bucket/object").is_ok());
        assert_eq!(check_path_length("."), Err(StorageError::FileAccessDenied));
        assert_eq!(check_path_length("/"), Err(StorageError::FileAccessDenied));
        let long = "a".repeat(256);
        assert_eq!(
            check_path_length(&format!("bucket/{}", long)),
            Err(StorageError::FileNameTooLong)
        );
    }

    #[test]
    fn test_get_valid_path() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = dir.path().join("disk1");
        let path = get_valid_path(fresh.to_str().unwrap()).unwrap();
        assert!(path.is_dir());

        let file = dir.path().join("file");
        std::fs::write(&file, b"").unwrap();
        let err = get_valid_path(file.to_str().unwrap()).unwrap_err();
        assert!(err.is_storage_err(&StorageError::DiskNotDir));

        let err = get_valid_path("").unwrap_err();
        assert!(err.is_storage_err(&StorageError::InvalidArgument));
    }

    #[tokio::test]
    async fn test_volume_ops() {
        let dir = tempfile::tempdir().unwrap();
        let disk = XlStorage::new(dir.path().to_str().unwrap()).unwrap();

        disk.make_volume("bucket").await.unwrap();
        let err = disk.make_volume("bucket").await.unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeExists));

        assert_eq!(disk.stat_volume("bucket").await.unwrap().name, "bucket");
        let err = disk.stat_volume("missing").await.unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeNotFound));

        disk.make_volume(SYSTEM_META_BUCKET).await.unwrap();
        let mut names: Vec<String> = disk
            .list_volumes()
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        names.sort();
        assert_eq!(names, vec![SYSTEM_META_BUCKET.to_owned(), "bucket".to_owned()]);

        disk.write_all("bucket", "object", b"data").await.unwrap();
        let err = disk.delete_volume("bucket", false).await.unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeNotEmpty));
        disk.delete_volume("bucket", true).await.unwrap();
        let err = disk.delete_volume("bucket", false).await.unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeNotFound));
    }

    #[tokio::test]
    async fn test_file_ops() {
        let dir = tempfile::tempdir().unwrap();
        let disk = XlStorage::new(dir.path().to_str().unwrap()).unwrap();

        let err = disk
            .read_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE)
            .await
            .unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeNotFound));
        let err = disk
            .write_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE, b"{}")
            .await
            .unwrap_err();
        assert!(err.is_storage_err(&StorageError::VolumeNotFound));

        disk.make_volume(SYSTEM_META_BUCKET).await.unwrap();
        let err = disk
            .read_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE)
            .await
            .unwrap_err();
        assert!(err.is_storage_err(&StorageError::FileNotFound));

        disk.write_all(SYSTEM_META_BUCKET, "buckets/photos/policy.json", b"{}")
            .await
            .unwrap();
        disk.append_file(SYSTEM_META_BUCKET, "buckets/photos/policy.json", b"tail")
            .await
            .unwrap();
        assert_eq!(
            disk.read_all(SYSTEM_META_BUCKET, "buckets/photos/policy.json")
                .await
                .unwrap(),
            b"{}tail".to_vec()
        );

        disk.write_all(SYSTEM_META_BUCKET, "buckets/photos/policy.json", b"new")
            .await
            .unwrap();
        assert_eq!(
            disk.read_all(SYSTEM_META_BUCKET, "buckets/photos/policy.json")
                .await
                .unwrap(),
            b"new".to_vec()
        );

        let err = disk
            .delete(SYSTEM_META_BUCKET, "buckets/photos", false)
            .await
            .unwrap_err();
        assert!(err.as_error::<std::io::Error>().is_some());
        disk.delete(SYSTEM_META_BUCKET, "buckets/photos", true)
            .await
            .unwrap();
        let err = disk
            .delete(SYSTEM_META_BUCKET, "buckets/photos", true)
            .await
            .unwrap_err();
        assert!(err.is_storage_err(&StorageError::FileNotFound));
    }

    #[tokio::test]
    async fn test_write_all_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let disk = XlStorage::new(dir.path().to_str().unwrap()).unwrap();
        disk.make_volume(SYSTEM_META_BUCKET).await.unwrap();

        disk.write_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE, &[b'x'; 4096])
            .await
            .unwrap();
        disk.write_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE, b"{}")
            .await
            .unwrap();
        assert_eq!(
            disk.read_all(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE)
                .await
                .unwrap(),
            b"{}".to_vec()
        );

        // Nothing is left behind in the staging area.
        let staged = std::fs::read_dir(disk.disk_path().join(SYSTEM_META_TMP_BUCKET))
            .unwrap()
            .count();
        assert_eq!(staged, 0);
    }
}
