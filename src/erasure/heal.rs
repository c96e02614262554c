use std::collections::{BTreeMap, HashMap};

use anyhow::Context;
use futures_util::future::join_all;
use log::{debug, info, warn};

use super::*;
use crate::errors::{AsError, ErasureError, ReducibleError, StorageError};
use crate::format::{load_format_erasure, save_format_erasure, DiskState, FormatErasureV3};
use crate::globals::{BUCKET_CONFIG_PREFIX, BUCKET_META_FILES, FORMAT_CONFIG_FILE, SYSTEM_META_BUCKET};
use crate::s3utils;
use crate::storage::{StorageApi, StorageDisk};
use crate::utils;

// Outcome of probing every slot, grouped by state.
#[derive(Default)]
struct FormatSurvey {
    offline: usize,
    faulty: usize,
    unformatted: Vec<usize>,
    corrupt: Vec<(usize, anyhow::Error)>,
    formatted: Vec<(usize, FormatErasureV3)>,
}

impl FormatSurvey {
    fn new(states: Vec<DiskState>) -> Self {
        let mut survey = FormatSurvey::default();
        for (slot, state) in states.into_iter().enumerate() {
            match state {
                DiskState::Offline => survey.offline += 1,
                DiskState::Faulty(_) => survey.faulty += 1,
                DiskState::Unformatted => survey.unformatted.push(slot),
                DiskState::Corrupt(err) => survey.corrupt.push((slot, err)),
                DiskState::Formatted(format) => survey.formatted.push((slot, format)),
            }
        }
        survey
    }

    fn reachable(&self) -> usize {
        self.unformatted.len() + self.corrupt.len() + self.formatted.len()
    }
}

/// Heals `format.json` across the set using the default quorum for its size.
pub async fn heal_format_erasure(disks: &[Option<StorageDisk>]) -> anyhow::Result<()> {
    let quorum = Quorum::default_for(disks.len())?;
    heal_format_erasure_with_quorum(disks, quorum).await
}

/// Confirms, repairs or bootstraps the format record of every slot.
///
/// Every slot is read before anything is written. Records are written only
/// when a read quorum of formatted disks agrees on the set layout, or when
/// the set is entirely fresh and a write quorum of disks is reachable. Corrupt
/// records are never overwritten.
pub async fn heal_format_erasure_with_quorum(
    disks: &[Option<StorageDisk>],
    quorum: Quorum,
) -> anyhow::Result<()> {
    let states = join_all(disks.iter().map(|disk| load_format_erasure(disk.as_deref()))).await;
    let mut survey = FormatSurvey::new(states);
    debug!(
        "format survey: {} formatted, {} unformatted, {} corrupt, {} faulty, {} offline",
        survey.formatted.len(),
        survey.unformatted.len(),
        survey.corrupt.len(),
        survey.faulty,
        survey.offline
    );

    if survey.reachable() < quorum.read {
        warn!(
            "only {} of {} disks are readable, {} needed",
            survey.reachable(),
            disks.len(),
            quorum.read
        );
        return Err(ErasureError::ReadQuorum.into());
    }

    if !survey.corrupt.is_empty() {
        let (slot, err) = survey.corrupt.swap_remove(0);
        warn!("refusing to heal, format.json on disk {} is corrupted", slot);
        return Err(err);
    }

    if survey.formatted.len() >= quorum.read {
        // Judge every record against the layout most disks carry.
        let reference = survey
            .formatted
            .iter()
            .map(|(_, format)| format)
            .max_by_key(|format| {
                survey
                    .formatted
                    .iter()
                    .filter(|(_, other)| other.same_set(format))
                    .count()
            })
            .ok_or(StorageError::Unexpected)?;
        for (slot, format) in &survey.formatted {
            if format.drive_count() != disks.len()
                || !format.same_set(reference)
                || format.disk_index() != Some(*slot)
            {
                warn!("format.json on disk {} does not match the set layout", slot);
                return Err(ErasureError::InconsistentFormat(*slot).into());
            }
        }
        if survey.unformatted.is_empty() {
            return Ok(());
        }
        info!(
            "repairing format.json on {} of {} disks",
            survey.unformatted.len(),
            disks.len()
        );
        return save_formats(disks, reference, &survey.unformatted).await;
    }

    if survey.formatted.is_empty() && survey.faulty == 0 && survey.unformatted.len() >= quorum.write {
        info!(
            "formatting {} fresh disks of a {} disk set",
            survey.unformatted.len(),
            disks.len()
        );
        let reference = FormatErasureV3::new(disks.len());
        let result = save_formats(disks, &reference, &survey.unformatted).await;
        if result.is_err() {
            // A partly bootstrapped set would stay below read quorum for good.
            undo_save_formats(disks, &survey.unformatted).await;
        }
        return result;
    }

    if survey.offline + survey.faulty > 0 && !survey.unformatted.is_empty() {
        return Err(ErasureError::OfflineAndUnformatted.into());
    }
    Err(ErasureError::ReadQuorum.into())
}

// Writes the copy of `reference` belonging to each slot, in slot order. The
// first failure stops the pass.
async fn save_formats(
    disks: &[Option<StorageDisk>],
    reference: &FormatErasureV3,
    slots: &[usize],
) -> anyhow::Result<()> {
    for (done, &slot) in slots.iter().enumerate() {
        let disk = disks[slot].as_deref().ok_or(StorageError::DiskNotFound)?;
        let format = reference.for_disk(slot).ok_or(StorageError::Unexpected)?;
        save_format_erasure(disk, &format).await.with_context(|| {
            format!(
                "saving format.json on disk {} failed, {} of {} disks repaired",
                slot,
                done,
                slots.len()
            )
        })?;
    }
    Ok(())
}

// Best effort removal of the records written by a failed bootstrap. Slots
// never written report a missing file, which is ignored like any other error.
async fn undo_save_formats(disks: &[Option<StorageDisk>], slots: &[usize]) {
    let deletes = slots
        .iter()
        .filter_map(|&slot| disks[slot].as_ref().map(|disk| (slot, disk)))
        .map(|(slot, disk)| async move {
            if let Err(err) = disk.delete(SYSTEM_META_BUCKET, FORMAT_CONFIG_FILE, false).await {
                debug!("undo format.json on disk {}: {}", slot, err);
            }
        });
    join_all(deletes).await;
}

/// Recreates missing buckets, and their configuration files, on every
/// reachable disk of a formatted set.
///
/// Only buckets listed by at least a read quorum of disks are healed. A
/// volume left on fewer disks by a make bucket that failed never existed as
/// a bucket and is left alone.
pub async fn quick_heal(disks: &[Option<StorageDisk>], quorum: Quorum) -> anyhow::Result<()> {
    let buckets = list_all_buckets(disks, quorum.read).await?;
    quick_heal_buckets(disks, quorum.write, &buckets).await
}

/// Like [`quick_heal`], for a caller supplied list of buckets.
pub async fn quick_heal_buckets(
    disks: &[Option<StorageDisk>],
    write_quorum: usize,
    buckets: &[String],
) -> anyhow::Result<()> {
    for bucket in buckets {
        heal_bucket(disks, bucket, write_quorum).await?;
        heal_bucket_metadata(disks, bucket, write_quorum).await;
    }
    Ok(())
}

// Buckets listed by at least `read_quorum` of the reachable disks.
async fn list_all_buckets(
    disks: &[Option<StorageDisk>],
    read_quorum: usize,
) -> anyhow::Result<Vec<String>> {
    let results = join_all(disks.iter().map(|disk| async move {
        match disk {
            Some(disk) => Some(disk.list_volumes().await),
            None => None,
        }
    }))
    .await;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (slot, result) in results.into_iter().enumerate() {
        let volumes = match result {
            None => continue,
            Some(Ok(volumes)) => volumes,
            // An unformatted disk is not in the ignored set and surfaces as is.
            Some(Err(err)) => {
                if ReducibleError::from(&err).is(&QUICK_HEAL_IGNORED_ERRORS) {
                    debug!("skipping disk {} while listing buckets: {}", slot, err);
                    continue;
                }
                return Err(err);
            }
        };
        for vol in volumes {
            if !s3utils::is_reserved_or_invalid_bucket(&vol.name, false) {
                *counts.entry(vol.name).or_default() += 1;
            }
        }
    }

    let mut buckets = Vec::with_capacity(counts.len());
    for (bucket, count) in counts {
        if count < read_quorum {
            debug!(
                "skipping bucket {}, listed by {} disks, {} needed",
                bucket, count, read_quorum
            );
            continue;
        }
        buckets.push(bucket);
    }
    Ok(buckets)
}

async fn heal_bucket_on_disk(disk: Option<&dyn StorageApi>, bucket: &str) -> anyhow::Result<()> {
    let disk = disk.ok_or(StorageError::DiskNotFound)?;
    match disk.stat_volume(bucket).await {
        Ok(_) => Ok(()),
        Err(err) if err.is_storage_err(&StorageError::VolumeNotFound) => {
            debug!("creating missing bucket {} on {}", bucket, disk);
            match disk.make_volume(bucket).await {
                Err(err) if !err.is_storage_err(&StorageError::VolumeExists) => Err(err),
                _ => Ok(()),
            }
        }
        Err(err) => Err(err),
    }
}

/// Makes sure `bucket` exists on every reachable disk, failing when fewer
/// than `write_quorum` disks hold it afterwards.
pub async fn heal_bucket(
    disks: &[Option<StorageDisk>],
    bucket: &str,
    write_quorum: usize,
) -> anyhow::Result<()> {
    let results = join_all(
        disks
            .iter()
            .map(|disk| heal_bucket_on_disk(disk.as_deref(), bucket)),
    )
    .await;

    let mut holders = 0;
    for (slot, result) in results.into_iter().enumerate() {
        match result {
            Ok(()) => holders += 1,
            Err(err) if err.is_storage_err(&StorageError::UnformattedDisk) => return Err(err),
            Err(err) => debug!("healing bucket {} on disk {} skipped: {}", bucket, slot, err),
        }
    }
    if holders < write_quorum {
        return Err(anyhow::Error::new(ErasureError::WriteQuorum).context(format!(
            "bucket {} is held by {} disks, {} needed",
            bucket, holders, write_quorum
        )));
    }
    Ok(())
}

/// Copies each configuration file of `bucket` to the disks missing it. The
/// content has to be agreed on by enough disks that no conflicting content
/// could have reached write quorum.
pub async fn heal_bucket_metadata(disks: &[Option<StorageDisk>], bucket: &str, write_quorum: usize) {
    let threshold = (disks.len() + 1).saturating_sub(write_quorum).max(1);
    for file in BUCKET_META_FILES.iter() {
        let path = utils::path_join(&[BUCKET_CONFIG_PREFIX, bucket, file]);
        heal_meta_file(disks, &path, threshold).await;
    }
}

async fn heal_meta_file(disks: &[Option<StorageDisk>], path: &str, threshold: usize) {
    let results = join_all(disks.iter().map(|disk| async move {
        match disk {
            Some(disk) => Some(disk.read_all(SYSTEM_META_BUCKET, path).await),
            None => None,
        }
    }))
    .await;

    let mut counts: HashMap<&[u8], usize> = HashMap::new();
    for data in results.iter().flatten().flatten() {
        *counts.entry(data.as_slice()).or_default() += 1;
    }
    let agreed: Vec<&[u8]> = counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(data, _)| data)
        .collect();
    let data = match agreed.as_slice() {
        [data] => *data,
        [] => return,
        _ => {
            warn!("{} has conflicting contents, leaving it as is", path);
            return;
        }
    };

    let writes = results.iter().zip(disks).filter_map(|(result, disk)| match (result, disk) {
        (Some(Err(err)), Some(disk)) if err.is_storage_err(&StorageError::FileNotFound) => {
            Some(async move { (disk, disk.write_all(SYSTEM_META_BUCKET, path, data).await) })
        }
        _ => None,
    });
    for (disk, result) in join_all(writes).await {
        match result {
            Ok(()) => debug!("healed {} on {}", path, disk),
            Err(err) => warn!("healing {} on {} failed: {}", path, disk, err),
        }
    }
}

/// Removes `bucket` from every disk after a make bucket that did not reach
/// quorum. Individual failures are ignored.
pub async fn undo_make_bucket(disks: &[Option<StorageDisk>], bucket: &str) {
    let deletes = disks.iter().flatten().map(|disk| async move {
        if let Err(err) = disk.delete_volume(bucket, false).await {
            debug!("undo make bucket {} on {}: {}", bucket, disk, err);
        }
    });
    join_all(deletes).await;
}
