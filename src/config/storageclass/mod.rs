use anyhow::{bail, ensure};
use const_format::concatcp;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::*;

// Standard storage class key
pub const CLASS_STANDARD: &str = "standard";

// Standard storage class environment variable
pub const STANDARD_ENV: &str = concatcp!(ENV_PREFIX, "STORAGE_CLASS_STANDARD");

// Supported storage class scheme is EC
const SCHEME_PREFIX: &str = "EC";

// Min parity disks
const MIN_PARITY_DISKS: usize = 1;

lazy_static! {
    pub static ref DEFAULT_KVS: KVS = KVS(vec![KV {
        key: CLASS_STANDARD.to_owned(),
        value: "".to_owned(),
    }]);
}

/// Storage class, expressed as the number of parity disks per erasure set.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageClass {
    pub parity: usize,
}

impl ToString for StorageClass {
    fn to_string(&self) -> String {
        format!("{}:{}", SCHEME_PREFIX, self.parity)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub standard: StorageClass,
}

/// Parses `EC:<parity>`.
pub fn parse_storage_class(storage_class_env: &str) -> anyhow::Result<StorageClass> {
    let s: Vec<&str> = storage_class_env.split(':').collect();
    if s.len() != 2 {
        bail!(
            "Invalid storage class format '{}', expected '{}:<parity>'",
            storage_class_env,
            SCHEME_PREFIX
        );
    }
    if s[0] != SCHEME_PREFIX {
        bail!(
            "Unsupported scheme '{}', only '{}' is supported",
            s[0],
            SCHEME_PREFIX
        );
    }
    let parity = s[1].parse::<usize>().map_err(|err| {
        anyhow::anyhow!("Invalid parity '{}' in storage class: {}", s[1], err)
    })?;
    Ok(StorageClass { parity })
}

// Validates the parity disks against the erasure set size.
pub fn validate_parity(parity: usize, set_drive_count: usize) -> anyhow::Result<()> {
    ensure!(
        parity >= MIN_PARITY_DISKS,
        "Parity {} should be greater than or equal to {}",
        parity,
        MIN_PARITY_DISKS
    );
    ensure!(
        parity <= set_drive_count / 2,
        "Parity {} should be less than or equal to {}",
        parity,
        set_drive_count / 2
    );
    Ok(())
}

// Half of the set is parity unless configured otherwise.
pub fn default_parity_count(drive_count: usize) -> usize {
    drive_count / 2
}

pub fn lookup_config(kvs: &KVS, set_drive_count: usize) -> anyhow::Result<Config> {
    check_valid_keys(STORAGE_CLASS_SUB_SYS, kvs, &DEFAULT_KVS)?;

    let ssc_str =
        std::env::var(STANDARD_ENV).unwrap_or_else(|_| kvs.get(CLASS_STANDARD).to_owned());
    let standard = if ssc_str.is_empty() {
        StorageClass {
            parity: default_parity_count(set_drive_count),
        }
    } else {
        parse_storage_class(&ssc_str)?
    };
    if set_drive_count > 1 {
        validate_parity(standard.parity, set_drive_count)?;
    }
    Ok(Config { standard })
}
