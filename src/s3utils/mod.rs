use anyhow::bail;
use lazy_static::lazy_static;
use regex::Regex;

use crate::globals::{SLASH_SEPARATOR, SYSTEM_META_BUCKET, SYSTEM_RESERVED_BUCKET};

lazy_static! {
    static ref VALID_BUCKET_NAME: Regex =
        Regex::new(r#"^[A-Za-z0-9][A-Za-z0-9\.\-_:]{1,61}[A-Za-z0-9]$"#).unwrap();
    static ref VALID_BUCKET_NAME_STRICT: Regex =
        Regex::new(r#"^[a-z0-9][a-z0-9\.\-]{1,61}[a-z0-9]$"#).unwrap();
    static ref IP_ADDRESS: Regex = Regex::new(r#"^(\d+\.){3}\d+$"#).unwrap();
}

// Checks if we have a valid input bucket name.
pub fn check_valid_bucket_name(bucket_name: &str) -> anyhow::Result<()> {
    check_bucket_name_common(bucket_name, false)
}

// Stricter version following the S3 naming rules.
pub fn check_valid_bucket_name_strict(bucket_name: &str) -> anyhow::Result<()> {
    check_bucket_name_common(bucket_name, true)
}

fn check_bucket_name_common(bucket_name: &str, strict: bool) -> anyhow::Result<()> {
    if bucket_name.trim().is_empty() {
        bail!("Bucket name cannot be empty");
    }
    if bucket_name.len() < 3 {
        bail!("Bucket name cannot be shorter than 3 characters");
    }
    if bucket_name.len() > 63 {
        bail!("Bucket name cannot be longer than 63 characters");
    }
    if IP_ADDRESS.is_match(bucket_name) {
        bail!("Bucket name cannot be an ip address");
    }
    if bucket_name.contains("..") || bucket_name.contains(".-") || bucket_name.contains("-.") {
        bail!("Bucket name contains invalid characters");
    }
    let valid = if strict {
        &*VALID_BUCKET_NAME_STRICT
    } else {
        &*VALID_BUCKET_NAME
    };
    if !valid.is_match(bucket_name) {
        bail!("Bucket name contains invalid characters");
    }
    Ok(())
}

pub fn is_meta_bucket(bucket_name: &str) -> bool {
    bucket_name == SYSTEM_META_BUCKET
}

pub fn is_reserved_bucket(bucket_name: &str) -> bool {
    bucket_name == SYSTEM_RESERVED_BUCKET
}

/// Reports whether a volume found on disk must not be treated as a user
/// bucket: the meta bucket, the reserved bucket or anything not carrying a
/// valid bucket name.
pub fn is_reserved_or_invalid_bucket(bucket_entry: &str, strict: bool) -> bool {
    let bucket_entry = bucket_entry.trim_end_matches(SLASH_SEPARATOR);
    let valid = if strict {
        check_valid_bucket_name_strict(bucket_entry)
    } else {
        check_valid_bucket_name(bucket_entry)
    };
    if valid.is_err() {
        // The meta bucket starts with a dot and never passes validation.
        return true;
    }
    is_meta_bucket(bucket_entry) || is_reserved_bucket(bucket_entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_valid_bucket_name() {
        let cases = vec![
            ("lol", true),
            ("1-this-is-valid", true),
            ("this.works.too", true),
            ("Mixed_Case:ok", true),
            ("", false),
            ("  ", false),
            ("ab", false),
            ("192.168.1.1", false),
            ("a..b", false),
            ("a.-b", false),
            ("-leading-dash", false),
            (".xl.sys", false),
        ];
        for (name, ok) in cases {
            assert_eq!(check_valid_bucket_name(name).is_ok(), ok, "{}", name);
        }
        assert!(check_valid_bucket_name_strict("Mixed_Case:ok").is_err());
        assert!(check_valid_bucket_name_strict("lower.case-123").is_ok());
    }

    #[test]
    fn test_is_reserved_or_invalid_bucket() {
        assert!(is_reserved_or_invalid_bucket(SYSTEM_META_BUCKET, false));
        assert!(is_reserved_or_invalid_bucket(SYSTEM_RESERVED_BUCKET, false));
        assert!(is_reserved_or_invalid_bucket("ab", false));
        assert!(is_reserved_or_invalid_bucket("Photos", true));
        assert!(!is_reserved_or_invalid_bucket("Photos", false));
        assert!(!is_reserved_or_invalid_bucket("photos/", true));
    }
}
