use const_format::concatcp;

pub const SLASH_SEPARATOR: &str = "/";

// System meta bucket, reserved for the erasure set's own metadata and never
// exposed as a user bucket.
pub const SYSTEM_META_BUCKET: &str = ".xl.sys";
// Staging area for files written whole, renamed into place once complete.
pub const SYSTEM_META_TMP_BUCKET: &str = concatcp!(SYSTEM_META_BUCKET, SLASH_SEPARATOR, "tmp");

// Format config file carries backend format specific details.
pub const FORMAT_CONFIG_FILE: &str = "format.json";

// Prefix under the meta bucket where per-bucket configuration lives.
pub const BUCKET_CONFIG_PREFIX: &str = "buckets";

// Per-bucket configuration files, kept whole on every disk.
pub const BUCKET_POLICY_CONFIG: &str = "policy.json";
pub const BUCKET_NOTIFICATION_CONFIG: &str = "notification.xml";
pub const BUCKET_LISTENER_CONFIG: &str = "listener.json";

pub const BUCKET_META_FILES: [&str; 3] = [
    BUCKET_POLICY_CONFIG,
    BUCKET_NOTIFICATION_CONFIG,
    BUCKET_LISTENER_CONFIG,
];

// Reserved bucket name.
pub const SYSTEM_RESERVED_BUCKET: &str = "xl";
