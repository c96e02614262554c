pub mod config;
pub mod erasure;
pub mod errors;
pub mod format;
pub mod globals;
pub mod logger;
pub mod object;
pub mod s3utils;
pub mod storage;
pub mod utils;
pub mod xl_storage;
