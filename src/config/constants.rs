use const_format::concatcp;

// Env prefix used for all envs of the erasure set.
pub const ENV_PREFIX: &str = "ERASURE_";

pub const ENV_LOG_LEVEL: &str = concatcp!(ENV_PREFIX, "LOG_LEVEL");
