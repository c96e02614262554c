use std::str::FromStr;

use lazy_static::lazy_static;
use slog::Drain;

use super::*;
use crate::config::ENV_LOG_LEVEL;

lazy_static! {
    static ref GLOBAL_LOG_GUARD: slog_scope::GlobalLoggerGuard = {
        let level = get_log_level()
            .or_else(|| {
                std::env::var(ENV_LOG_LEVEL)
                    .ok()
                    .and_then(|v| Level::from_str(&v).ok())
            })
            .unwrap_or(Level::Info);
        set_log_level(level);

        let decorator = slog_term::TermDecorator::new().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        let drain = drain.filter_level(level).fuse();
        let logger = slog::Logger::root(drain, slog::o!("module" => "erasure-heal"));

        let scope_guard = slog_scope::set_global_logger(logger);
        // Records emitted through the `log` facade end up in the slog drain.
        if let Err(err) = slog_stdlog::init_with_level(to_std_level(level)) {
            slog_scope::warn!("log facade already initialized: {}", err);
        }
        scope_guard
    };
}

/// Installs the global logger. Safe to call more than once; only the first
/// call has an effect.
pub fn init() {
    lazy_static::initialize(&GLOBAL_LOG_GUARD);
}

fn to_std_level(level: Level) -> log::Level {
    match level {
        Level::Critical | Level::Error => log::Level::Error,
        Level::Warning => log::Level::Warn,
        Level::Info => log::Level::Info,
        Level::Debug => log::Level::Debug,
        Level::Trace => log::Level::Trace,
    }
}
