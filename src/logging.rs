//! Tracing setup for hosts embedding the engine.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

/// Keeps the non-blocking file writer flushing; hold it for the process
/// lifetime when file logging is active.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// Installs the global subscriber: stdout always, plus a daily-rotated log
/// file under `log_dir` when one is given.
pub fn init_tracing(config: &EngineConfig, log_dir: Option<&Path>) -> Option<LogGuard> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(true);
    let registry = tracing_subscriber::registry().with(filter).with(stdout);

    match log_dir {
        Some(dir) => {
            let appender = rolling::daily(dir, "beici-engine.log");
            let (writer, worker) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(LogGuard { _worker: worker })
        }
        None => {
            registry.init();
            None
        }
    }
}
