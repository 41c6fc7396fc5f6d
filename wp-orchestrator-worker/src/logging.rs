//! 日志初始化
//!
//! Library crates log through `log`; those records are bridged into
//! `tracing` when the subscriber is installed.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LoggingSection};

const LOG_FILE_PREFIX: &str = "wp-orchestrator-worker.log";

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(config: &LoggingSection) -> anyhow::Result<WorkerGuard> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .with_context(|| format!("invalid log level {:?}", config.level))?,
    };

    let (writer, guard) = match &config.directory {
        Some(directory) => tracing_appender::non_blocking(tracing_appender::rolling::daily(
            directory,
            LOG_FILE_PREFIX,
        )),
        None => tracing_appender::non_blocking(std::io::stdout()),
    };
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.directory.is_none())
        .with_target(true);

    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Text => registry.with(layer).try_init(),
    }
    .context("failed to install the tracing subscriber")?;

    Ok(guard)
}
