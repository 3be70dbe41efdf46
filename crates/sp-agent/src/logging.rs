//! Process log — rolling file trail plus filtered stderr.
//!
//! Every classification, dispatch, and backend error lands in the daily
//! rolling file; stderr only carries warnings so the conversation stays
//! readable. Independent of the user-visible sink.

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "sp_agent=info,sp_inference=info,sp_catalog=info";

/// Initialize tracing with a rolling file writer and stderr output.
///
/// The returned guard must stay alive for the lifetime of the process or
/// buffered log lines are lost.
pub fn init(log_dir: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory: {log_dir}"))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "stackpilot.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(stderr_filter),
        )
        .init();

    Ok(guard)
}
