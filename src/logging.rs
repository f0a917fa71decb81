//! Structured logging configuration
//!
//! Provides logging with:
//! - JSON output for machine consumption
//! - Pretty formatting for interactive use
//! - Optional daily-rolling log files
//! - A per-run span so every line of one analysis can be correlated
//!
//! Console logs are written to stderr; stdout is reserved for reports.

use crate::config::LoggingConfig;
use std::path::Path;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

const LOG_FILE_NAME: &str = "oura-tags.log";

/// Initialize the logging system. The returned guard must be held until exit so
/// buffered file output is flushed.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> Option<WorkerGuard> {
    // RUST_LOG wins over the configured level
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.output.as_str() {
        "file" => Some(init_file_logging(env_filter, &config.format, log_dir)),
        "both" => Some(init_combined_logging(env_filter, &config.format, log_dir)),
        _ => {
            init_console_logging(env_filter, &config.format);
            None
        }
    }
}

fn init_console_logging(filter: EnvFilter, format: &str) {
    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true),
                )
                .init();
        }
        _ => {
            subscriber
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_ansi(true)
                        .with_span_events(FmtSpan::CLOSE)
                        .pretty(),
                )
                .init();
        }
    }
}

fn init_file_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(non_blocking)
                        .with_current_span(true)
                        .with_span_list(true),
                )
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
        }
    }

    guard
}

fn init_combined_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        "json" => {
            subscriber
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();
        }
    }

    guard
}

/// Span wrapping one analysis run, tagged with a fresh run id
pub fn analysis_span(command: &str) -> Span {
    tracing::info_span!("analysis", command = command, run_id = %Uuid::new_v4())
}
