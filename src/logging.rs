use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

const LOG_FILE_NAME: &str = "claim-relayer.log";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`. The returned guard flushes the file
/// writer on drop and must be held for the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},claim_relayer=debug", config.level)));

    let console_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed()
    };

    let (file_layer, guard) = match config.dir.as_deref().and_then(file_writer) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false) // No color codes in file
                    .with_target(true),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let file_logging_enabled = file_layer.is_some();
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if installed.is_ok() && file_logging_enabled {
        if let Some(dir) = &config.dir {
            eprintln!("Logging to: {}/{}", dir, LOG_FILE_NAME);
        }
    }

    guard
}

/// Minimal logging for one-shot CLI commands
pub fn init_logging_simple() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

// `rolling::daily` panics if it cannot create the first file, so writability
// is checked up front.
fn file_writer(dir: &str) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "Warning: Could not create log directory {} ({}), file logging disabled",
            dir, e
        );
        return None;
    }

    let marker = Path::new(dir).join(".claim_relayer_write_test");
    if let Err(e) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&marker)
    {
        eprintln!(
            "Warning: Could not write to log directory {} ({}), file logging disabled",
            dir, e
        );
        return None;
    }
    let _ = std::fs::remove_file(&marker);

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    Some(tracing_appender::non_blocking(appender))
}
