use std::path::Path;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Holds the file-appender's background flush thread alive for the lifetime
/// of the process; dropping it flushes and stops the writer.
pub struct LoggingGuard(#[allow(dead_code)] tracing_appender::non_blocking::WorkerGuard);

/// Installs the process-wide `tracing` subscriber: an ANSI console layer and
/// a non-ANSI file layer writing to `<target_dir>/<appname>_<run_stamp>.log`
/// (§6), both driven by `RUST_LOG` (default `info`).
///
/// Call once, at the top of `main`, before spawning any engine stage — every
/// stage logs through the ambient `tracing` macros afterward.
pub fn init(app_name: &str, target_dir: &Path, run_stamp: &str) -> std::io::Result<LoggingGuard> {
    std::fs::create_dir_all(target_dir)?;
    let log_path = target_dir.join(format!("{app_name}_{run_stamp}.log"));
    let file = std::fs::OpenOptions::new().create(true).append(true).open(&log_path)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(console_filter);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(file_writer)
        .with_filter(file_filter);

    let subscriber = tracing_subscriber::registry().with(console_layer).with(file_layer);

    // `set_global_default` fails only if a subscriber is already installed
    // (e.g. a second CLI invocation inside the same test process); ignore
    // that rather than panicking, matching the original's "just log" spirit.
    let _ = tracing::subscriber::set_global_default(subscriber);

    Ok(LoggingGuard(guard))
}
