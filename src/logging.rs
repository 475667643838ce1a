use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// Where log output goes. The TUI owns the terminal, so it logs to a file.
pub enum LogTarget {
    File,
    Stderr,
}

/// The writer actually chosen for a target.
enum LogSink {
    File(File),
    /// File mode without a usable file. Stderr would draw over the TUI.
    Discard,
    Stderr,
}

/// Initialize JSON logging. `RUST_LOG` takes precedence over the configured
/// level. Must run before the TUI takes over the terminal, since a log file
/// that cannot be opened is reported on stderr.
pub fn init_logging(config: &LoggingConfig, target: LogTarget) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(&config.level)))
        .unwrap_or_else(|_| EnvFilter::new(directive("info")));

    let registry = tracing_subscriber::registry().with(filter);
    match select_sink(config, target) {
        LogSink::File(file) => registry.with(json_layer(Mutex::new(file))).init(),
        LogSink::Discard => registry.with(json_layer(std::io::sink)).init(),
        LogSink::Stderr => registry.with(json_layer(std::io::stderr)).init(),
    }
}

fn json_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_writer(writer)
        .with_current_span(false)
        .with_span_list(false)
}

fn select_sink(config: &LoggingConfig, target: LogTarget) -> LogSink {
    if let LogTarget::Stderr = target {
        return LogSink::Stderr;
    }
    let Some(path) = config.file_path() else {
        eprintln!("statusdash: no data directory for the log file, logging disabled");
        return LogSink::Discard;
    };
    match open_log_file(&path) {
        Ok(file) => LogSink::File(file),
        Err(e) => {
            eprintln!(
                "statusdash: cannot open log file {}: {}, logging disabled",
                path.display(),
                e
            );
            LogSink::Discard
        }
    }
}

fn directive(level: &str) -> String {
    format!("statusdash={}", level)
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
