//! Event log setup.
//!
//! Two `tracing` layers: an append-only file receiving INFO and above as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] message` lines, and stderr diagnostics
//! that stay off unless `IA_COMMITS_LOG` holds an env-filter directive.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::Environment;

/// Env-filter directive for stderr diagnostics, e.g. `IA_COMMITS_LOG=debug`.
pub const LOG_FILTER_ENV: &str = "IA_COMMITS_LOG";

/// Formats one event as a single bracketed log line.
pub struct LogLineFormat;

impl<S, N> FormatEvent<S, N> for LogLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(&mut writer, "[{}] [{}] ", now, level_label(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Label written for each level. WARN is spelled out as WARNING.
pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Open `path` for appending, creating it if needed. Never truncates.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber.
///
/// When the log file cannot be opened the hook still runs, with stderr
/// diagnostics only.
pub fn init(env: &Environment, log_path: &str) {
    let (file, open_error) = match open_log_file(Path::new(log_path)) {
        Ok(file) => (Some(file_layer(file)), None),
        Err(e) => (None, Some(e)),
    };

    let filter = env
        .get(LOG_FILTER_ENV)
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter);

    let _ = tracing_subscriber::registry()
        .with(file)
        .with(stderr_layer)
        .try_init();

    if let Some(e) = open_error {
        warn!("Cannot open log file {}: {}", log_path, e);
    }
}

/// File layer writing [`LogLineFormat`] lines at INFO and above.
pub fn file_layer(file: File) -> impl Layer<Registry> {
    fmt::layer()
        .event_format(LogLineFormat)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .with_filter(LevelFilter::INFO)
}
