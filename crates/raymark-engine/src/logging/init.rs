use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use log::Log;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "raymark_engine=debug,wgpu=warn").
///
/// `log_file`, when set, redirects all output to that file. The file is
/// truncated at startup.
///
/// `crash_log`, when set, additionally receives every error-level record
/// regardless of `env_filter`. It is appended to across runs.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    pub log_file: Option<PathBuf>,
    pub crash_log: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            log_file: None,
            crash_log: None,
        }
    }
}

// Held for the whole of initialization so files are only opened by the
// caller that actually installs the logger.
static INIT: Mutex<bool> = Mutex::new(false);

/// Level used when neither an explicit filter nor `RUST_LOG` is present.
pub(crate) fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

fn open_sink(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn open_crash_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open crash log {}", path.display()))
}

/// Forwards everything to the `env_logger` logger and copies error records
/// into the crash log.
struct CrashTee {
    inner: env_logger::Logger,
    crash: Mutex<File>,
}

impl CrashTee {
    fn new(inner: env_logger::Logger, crash: File) -> Self {
        Self {
            inner,
            crash: Mutex::new(crash),
        }
    }

    fn max_level(&self) -> log::LevelFilter {
        self.inner.filter().max(log::LevelFilter::Error)
    }
}

impl Log for CrashTee {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Error || self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record<'_>) {
        self.inner.log(record);

        if record.level() != log::Level::Error {
            return;
        }
        let mut file = self.crash.lock().unwrap_or_else(PoisonError::into_inner);
        // Nowhere left to report a failing crash log.
        let _ = writeln!(file, "[ERROR {}] {}", record.target(), record.args());
    }

    fn flush(&self) {
        self.inner.flush();
        let mut file = self.crash.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = file.flush();
    }
}

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Fails only when `log_file` or `crash_log`
/// cannot be opened, in which case a later call may try again.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let mut initialized = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if *initialized {
        return Ok(());
    }

    let sink = config.log_file.as_deref().map(open_sink).transpose()?;
    let crash = config.crash_log.as_deref().map(open_crash_log).transpose()?;

    let mut builder = env_logger::Builder::new();

    if let Some(filter) = &config.env_filter {
        builder.parse_filters(filter);
    } else if let Ok(filter) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filter);
    } else {
        builder.filter_level(default_level());
    }

    if let Some(file) = sink {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    } else {
        builder.write_style(config.write_style);
    }

    let logger = builder.build();
    let installed = match crash {
        Some(file) => {
            let tee = CrashTee::new(logger, file);
            let level = tee.max_level();
            log::set_boxed_logger(Box::new(tee)).map(|()| level)
        }
        None => {
            let level = logger.filter();
            log::set_boxed_logger(Box::new(logger)).map(|()| level)
        }
    };
    *initialized = true;

    // Another logger may already be installed (tests, embedding hosts).
    if let Ok(level) = installed {
        log::set_max_level(level);
        log::debug!("logging initialized");
    }

    Ok(())
}
