//! Logging for the KongDash host process.
//!
//! Dual output: coloured stdout and a plain `kongdash.log` file. The
//! initializer runs at most once per process.

use crate::error::KongdashError;

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::io::stdout;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use fern::Dispatch;
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use humantime::format_rfc3339;
use log::{LevelFilter, Record, info, warn};

static INIT_LOGGER_ONCE: Once = Once::new();

static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

const LOG_FILE_NAME: &str = "kongdash.log";

#[cfg(debug_assertions)]
const LOG_LEVEL: LevelFilter = LevelFilter::Debug;

#[cfg(not(debug_assertions))]
const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Per-frame WebSocket chatter stays out of debug logs.
const TRANSPORT_CRATES: [&str; 2] = ["tungstenite", "tokio_tungstenite"];

/// Path of the log file inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(LOG_FILE_NAME)
}

/// Install the global logger, creating `log_dir` if needed.
///
/// Safe to call more than once: later calls log a warning and return `Ok`.
///
/// # Errors
///
/// Returns [`KongdashError::Kongdash`] if the directory or log file cannot be
/// created, or another global logger is already installed.
pub fn initialize(log_dir: &Path) -> Result<(), KongdashError> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        warn!("Logger already initialized");
        return Ok(());
    }

    let mut result = Ok(());

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(log_dir);
        if result.is_ok() {
            info!(
                "Logger initialized with level {LOG_LEVEL:?}, writing to {}",
                log_file_path(log_dir).display()
            );
        }
    });

    result
}

#[track_caller]
fn initialize_internal(log_dir: &Path) -> Result<(), KongdashError> {
    create_dir_all(log_dir).map_err(|e| KongdashError::Kongdash {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    let mut base_dispatch = Dispatch::new().level(LOG_LEVEL);
    for target in TRANSPORT_CRATES {
        base_dispatch = base_dispatch.level_for(target, LevelFilter::Info);
    }

    let stdout_dispatch = Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{origin}]",
                date = format_rfc3339(SystemTime::now()),
                level = colors.color(record.level()),
                origin = origin(record),
            ))
        })
        .chain(stdout());

    let log_file = fern::log_file(log_file_path(log_dir)).map_err(|e| KongdashError::Kongdash {
        message: format!("Failed to create log file: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let file_dispatch = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{date} - {level}] {message} [{origin}]",
                date = format_rfc3339(SystemTime::now()),
                level = record.level(),
                origin = origin(record),
            ))
        })
        .chain(log_file);

    base_dispatch
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(|e| KongdashError::Kongdash {
            message: format!("Failed to initialize logger: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn origin(record: &Record) -> String {
    format!(
        "{}:{}",
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0)
    )
}
