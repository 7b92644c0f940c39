use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, bail};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};
use uuid::Uuid;

use crate::config::{LogRotation, LoggingSection};

const FILE_PREFIX: &str = "weft.log";

pub struct LoggingGuard {
    run_id: Uuid,
    _writer: WorkerGuard,
}

impl LoggingGuard {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

pub fn init_tracing(logging: &LoggingSection) -> Result<LoggingGuard> {
    if logging.filter.trim().is_empty() {
        bail!("logging.filter must not be blank");
    }
    let directory = absolute(&logging.dir)?;
    fs::create_dir_all(&directory)
        .with_context(|| format!("cannot create log directory {}", directory.display()))?;

    let appender = match logging.rotation {
        LogRotation::Daily => rolling::daily(&directory, FILE_PREFIX),
        LogRotation::Hourly => rolling::hourly(&directory, FILE_PREFIX),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(&logging.filter).with_context(|| {
        format!("logging.filter '{}' is not a valid directive", logging.filter)
    })?;

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter);
    let stderr_layer = logging.stderr_warnings.then(|| {
        fmt::layer()
            .compact()
            .with_writer(io::stderr)
            .with_filter(LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let swept = sweep_expired(&directory, logging.retention_days);
    let run_id = Uuid::now_v7();
    tracing::info!(
        target: "logging",
        run_id = %run_id,
        directory = %directory.display(),
        filter = %logging.filter,
        swept_files = swept,
        "tracing online"
    );

    Ok(LoggingGuard {
        run_id,
        _writer: guard,
    })
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.as_os_str().is_empty() {
        bail!("logging.dir must not be blank");
    }
    if dir.is_absolute() {
        return Ok(dir.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve the working directory")?;
    Ok(cwd.join(dir))
}

fn sweep_expired(directory: &Path, retention_days: usize) -> usize {
    let window = Duration::from_secs(retention_days as u64 * 24 * 60 * 60);
    let Some(cutoff) = SystemTime::now().checked_sub(window) else {
        return 0;
    };
    let Ok(entries) = fs::read_dir(directory) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(FILE_PREFIX) {
            continue;
        }
        let expired = entry
            .metadata()
            .ok()
            .filter(|metadata| metadata.is_file())
            .and_then(|metadata| metadata.modified().ok())
            .is_some_and(|modified| modified <= cutoff);
        if expired && fs::remove_file(entry.path()).is_ok() {
            removed += 1;
        }
    }
    removed
}
