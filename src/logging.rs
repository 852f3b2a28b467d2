use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::file_utils::FileManager;

// @module: Console and per-start file logging

// @struct: Custom logger implementation
pub struct BotLogger {
    level: LevelFilter,
    file: Option<Mutex<File>>,
}

impl BotLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter, file: Option<File>) -> Self {
        BotLogger {
            level,
            file: file.map(Mutex::new),
        }
    }

    /// Install the global logger.
    ///
    /// When `log_dir` is given a new `YYYYMMDD_HHMMSS.log` file is created
    /// there and every record is appended to it as well.
    pub fn init(level: LevelFilter, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
        let (file, path) = match log_dir {
            Some(dir) => {
                let path = log_file_path(dir);
                FileManager::ensure_dir(dir)?;
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("Failed to open log file: {:?}", path))?;
                (Some(file), Some(path))
            }
            None => (None, None),
        };

        log::set_boxed_logger(Box::new(BotLogger::new(level, file)))
            .context("Logger already initialized")?;
        log::set_max_level(level);
        Ok(path)
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

/// Timestamped log file name inside `dir`
pub fn log_file_path(dir: &Path) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("{}.log", timestamp))
}

/// Line written to the log file
pub fn format_file_line(timestamp: &str, level: Level, target: &str, message: &str) -> String {
    format!("{} - {} - {} - {}", timestamp, level, target, message)
}

impl Log for BotLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "{}{} {:<5} {}\x1B[0m",
            Self::color_for_level(record.level()),
            now.format("%H:%M:%S.%3f"),
            record.level(),
            record.args()
        );

        if let Some(file) = &self.file {
            let line = format_file_line(
                &now.format("%Y-%m-%d %H:%M:%S").to_string(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}
