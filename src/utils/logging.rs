// Tue Jan 13 2026 - Alex

use crate::utils::{format_bytes, format_duration};
use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct LoggingUtils;

impl LoggingUtils {
    pub fn init_logger(level: LevelFilter) {
        let logger = Box::new(ColoredLogger { level });
        if log::set_boxed_logger(logger).is_ok() {
            log::set_max_level(level);
        }
    }

    pub fn init_logger_with_file(level: LevelFilter, file_path: &Path) -> std::io::Result<()> {
        let file = OpenOptions::new().create(true).append(true).open(file_path)?;
        let logger = Box::new(FileLogger {
            level,
            file: Mutex::new(file),
        });
        if log::set_boxed_logger(logger).is_ok() {
            log::set_max_level(level);
        }
        Ok(())
    }

    pub fn init_from_env() {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Info,
        }
    }

    pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// `heapscope::graph::builder` -> `graph::builder`
fn short_target(target: &str) -> &str {
    target.strip_prefix("heapscope::").unwrap_or(target)
}

struct ColoredLogger {
    level: LevelFilter,
}

impl ColoredLogger {
    fn format_level(level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }
}

impl Log for ColoredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let target = format!("[{}]", short_target(record.target()));
        eprintln!("{} {} {}", Self::format_level(record.level()), target.dimmed(), record.args());
    }

    fn flush(&self) {}
}

struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {:5} [{}] {}\n",
            unix_timestamp(),
            record.level(),
            short_target(record.target()),
            record.args()
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    format!("{}.{:03}", since_epoch.as_secs(), since_epoch.subsec_millis())
}

pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &'static str) -> Self {
        log::trace!("{} started", name);
        Self {
            name,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::debug!("{} took {}", self.name, format_duration(self.start.elapsed()));
    }
}

pub struct ProgressLogger {
    name: &'static str,
    total: u64,
    last_step: u64,
}

impl ProgressLogger {
    pub fn new(name: &'static str, total: u64) -> Self {
        log::debug!("{}: {} to process", name, format_bytes(total));
        Self {
            name,
            total,
            last_step: 0,
        }
    }

    pub fn update(&mut self, position: u64) {
        if self.total == 0 {
            return;
        }
        let step = position.min(self.total) * 10 / self.total;
        if step > self.last_step {
            self.last_step = step;
            log::info!(
                "{}: {}% ({} of {})",
                self.name,
                step * 10,
                format_bytes(position),
                format_bytes(self.total)
            );
        }
    }

    pub fn last_percent(&self) -> u64 {
        self.last_step * 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!(LoggingUtils::level_from_str("WARNING"), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_str("bogus"), LevelFilter::Info);
        assert_eq!(LoggingUtils::level_from_verbosity(2), LevelFilter::Debug);
    }

    #[test]
    fn test_progress_steps() {
        let mut progress = ProgressLogger::new("parse", 1000);
        progress.update(50);
        assert_eq!(progress.last_percent(), 0);
        progress.update(250);
        assert_eq!(progress.last_percent(), 20);
        progress.update(200);
        assert_eq!(progress.last_percent(), 20);
        progress.update(5000);
        assert_eq!(progress.last_percent(), 100);
    }

    #[test]
    fn test_short_target() {
        assert_eq!(short_target("heapscope::graph::builder"), "graph::builder");
        assert_eq!(short_target("other"), "other");
    }
}
