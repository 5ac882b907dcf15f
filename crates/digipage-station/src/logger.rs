use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Keeps the most recent log records for display and echoes them to stderr
#[derive(Clone)]
pub struct AppLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    max_entries: usize,
    level: LevelFilter,
    echo: bool,
}

impl AppLogger {
    pub fn new(max_entries: usize, level: LevelFilter) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            max_entries,
            level,
            echo: true,
        }
    }

    /// Keep records in memory only
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Install a clone as the global logger; `self` keeps reading the same ring
    pub fn init(&self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(self.level);
        Ok(())
    }

    pub fn get_entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// The last `count` entries, oldest first
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        entries[entries.len().saturating_sub(count)..].to_vec()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let entry = LogEntry {
                timestamp: Local::now(),
                level: record.level(),
                target: record.target().to_string(),
                message: format!("{}", record.args()),
            };

            if self.echo {
                eprintln!(
                    "{} {:<5} {}: {}",
                    entry.timestamp.format("%H:%M:%S%.3f"),
                    entry.level,
                    entry.target,
                    entry.message
                );
            }

            let mut entries = self.lock();
            entries.push(entry);

            // Keep only the most recent entries
            if entries.len() > self.max_entries {
                let excess = entries.len() - self.max_entries;
                entries.drain(0..excess);
            }
        }
    }

    fn flush(&self) {}
}
