use crate::types::*;

#[cfg(feature = "serde")]
use crate::constants::LOG_DATE_FORMAT;
#[cfg(feature = "serde")]
use chrono::{Local, NaiveDate};
#[cfg(feature = "serde")]
use serde_json::{Map, Value};
#[cfg(feature = "serde")]
use std::path::{Path, PathBuf};
#[cfg(feature = "serde")]
use std::sync::Mutex;

/// Append-only record of transferred books, grouped by day
pub trait CompletedLog: Send + Sync {
    /// Record `entry` under today's date
    fn append(&self, entry: CompletedBookLogEntry) -> Result<()>;

    /// Total pages and entries recorded today
    fn today(&self) -> Result<(usize, Vec<CompletedBookLogEntry>)>;
}

#[cfg(feature = "serde")]
type LogBook = Map<String, Value>;

/// JSON file keyed by `YYYY-MM-DD`, each value a list of entries.
///
/// A missing file is an empty log. Entries that no longer parse are skipped
/// when reading but kept on disk; a file that is not a date-keyed object at
/// all is set aside as `<name>.corrupt` before the next append.
#[cfg(feature = "serde")]
#[derive(Debug)]
pub struct JsonLogStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[cfg(feature = "serde")]
impl JsonLogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_on(&self, date: NaiveDate, entry: CompletedBookLogEntry) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut book = match self.read_all() {
            Ok(book) => book,
            Err(StationError::Config(e)) => {
                let aside = self.corrupt_path();
                log::warn!("{}; moving it to {}", e, aside.display());
                std::fs::rename(&self.path, &aside)?;
                LogBook::new()
            }
            Err(e) => return Err(e),
        };

        let value = serde_json::to_value(&entry)
            .map_err(|e| StationError::Config(format!("Failed to serialize log entry: {}", e)))?;
        let key = date_key(date);
        match book
            .entry(key.clone())
            .or_insert_with(|| Value::Array(Vec::new()))
        {
            Value::Array(day) => day.push(value),
            _ => {
                return Err(StationError::Config(format!(
                    "Log {} has a non-list value under {}",
                    self.path.display(),
                    key
                )));
            }
        }

        let json = serde_json::to_string_pretty(&book)
            .map_err(|e| StationError::Config(format!("Failed to serialize log: {}", e)))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn entries_on(&self, date: NaiveDate) -> Vec<CompletedBookLogEntry> {
        let book = match self.read_all() {
            Ok(book) => book,
            Err(e) => {
                log::warn!("{}", e);
                return Vec::new();
            }
        };

        let Some(Value::Array(day)) = book.get(&date_key(date)) else {
            return Vec::new();
        };
        day.iter()
            .filter_map(|item| {
                serde_json::from_value(item.clone())
                    .map_err(|e| log::warn!("Skipping log entry in {}: {}", self.path.display(), e))
                    .ok()
            })
            .collect()
    }

    fn read_all(&self) -> Result<LogBook> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LogBook::new()),
            Err(e) => return Err(e.into()),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(LogBook::new());
        }

        match serde_json::from_slice(&bytes) {
            Ok(Value::Object(book)) => Ok(book),
            Ok(_) => Err(StationError::Config(format!(
                "Log {} is not keyed by date",
                self.path.display()
            ))),
            Err(e) => Err(StationError::Config(format!(
                "Unreadable log {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn corrupt_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }
}

#[cfg(feature = "serde")]
impl CompletedLog for JsonLogStore {
    fn append(&self, entry: CompletedBookLogEntry) -> Result<()> {
        self.append_on(Local::now().date_naive(), entry)
    }

    fn today(&self) -> Result<(usize, Vec<CompletedBookLogEntry>)> {
        let entries = self.entries_on(Local::now().date_naive());
        let pages = entries.iter().map(|e| e.pages).sum();
        Ok((pages, entries))
    }
}

#[cfg(feature = "serde")]
fn date_key(date: NaiveDate) -> String {
    date.format(LOG_DATE_FORMAT).to_string()
}
