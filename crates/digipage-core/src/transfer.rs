//! Staged book transfer
//!
//! Planning reads the books root and routes each folder by the first
//! `-DDD-` city code in its name; nothing is touched on disk. Execution
//! moves the confirmed books and logs each one. It is a best-effort batch:
//! books moved before a cancellation or failure stay moved.

use crate::cancel::CancellationToken;
use crate::completed_log::CompletedLog;
use crate::constants::ARCHIVE_DATE_FORMAT;
use crate::fsops::move_dir;
use crate::natural::natural_cmp;
use crate::scan::count_pages;
use crate::types::*;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

static CITY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{3})-").expect("city code pattern is valid"));

static DISPLAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{3})-([^-]+)").expect("display name pattern is valid"));

/// First `-DDD-` code in a book folder name.
///
/// Names with several hyphen-delimited three-digit groups route by the
/// leftmost one.
pub fn city_code(name: &str) -> Option<&str> {
    CITY_CODE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Short label for a book folder: `"297 - 42"` for `"x-297-00042-y"`.
///
/// Falls back to the first 15 characters of the name.
pub fn book_display_name(name: &str) -> String {
    if let Some(caps) = DISPLAY_NAME.captures(name) {
        let code = &caps[1];
        let digits: String = caps[2].chars().filter(|c| c.is_ascii_digit()).take(5).collect();
        let trimmed = digits.trim_start_matches('0');
        let id = if trimmed.is_empty() { "0" } else { trimmed };
        return format!("{} - {}", code, id);
    }
    name.chars().take(15).collect()
}

/// Plan moves for every folder under `books_root`, using `date` for the
/// archive subfolder
pub fn plan_transfer(
    books_root: &Path,
    routes: &BTreeMap<String, PathBuf>,
    date: NaiveDate,
) -> Result<TransferPlan> {
    if !books_root.is_dir() {
        return Err(StationError::InvalidDirectory(books_root.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(books_root)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort_by(|a, b| natural_cmp(a, b));

    let date_dir = date.format(ARCHIVE_DATE_FORMAT).to_string();
    let mut plan = TransferPlan::default();

    for name in names {
        let Some(code) = city_code(&name) else {
            log::warn!("No city code in staged book {}", name);
            plan.warnings.push(format!("No city code found in: {}", name));
            continue;
        };

        let Some(root) = routes.get(code).filter(|root| root.is_dir()) else {
            log::warn!("No archive route for city {} ({})", code, name);
            plan.warnings
                .push(format!("Invalid path for city {}: {}", code, name));
            continue;
        };

        let destination_parent = root.join(&date_dir);
        plan.moves.push(TransferMove {
            source: books_root.join(&name),
            destination: destination_parent.join(&name),
            destination_parent,
            name,
        });
    }

    Ok(plan)
}

/// Async planning for today's date
pub async fn prepare_transfer(
    books_root: impl AsRef<Path>,
    routes: BTreeMap<String, PathBuf>,
) -> Result<TransferPlan> {
    let books_root = books_root.as_ref().to_path_buf();
    let today = Local::now().date_naive();
    tokio::task::spawn_blocking(move || plan_transfer(&books_root, &routes, today)).await?
}

/// Move the confirmed books and log each one.
///
/// Cancellation is checked before each book. The first failure aborts the
/// batch; earlier books remain transferred and logged.
pub async fn execute_transfer<F>(
    moves: Vec<TransferMove>,
    log_store: Arc<dyn CompletedLog>,
    cancel: CancellationToken,
    on_moved: F,
) -> Result<TransferSummary>
where
    F: FnMut(&TransferMove, usize) + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        execute_transfer_sync(&moves, log_store.as_ref(), &cancel, on_moved)
    })
    .await?
}

fn execute_transfer_sync<F>(
    moves: &[TransferMove],
    log_store: &dyn CompletedLog,
    cancel: &CancellationToken,
    mut on_moved: F,
) -> Result<TransferSummary>
where
    F: FnMut(&TransferMove, usize),
{
    let mut transferred = 0;

    for planned in moves {
        if cancel.is_cancelled() {
            log::info!("Transfer cancelled after {} books", transferred);
            return Ok(TransferSummary {
                transferred,
                cancelled: true,
            });
        }

        if planned.destination.exists() {
            return Err(StationError::DestinationExists(planned.destination.clone()));
        }

        std::fs::create_dir_all(&planned.destination_parent)?;
        move_dir(&planned.source, &planned.destination)?;

        let pages = count_pages(&planned.destination);
        log_store.append(CompletedBookLogEntry {
            name: planned.name.clone(),
            pages,
            path: planned.destination.clone(),
            timestamp: Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        })?;

        transferred += 1;
        log::info!(
            "Transferred {} ({} pages) to {}",
            planned.name,
            pages,
            planned.destination.display()
        );
        on_moved(planned, pages);
    }

    Ok(TransferSummary {
        transferred,
        cancelled: false,
    })
}
