use crate::completed_log::CompletedLog;
use crate::scan::count_pages;
use crate::types::*;
use std::path::Path;
use std::sync::Arc;

/// Calculate staged and archived totals for today
pub async fn calculate_stats(
    books_root: impl AsRef<Path>,
    log_store: Arc<dyn CompletedLog>,
) -> Result<StationStats> {
    let books_root = books_root.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || calculate_stats_sync(&books_root, log_store.as_ref()))
        .await?
}

pub fn calculate_stats_sync(books_root: &Path, log_store: &dyn CompletedLog) -> Result<StationStats> {
    let mut stats = StationStats::default();

    // A books root that does not exist yet simply has nothing staged
    if books_root.is_dir() {
        for entry in std::fs::read_dir(books_root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let name = entry.file_name().to_string_lossy().into_owned();
                stats.staged.insert(name, count_pages(&entry.path()));
            }
        }
    }

    let (pages, books) = log_store.today()?;
    stats.archived_pages = pages;
    stats.archived_books = books;

    Ok(stats)
}
