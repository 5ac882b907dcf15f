use crate::constants::ALLOWED_EXTENSIONS;
use crate::natural::sort_paths;
use crate::types::*;
use std::path::{Path, PathBuf};

/// Whether `path` carries one of the accepted image extensions
pub fn is_allowed_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List the images directly inside `dir`, naturally sorted by file name
pub async fn scan_directory(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || scan_directory_sync(&dir)).await?
}

pub fn scan_directory_sync(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(StationError::InvalidDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_allowed_image(&path) {
            files.push(path);
        }
    }

    sort_paths(&mut files);
    Ok(files)
}

/// Number of page images directly inside `dir`
pub fn count_pages(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_allowed_image(path))
            .count(),
        Err(e) => {
            log::warn!("Could not count pages in {}: {}", dir.display(), e);
            0
        }
    }
}
