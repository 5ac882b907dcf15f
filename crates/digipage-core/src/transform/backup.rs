use std::path::{Path, PathBuf};

pub(crate) fn backup_path(backup_dir: &Path, path: &Path) -> Option<PathBuf> {
    path.file_name().map(|name| backup_dir.join(name))
}

/// Copy `path` into `backup_dir` unless a backup already exists.
///
/// Failures are logged and otherwise ignored. Returns whether a copy was made.
pub(crate) fn backup_if_absent(backup_dir: &Path, path: &Path) -> bool {
    let Some(dest) = backup_path(backup_dir, path) else {
        return false;
    };
    if dest.exists() {
        return false;
    }

    let result = std::fs::create_dir_all(backup_dir).and_then(|_| std::fs::copy(path, &dest));
    match result {
        Ok(_) => {
            log::debug!("Backed up {} to {}", path.display(), dest.display());
            true
        }
        Err(e) => {
            log::warn!("Backup of {} failed: {}", path.display(), e);
            false
        }
    }
}
