use super::backup::backup_path;
use super::split::split_output_paths;
use crate::fsops::move_file;
use crate::types::*;
use std::path::{Path, PathBuf};

pub(super) fn delete_sync(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

pub(super) fn delete_with_split_artifacts_sync(path: &Path) -> Result<Vec<PathBuf>> {
    let (left, right) = split_output_paths(path);
    let mut removed = Vec::new();

    for candidate in [path.to_path_buf(), left, right] {
        if candidate.exists() {
            std::fs::remove_file(&candidate)?;
            removed.push(candidate);
        }
    }

    Ok(removed)
}

pub(super) fn restore_sync(backup_dir: &Path, path: &Path) -> Result<()> {
    let backup = backup_path(backup_dir, path)
        .filter(|backup| backup.is_file())
        .ok_or_else(|| StationError::NoBackup {
            file: display_name(path),
        })?;

    std::fs::copy(&backup, path)?;
    log::info!("Restored {} from backup", display_name(path));
    Ok(())
}

/// Path the replacement takes: the old file's stem with the new file's extension
fn replacement_target(old: &Path, new: &Path) -> PathBuf {
    match new.extension() {
        Some(ext) => old.with_extension(ext),
        None => old.with_extension(""),
    }
}

pub(super) fn replace_pair_sync(old: &[PathBuf; 2], new: &[PathBuf; 2]) -> Result<[PathBuf; 2]> {
    for path in new {
        if !path.is_file() {
            return Err(StationError::transform(
                path,
                StationError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)),
            ));
        }
    }

    for path in old {
        delete_sync(path).map_err(|e| StationError::transform(path, e))?;
    }

    let targets = [
        replacement_target(&old[0], &new[0]),
        replacement_target(&old[1], &new[1]),
    ];
    for (source, target) in new.iter().zip(&targets) {
        if source != target {
            move_file(source, target).map_err(|e| StationError::transform(source, e.into()))?;
        }
    }

    Ok(targets)
}
