//! File moves used by book assembly and transfer

use std::io::{self, ErrorKind};
use std::path::Path;

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == ErrorKind::CrossesDevices
}

/// Move a file, copying then deleting when the rename crosses filesystems
pub fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    match std::fs::rename(src, dst) {
        Err(e) if is_cross_device(&e) => {
            std::fs::copy(src, dst)?;
            std::fs::remove_file(src)
        }
        other => other,
    }
}

/// Move a directory tree, with a recursive copy fallback across filesystems
pub fn move_dir(src: &Path, dst: &Path) -> io::Result<()> {
    match std::fs::rename(src, dst) {
        Err(e) if is_cross_device(&e) => {
            copy_dir(src, dst)?;
            std::fs::remove_dir_all(src)
        }
        other => other,
    }
}

fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
