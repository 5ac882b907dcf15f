//! Book assembly
//!
//! Staged pages are moved into `<books root>/<name>/` and renamed
//! `0001.ext`, `0002.ext`, ... in natural order. The operation is
//! all-or-nothing for the caller: on cancellation or on the first failed
//! move, every page already moved is put back where it came from and a
//! freshly created book folder is removed again.

use crate::cancel::CancellationToken;
use crate::constants::{FINAL_DIR, LAYOUT_FILE, PAGE_INDEX_WIDTH};
use crate::fsops::move_file;
use crate::natural::sort_paths;
use crate::scan::is_allowed_image;
use crate::types::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Moves staged pages into numbered book folders
#[derive(Debug, Clone)]
pub struct BookAssembler {
    books_root: PathBuf,
}

impl BookAssembler {
    pub fn new(books_root: impl Into<PathBuf>) -> Self {
        Self {
            books_root: books_root.into(),
        }
    }

    pub fn books_root(&self) -> &Path {
        &self.books_root
    }

    /// Assemble `pages` into the book `name`.
    ///
    /// `progress(done, total)` is called after each page. `source_hint` is the
    /// folder the pages were taken from; when it is a `final/` split folder the
    /// original scans, the split folder and the layout sidecar are removed
    /// after a successful run.
    pub async fn assemble<F>(
        &self,
        name: &str,
        pages: Vec<PathBuf>,
        source_hint: Option<PathBuf>,
        cancel: CancellationToken,
        progress: F,
    ) -> Result<BookOutcome>
    where
        F: FnMut(usize, usize) + Send + 'static,
    {
        validate_book_name(name)?;
        if pages.is_empty() {
            return Err(StationError::Config(format!(
                "No pages selected for book {}",
                name
            )));
        }

        let target = self.books_root.join(name);
        tokio::task::spawn_blocking(move || {
            assemble_sync(&target, pages, source_hint.as_deref(), &cancel, progress)
        })
        .await?
    }
}

fn validate_book_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed != name
        || name.contains(['/', '\\'])
        || name == "."
        || name == ".."
    {
        return Err(StationError::Config(format!("Invalid book name: {:?}", name)));
    }
    Ok(())
}

/// A page moved into the book, remembered for rollback
struct MovedPage {
    from: PathBuf,
    to: PathBuf,
}

fn assemble_sync<F>(
    target: &Path,
    mut pages: Vec<PathBuf>,
    source_hint: Option<&Path>,
    cancel: &CancellationToken,
    mut progress: F,
) -> Result<BookOutcome>
where
    F: FnMut(usize, usize),
{
    let created = !target.is_dir();
    std::fs::create_dir_all(target)?;

    // Reused folders keep their pages; numbering continues after the highest
    let first_index = if created { 1 } else { next_page_index(target)? };

    sort_paths(&mut pages);
    let total = pages.len();
    let mut moved: Vec<MovedPage> = Vec::with_capacity(total);

    for (i, page) in pages.iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Book {} cancelled after {} of {} pages", display_name(target), i, total);
            roll_back(target, &moved, created);
            return Ok(BookOutcome::Cancelled);
        }

        if page.is_file() {
            let dest = target.join(page_file_name(first_index + moved.len(), page));
            let result = if dest.exists() {
                Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("{} already exists", dest.display()),
                ))
            } else {
                move_file(page, &dest)
            };
            if let Err(source) = result {
                roll_back(target, &moved, created);
                return Err(StationError::BookMove {
                    file: display_name(page),
                    source,
                });
            }
            moved.push(MovedPage {
                from: page.clone(),
                to: dest,
            });
        } else {
            log::warn!("Skipping missing page {}", page.display());
        }

        progress(i + 1, total);
    }

    if let Some(final_dir) = source_hint.and_then(find_final_dir) {
        clean_split_artifacts(final_dir);
    }

    log::info!("Created book {} with {} pages", display_name(target), moved.len());
    Ok(BookOutcome::Completed {
        folder: target.to_path_buf(),
        pages: moved.len(),
    })
}

/// One past the largest numeric file stem in `folder`
fn next_page_index(folder: &Path) -> Result<usize> {
    let mut highest = 0;
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(index) = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<usize>().ok())
        {
            highest = highest.max(index);
        }
    }
    Ok(highest + 1)
}

/// `0007.jpg` for index 7 and a `.jpg` source
fn page_file_name(index: usize, source: &Path) -> String {
    match source.extension() {
        Some(ext) => format!(
            "{:0width$}.{}",
            index,
            ext.to_string_lossy(),
            width = PAGE_INDEX_WIDTH
        ),
        None => format!("{:0width$}", index, width = PAGE_INDEX_WIDTH),
    }
}

fn roll_back(target: &Path, moved: &[MovedPage], created: bool) {
    for page in moved.iter().rev() {
        if let Err(e) = move_file(&page.to, &page.from) {
            log::error!(
                "Could not return {} to {}: {}",
                page.to.display(),
                page.from.display(),
                e
            );
        }
    }

    if created {
        if let Err(e) = std::fs::remove_dir_all(target) {
            log::error!("Could not remove {}: {}", target.display(), e);
        }
    }
}

fn find_final_dir(hint: &Path) -> Option<&Path> {
    hint.ancestors()
        .find(|dir| dir.file_name() == Some(OsStr::new(FINAL_DIR)))
}

/// Remove the original wide scans, the `final/` folder and the layout sidecar
fn clean_split_artifacts(final_dir: &Path) {
    let Some(scan_dir) = final_dir.parent() else {
        return;
    };

    match std::fs::read_dir(scan_dir) {
        Ok(entries) => {
            for path in entries.filter_map(|e| e.ok()).map(|e| e.path()) {
                if path.is_file() && is_allowed_image(&path) {
                    if let Err(e) = std::fs::remove_file(&path) {
                        log::warn!("Could not remove scan {}: {}", path.display(), e);
                    }
                }
            }
        }
        Err(e) => log::warn!("Could not list {}: {}", scan_dir.display(), e),
    }

    if let Err(e) = std::fs::remove_dir_all(final_dir) {
        log::warn!("Could not remove {}: {}", final_dir.display(), e);
    }

    let layout = scan_dir.join(LAYOUT_FILE);
    if layout.exists() {
        if let Err(e) = std::fs::remove_file(&layout) {
            log::warn!("Could not remove {}: {}", layout.display(), e);
        }
    }

    log::debug!("Cleaned split artifacts in {}", scan_dir.display());
}
