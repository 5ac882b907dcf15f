use crate::natural::{natural_cmp_paths, sort_paths};
use crate::types::ScannerMode;
use std::path::{Path, PathBuf};

/// Navigation stepping over the page list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageMode {
    /// Pages shown as left/right pairs (`i`, `i + 1`)
    #[default]
    Dual,
    /// One page at a time
    Single,
}

impl PageMode {
    pub fn step(self) -> usize {
        match self {
            PageMode::Dual => 2,
            PageMode::Single => 1,
        }
    }
}

impl From<ScannerMode> for PageMode {
    fn from(mode: ScannerMode) -> Self {
        match mode {
            ScannerMode::DualScan => PageMode::Dual,
            ScannerMode::SingleSplit => PageMode::Single,
        }
    }
}

/// Naturally ordered scan paths plus a navigation cursor.
///
/// After every mutation the cursor satisfies
/// `cursor <= max(0, len - step)`; an empty sequence has cursor 0.
#[derive(Debug, Clone, Default)]
pub struct PageSequence {
    files: Vec<PathBuf>,
    cursor: usize,
    mode: PageMode,
}

impl PageSequence {
    pub fn new(mode: PageMode) -> Self {
        Self {
            files: Vec::new(),
            cursor: 0,
            mode,
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mode(&self) -> PageMode {
        self.mode
    }

    pub fn step(&self) -> usize {
        self.mode.step()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|p| p == path)
    }

    /// Largest valid cursor for the current length and step
    pub fn max_cursor(&self) -> usize {
        self.files.len().saturating_sub(self.step())
    }

    /// Pages visible at the cursor: up to two in dual mode, one in single mode
    pub fn visible(&self) -> &[PathBuf] {
        let start = self.cursor.min(self.files.len());
        let end = (start + self.step()).min(self.files.len());
        &self.files[start..end]
    }

    pub fn has_next(&self) -> bool {
        self.cursor + self.step() < self.files.len()
    }

    pub fn has_prev(&self) -> bool {
        !self.files.is_empty() && self.cursor > 0
    }

    /// Replace the contents with a freshly sorted list
    pub fn set_files(&mut self, mut files: Vec<PathBuf>) {
        sort_paths(&mut files);
        files.dedup();
        self.files = files;
        self.clamp();
    }

    /// Insert a path and re-sort. Returns `false` if it was already present.
    pub fn append_and_resort(&mut self, path: PathBuf) -> bool {
        if self.contains(&path) {
            return false;
        }
        self.files.push(path);
        self.files.sort_by(|a, b| natural_cmp_paths(a, b));
        self.clamp();
        true
    }

    /// Move forward one step. Returns `false` at the end.
    pub fn advance(&mut self) -> bool {
        let target = (self.cursor + self.step()).min(self.max_cursor());
        if target <= self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    /// Move back one step. Returns `false` at the start.
    pub fn retreat(&mut self) -> bool {
        let target = self.cursor.saturating_sub(self.step());
        if target == self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    pub fn jump_to_end(&mut self) {
        self.cursor = self.max_cursor();
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.clamp();
    }

    /// Remove every entry matching one of `paths`. Returns the number removed.
    pub fn remove(&mut self, paths: &[PathBuf]) -> usize {
        let before = self.files.len();
        self.files.retain(|p| !paths.contains(p));
        self.clamp();
        before - self.files.len()
    }

    /// Remove `old` entries and insert `new` ones in a single re-sort
    pub fn replace(&mut self, old: &[PathBuf], new: Vec<PathBuf>) {
        self.files.retain(|p| !old.contains(p));
        for path in new {
            if !self.contains(&path) {
                self.files.push(path);
            }
        }
        self.files.sort_by(|a, b| natural_cmp_paths(a, b));
        self.clamp();
    }

    pub fn set_mode(&mut self, mode: PageMode) {
        self.mode = mode;
        self.clamp();
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.cursor = 0;
    }

    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.max_cursor());
    }
}
