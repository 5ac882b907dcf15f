use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Not a directory: {}", .0.display())]
    InvalidDirectory(PathBuf),
    #[error("{file}: {source}")]
    Transform {
        file: String,
        #[source]
        source: Box<StationError>,
    },
    #[error("Failed to move {file}: {source}")]
    BookMove {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
    #[error("Region is empty after clamping to the bounds of {file}")]
    EmptyRegion { file: String },
    #[error("No backup found for {file}")]
    NoBackup { file: String },
}

impl StationError {
    /// Attach the affected file name to a transform failure
    pub fn transform(path: &Path, source: StationError) -> Self {
        StationError::Transform {
            file: display_name(path),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, StationError>;

/// Human-readable file name used in error and status messages
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Scanner workflow, which also fixes the navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScannerMode {
    /// Two page images per spread, navigated as left/right pairs
    #[default]
    DualScan,
    /// One wide image per spread, later split into two pages
    SingleSplit,
}

/// Rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with a `width` x `height` image. Returns `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CropRegion> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(CropRegion::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// Rectangle expressed as fractions (0..1) of the source image dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatioRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RatioRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Convert to a pixel rectangle for a `width` x `height` image.
    ///
    /// Edges are truncated toward zero and negative values are treated as zero,
    /// so the result may still need clamping against the image bounds.
    pub fn to_pixels(&self, width: u32, height: u32) -> CropRegion {
        let w = width as f64;
        let h = height as f64;
        let left = (self.x * w).max(0.0) as u32;
        let top = (self.y * h).max(0.0) as u32;
        let right = ((self.x + self.w) * w).max(0.0) as u32;
        let bottom = ((self.y + self.h) * h).max(0.0) as u32;

        CropRegion::new(
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        )
    }
}

/// Left/right page rectangles for splitting one wide scan
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitLayout {
    pub left: RatioRect,
    pub right: RatioRect,
    pub left_enabled: bool,
    pub right_enabled: bool,
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self {
            left: RatioRect::new(0.0, 0.0, 0.5, 1.0),
            right: RatioRect::new(0.5, 0.0, 0.5, 1.0),
            left_enabled: true,
            right_enabled: true,
        }
    }
}

/// Files written (and removed) by a two-page split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub left: Option<PathBuf>,
    pub right: Option<PathBuf>,
    /// Stale outputs deleted because their side was disabled
    pub removed: Vec<PathBuf>,
}

/// A planned relocation of one staged book into its city archive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferMove {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub destination_parent: PathBuf,
}

/// Result of the planning phase: the moves to confirm plus skipped books
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferPlan {
    pub moves: Vec<TransferMove>,
    pub warnings: Vec<String>,
}

impl TransferPlan {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    pub transferred: usize,
    pub cancelled: bool,
}

/// One row of the completed-book log
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompletedBookLogEntry {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pages: usize,
    pub path: PathBuf,
    /// ISO-8601 local timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookOutcome {
    Completed { folder: PathBuf, pages: usize },
    Cancelled,
}

/// Staged and archived work for the current day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationStats {
    /// Page count per staged book folder
    pub staged: BTreeMap<String, usize>,
    pub archived_pages: usize,
    pub archived_books: Vec<CompletedBookLogEntry>,
}

impl StationStats {
    pub fn staged_pages(&self) -> usize {
        self.staged.values().sum()
    }
}
