//! Shared constants for the digitization station
//!
//! File conventions and default timings used across the watcher, the
//! transform engine and the book/transfer operations.

use std::time::Duration;

// =============================================================================
// Scan Files
// =============================================================================

/// Image extensions accepted as scans (lower-case, without the dot)
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Minimum crop width/height the editing surface allows
pub const MIN_CROP_SIZE: u32 = 20;

// =============================================================================
// Single-Split Artifacts
// =============================================================================

/// Subdirectory of the scan folder receiving split pages
pub const FINAL_DIR: &str = "final";

/// Per-scan-folder layout sidecar written by the editing surface
pub const LAYOUT_FILE: &str = "layout_data.json";

/// Suffix of the left half of a split page
pub const LEFT_SUFFIX: &str = "_L";

/// Suffix of the right half of a split page
pub const RIGHT_SUFFIX: &str = "_R";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_BACKUP_DIR: &str = "scan_viewer_backups";

pub const DEFAULT_LOG_FILE: &str = "books_complete_log.json";

/// How long a new file may keep changing size before it is dropped
pub const DEFAULT_STABILITY_TIMEOUT: Duration = Duration::from_millis(3000);

/// Interval between size polls
pub const DEFAULT_STABILITY_INTERVAL: Duration = Duration::from_millis(100);

// =============================================================================
// Book Naming
// =============================================================================

/// Width of the zero-padded page index inside a book folder
pub const PAGE_INDEX_WIDTH: usize = 4;

/// Date subfolder format inside a city archive (`day-month`)
pub const ARCHIVE_DATE_FORMAT: &str = "%d-%m";

/// Key format of the completed-book log
pub const LOG_DATE_FORMAT: &str = "%Y-%m-%d";
