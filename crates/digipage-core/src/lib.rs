pub mod book;
mod cancel;
mod completed_log;
pub mod constants;
mod fsops;
mod natural;
mod options;
mod scan;
pub mod sequence;
mod stability;
mod stats;
pub mod transfer;
pub mod transform;
mod types;
pub mod watcher;

pub use book::BookAssembler;
pub use cancel::CancellationToken;
#[cfg(feature = "serde")]
pub use completed_log::JsonLogStore;
pub use completed_log::CompletedLog;
pub use natural::{natural_cmp, natural_cmp_paths, sort_paths};
pub use options::*;
pub use scan::{count_pages, is_allowed_image, scan_directory, scan_directory_sync};
pub use sequence::{PageMode, PageSequence};
pub use stability::{Stability, probe, wait_for_stable};
pub use stats::{calculate_stats, calculate_stats_sync};
pub use transfer::{
    book_display_name, city_code, execute_transfer, plan_transfer, prepare_transfer,
};
pub use transform::{TransformEngine, zoom_factor};
pub use types::*;
pub use watcher::{FolderWatcher, WatchEvent};
