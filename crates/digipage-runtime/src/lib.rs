use std::path::PathBuf;
use tokio::sync::mpsc;

// Re-export types from the core library
pub use digipage_core::{
    CancellationToken, CropRegion, SplitLayout, StationStats, TransferMove, TransferPlan,
};

/// Commands sent from the controller to the worker
#[derive(Debug)]
pub enum StationCommand {
    ScanDirectory,
    CalculateStats,
    Crop {
        path: PathBuf,
        region: CropRegion,
    },
    Rotate {
        path: PathBuf,
        angle_degrees: f64,
    },
    /// Single-split mode: write `final/{stem}_L` and `final/{stem}_R`.
    /// `auto` marks the split the station issues for each new scan; it is
    /// reported back as [`OperationKind::AutoSplit`].
    SplitTwoPage {
        path: PathBuf,
        layout: SplitLayout,
        auto: bool,
    },
    /// Dual mode: cut one image at a pixel column, replacing it with two
    SplitAt {
        path: PathBuf,
        x: u32,
    },
    Delete {
        path: PathBuf,
    },
    /// Delete a scan and its split pages
    DeleteWithArtifacts {
        path: PathBuf,
    },
    Restore {
        path: PathBuf,
    },
    ReplacePair {
        old: [PathBuf; 2],
        new: [PathBuf; 2],
    },
    CreateBook {
        name: String,
        pages: Vec<PathBuf>,
        source_hint: Option<PathBuf>,
        cancel: CancellationToken,
    },
    PrepareTransfer,
    ExecuteTransfer {
        moves: Vec<TransferMove>,
        cancel: CancellationToken,
    },
}

/// Kind of a finished operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Crop,
    Rotate,
    PageSplit,
    AutoSplit,
    Split,
    Delete,
    Restore,
    ReplacePair,
    CreateBook,
    CreateBookCancelled,
    Transfer,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Crop => "crop",
            OperationKind::Rotate => "rotate",
            OperationKind::PageSplit => "page_split",
            OperationKind::AutoSplit => "auto_split",
            OperationKind::Split => "split",
            OperationKind::Delete => "delete",
            OperationKind::Restore => "restore",
            OperationKind::ReplacePair => "replace_pair",
            OperationKind::CreateBook => "create_book",
            OperationKind::CreateBookCancelled => "create_book_cancelled",
            OperationKind::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Updates sent from the worker to the controller
#[derive(Debug, Clone)]
pub enum StationUpdate {
    ScanComplete {
        files: Vec<PathBuf>,
    },
    StatsCalculated {
        stats: StationStats,
    },
    OperationComplete {
        kind: OperationKind,
        /// Files created, changed or removed by the operation
        paths: Vec<PathBuf>,
        /// Book name or summary text
        message: String,
    },
    BookProgress {
        done: usize,
        total: usize,
    },
    TransferPlanReady {
        plan: TransferPlan,
    },
    Error {
        /// Operation that failed, if the error belongs to one
        kind: Option<OperationKind>,
        message: String,
    },
}

pub type CommandSender = mpsc::UnboundedSender<StationCommand>;
pub type CommandReceiver = mpsc::UnboundedReceiver<StationCommand>;
pub type UpdateSender = mpsc::UnboundedSender<StationUpdate>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<StationUpdate>;

/// Command and update channels connecting a controller to its worker
pub fn channels() -> ((CommandSender, CommandReceiver), (UpdateSender, UpdateReceiver)) {
    (mpsc::unbounded_channel(), mpsc::unbounded_channel())
}
