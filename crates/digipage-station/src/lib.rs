pub mod handlers;
pub mod logger;
pub mod rate;
pub mod replace;
pub mod station;
pub mod worker;

pub use logger::{AppLogger, LogEntry};
pub use rate::ScanRate;
pub use replace::{ReplaceProgress, ReplaceSession};
pub use station::{Observer, PageView, Station, StationEvent};
pub use worker::{WorkerContext, worker_task};
