use crate::options::ProbeOptions;
use crate::types::*;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of waiting for a file to finish being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Two consecutive polls saw the same non-zero size
    Stable { size: u64 },
    /// The file disappeared before it settled
    Vanished,
    /// The size kept changing (or stayed zero) until the timeout
    TimedOut,
}

impl Stability {
    pub fn is_stable(&self) -> bool {
        matches!(self, Stability::Stable { .. })
    }
}

/// Poll the size of `path` until it stops changing.
///
/// Blocks the calling thread for up to `options.timeout`. Transient errors
/// such as a writer holding a lock are retried within the same budget.
pub fn wait_for_stable(path: &Path, options: &ProbeOptions) -> Stability {
    let deadline = Instant::now() + options.timeout;
    let mut last_size = None;

    loop {
        match std::fs::metadata(path) {
            Ok(meta) => {
                let size = meta.len();
                if size > 0 && last_size == Some(size) {
                    return Stability::Stable { size };
                }
                last_size = Some(size);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => return Stability::Vanished,
            Err(e) => {
                log::debug!("Retrying size probe of {}: {}", path.display(), e);
            }
        }

        if Instant::now() >= deadline {
            return Stability::TimedOut;
        }
        std::thread::sleep(options.interval);
    }
}

/// Async wrapper running the probe on the blocking pool
pub async fn probe(path: impl Into<PathBuf>, options: ProbeOptions) -> Result<Stability> {
    let path = path.into();
    let stability = tokio::task::spawn_blocking(move || wait_for_stable(&path, &options)).await?;
    Ok(stability)
}
