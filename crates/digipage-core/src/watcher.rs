//! Scan folder watcher
//!
//! notify delivers raw events on its own thread; they are forwarded to a
//! dedicated watch thread which filters them, waits for new files to finish
//! being written, and publishes [`WatchEvent`]s on the caller's channel.

use crate::options::ProbeOptions;
use crate::scan::is_allowed_image;
use crate::stability::{Stability, wait_for_stable};
use crate::types::*;
use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tokio::sync::mpsc;

/// Events published by [`FolderWatcher`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A new image arrived and has finished being written
    NewImage(PathBuf),
    /// Something was deleted or moved; the listing should be refreshed
    FolderChanged,
    Error(String),
    /// The watcher has stopped (or never started)
    Finished,
}

enum RawMessage {
    Event(Event),
    Failure(notify::Error),
    Shutdown,
}

/// Watches one directory (non-recursive) for new, removed and moved scans
pub struct FolderWatcher {
    dir: PathBuf,
    watcher: Option<RecommendedWatcher>,
    raw_tx: mpsc::UnboundedSender<RawMessage>,
    thread: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<WatchEvent>,
}

impl FolderWatcher {
    /// Start watching `dir`.
    ///
    /// On failure an `Error` followed by `Finished` is published before the
    /// error is returned.
    pub fn start(
        dir: impl Into<PathBuf>,
        probe: ProbeOptions,
        events: mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<Self> {
        let dir = dir.into();
        match Self::spawn(&dir, probe, &events) {
            Ok(watcher) => {
                log::info!("Watching scan folder {}", dir.display());
                Ok(watcher)
            }
            Err(e) => {
                log::error!("Failed to watch {}: {}", dir.display(), e);
                let _ = events.send(WatchEvent::Error(format!(
                    "Could not watch {}: {}",
                    dir.display(),
                    e
                )));
                let _ = events.send(WatchEvent::Finished);
                Err(e)
            }
        }
    }

    fn spawn(
        dir: &Path,
        probe: ProbeOptions,
        events: &mpsc::UnboundedSender<WatchEvent>,
    ) -> Result<Self> {
        if !dir.is_dir() {
            return Err(StationError::InvalidDirectory(dir.to_path_buf()));
        }

        let (raw_tx, raw_rx) = mpsc::unbounded_channel();
        let callback_tx = raw_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| {
                let message = match res {
                    Ok(event) => RawMessage::Event(event),
                    Err(e) => RawMessage::Failure(e),
                };
                let _ = callback_tx.send(message);
            },
            Config::default(),
        )?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        let thread_events = events.clone();
        let thread = std::thread::Builder::new()
            .name("folder-watcher".to_string())
            .spawn(move || watch_loop(raw_rx, thread_events, probe))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            watcher: Some(watcher),
            raw_tx,
            thread: Some(thread),
            events: events.clone(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// Stop watching, join the watch thread, then publish `Finished`
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        // Unregisters the OS watch and drops the callback's sender
        self.watcher.take();
        let _ = self.raw_tx.send(RawMessage::Shutdown);
        if thread.join().is_err() {
            log::error!("Watch thread for {} panicked", self.dir.display());
        }

        log::info!("Stopped watching {}", self.dir.display());
        let _ = self.events.send(WatchEvent::Finished);
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch_loop(
    mut raw_rx: mpsc::UnboundedReceiver<RawMessage>,
    events: mpsc::UnboundedSender<WatchEvent>,
    probe: ProbeOptions,
) {
    while let Some(message) = raw_rx.blocking_recv() {
        match message {
            RawMessage::Shutdown => break,
            RawMessage::Failure(e) => {
                log::warn!("Watch error: {}", e);
                let _ = events.send(WatchEvent::Error(format!("Watch error: {}", e)));
            }
            RawMessage::Event(event) => handle_event(event, &events, &probe),
        }
    }
}

fn handle_event(event: Event, events: &mpsc::UnboundedSender<WatchEvent>, probe: &ProbeOptions) {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => {}
        EventKind::Create(_) => {
            for path in event.paths {
                if is_allowed_image(&path) {
                    announce_when_stable(path, events, probe);
                }
            }
        }
        EventKind::Remove(RemoveKind::Folder) => {}
        EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
            if event.paths.iter().any(|path| !path.is_dir()) {
                let _ = events.send(WatchEvent::FolderChanged);
            }
        }
        _ => {}
    }
}

fn announce_when_stable(
    path: PathBuf,
    events: &mpsc::UnboundedSender<WatchEvent>,
    probe: &ProbeOptions,
) {
    match wait_for_stable(&path, probe) {
        Stability::Stable { size } => {
            log::debug!("New scan {} ({} bytes)", path.display(), size);
            let _ = events.send(WatchEvent::NewImage(path));
        }
        Stability::Vanished => {
            log::warn!("Dropped {}: removed while being written", path.display());
        }
        Stability::TimedOut => {
            log::warn!("Dropped {}: file did not stabilize", path.display());
        }
    }
}
