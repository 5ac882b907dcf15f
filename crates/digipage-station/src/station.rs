//! Station controller
//!
//! Owns the page sequence and the interaction state (edit lock, replace
//! session, pending transfer, in-flight cancellation token), routes commands
//! to the worker and folds worker updates and watcher events back into that
//! state. Presentation layers subscribe with observer callbacks.

use digipage_core::{
    CancellationToken, CropRegion, FolderWatcher, PageMode, PageSequence, Result, ScannerMode,
    SplitLayout, StationConfig, StationError, TransferMove, TransferPlan, WatchEvent,
    scan_directory,
};
use digipage_runtime::{
    CommandSender, OperationKind, StationCommand, StationUpdate, UpdateReceiver, UpdateSender,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::rate::ScanRate;
use crate::replace::{ReplaceProgress, ReplaceSession};
use crate::worker::{WorkerContext, worker_task};

/// What the viewer should currently show
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub cursor: usize,
    pub total: usize,
    /// One path in single mode, up to two in dual mode
    pub pages: Vec<PathBuf>,
    pub has_next: bool,
    pub has_prev: bool,
    pub editing: bool,
    pub replacing: bool,
}

/// Notifications delivered to observers
#[derive(Debug, Clone)]
pub enum StationEvent {
    ViewChanged(PageView),
    /// Cached renderings of these files are stale
    InvalidateCache { paths: Vec<PathBuf> },
    /// Worker update passed through after the controller applied it
    Worker(StationUpdate),
    ReplaceProgress { collected: usize },
    Status(String),
}

pub type Observer = Box<dyn FnMut(&StationEvent) + Send>;

pub struct Station {
    config: StationConfig,
    sequence: PageSequence,
    editing: bool,
    replace: Option<ReplaceSession>,
    split_layout: Option<SplitLayout>,
    active_cancel: Option<CancellationToken>,
    pending_transfer: Option<TransferPlan>,
    rate: ScanRate,
    observers: Vec<Observer>,

    // Async infrastructure
    command_tx: Option<CommandSender>,
    update_tx: UpdateSender,
    update_rx: UpdateReceiver,
    worker: Option<JoinHandle<()>>,
    watcher: Option<FolderWatcher>,
    watch_tx: mpsc::UnboundedSender<WatchEvent>,
    watch_rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl Station {
    /// Validate `config`, start the watcher and the worker, and request the
    /// initial scan. Must be called from within a Tokio runtime.
    pub fn start(config: StationConfig) -> Result<Self> {
        config.validate()?;

        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (watch_tx, watch_rx) = mpsc::unbounded_channel();

        let mut station = Self {
            sequence: PageSequence::new(config.scanner_mode.into()),
            config,
            editing: false,
            replace: None,
            split_layout: None,
            active_cancel: None,
            pending_transfer: None,
            rate: ScanRate::default(),
            observers: Vec::new(),
            command_tx: None,
            update_tx,
            update_rx,
            worker: None,
            watcher: None,
            watch_tx,
            watch_rx,
        };
        station.launch()?;
        Ok(station)
    }

    fn launch(&mut self) -> Result<()> {
        let watcher = FolderWatcher::start(
            &self.config.scan_folder,
            self.config.probe_options(),
            self.watch_tx.clone(),
        )?;
        self.watcher = Some(watcher);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let context = WorkerContext::new(self.config.clone());
        self.worker = Some(tokio::spawn(worker_task(
            command_rx,
            self.update_tx.clone(),
            context,
        )));
        self.command_tx = Some(command_tx);

        self.send(StationCommand::ScanDirectory);
        self.send(StationCommand::CalculateStats);
        Ok(())
    }

    /// Register an observer for every future [`StationEvent`]
    pub fn subscribe(&mut self, observer: impl FnMut(&StationEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn publish(&mut self, event: StationEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }

    fn publish_view(&mut self) {
        let view = self.view();
        self.publish(StationEvent::ViewChanged(view));
    }

    fn status(&mut self, text: impl Into<String>) {
        self.publish(StationEvent::Status(text.into()));
    }

    fn send(&self, cmd: StationCommand) {
        match &self.command_tx {
            Some(tx) => {
                if tx.send(cmd).is_err() {
                    log::error!("Worker is gone; command dropped");
                }
            }
            None => log::warn!("Station is stopped; command dropped"),
        }
    }

    // ===== Accessors =====

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    pub fn scan_folder(&self) -> &Path {
        &self.config.scan_folder
    }

    pub fn sequence(&self) -> &PageSequence {
        &self.sequence
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn replace_session(&self) -> Option<&ReplaceSession> {
        self.replace.as_ref()
    }

    pub fn pending_transfer(&self) -> Option<&TransferPlan> {
        self.pending_transfer.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.active_cancel.is_some()
    }

    /// Pages per minute over recent arrivals
    pub fn scan_rate(&self) -> Option<f64> {
        self.rate.pages_per_minute()
    }

    pub fn view(&self) -> PageView {
        PageView {
            cursor: self.sequence.cursor(),
            total: self.sequence.len(),
            pages: self.sequence.visible().to_vec(),
            has_next: self.sequence.has_next(),
            has_prev: self.sequence.has_prev(),
            editing: self.editing,
            replacing: self.replace.is_some(),
        }
    }

    // ===== Navigation =====

    /// Step forward. Refused while editing or replacing.
    pub fn next(&mut self) -> bool {
        if self.editing || self.replace.is_some() {
            return false;
        }
        let moved = self.sequence.advance();
        if moved {
            self.publish_view();
        }
        moved
    }

    /// Step back. Refused while editing or replacing.
    pub fn prev(&mut self) -> bool {
        if self.editing || self.replace.is_some() {
            return false;
        }
        let moved = self.sequence.retreat();
        if moved {
            self.publish_view();
        }
        moved
    }

    /// Jump to the last page or pair, dropping the edit lock.
    /// Refused while replacing.
    pub fn jump_to_end(&mut self) -> bool {
        if self.replace.is_some() {
            return false;
        }
        self.editing = false;
        self.sequence.jump_to_end();
        self.publish_view();
        true
    }

    pub fn set_editing(&mut self, editing: bool) {
        if self.editing != editing {
            self.editing = editing;
            self.publish_view();
        }
    }

    pub fn set_scanner_mode(&mut self, mode: ScannerMode) {
        self.config.scanner_mode = mode;
        self.sequence.set_mode(mode.into());
        self.publish_view();
    }

    /// Layout applied to new scans in single-split mode
    pub fn set_split_layout(&mut self, layout: Option<SplitLayout>) {
        self.split_layout = layout;
    }

    /// Start or cancel a pair replacement.
    ///
    /// Starting needs a full pair on screen in dual mode. Returns whether a
    /// session is active afterwards.
    pub fn toggle_replace(&mut self) -> bool {
        if self.replace.take().is_some() {
            self.status("Replace cancelled");
            self.publish_view();
            return false;
        }

        let visible = self.sequence.visible();
        if self.sequence.mode() != PageMode::Dual || visible.len() < 2 {
            self.status("A full pair must be displayed to replace it");
            return false;
        }

        let targets = [visible[0].clone(), visible[1].clone()];
        self.replace = Some(ReplaceSession::new(targets));
        self.status("Waiting for 2 new scans to replace the pair");
        self.publish_view();
        true
    }

    // ===== Edit commands =====

    fn edits_allowed(&mut self) -> bool {
        if self.replace.is_some() {
            self.status("Finish or cancel the replacement first");
            return false;
        }
        true
    }

    pub fn crop(&mut self, path: impl Into<PathBuf>, region: CropRegion) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        self.send(StationCommand::Crop {
            path: path.into(),
            region,
        });
        true
    }

    pub fn rotate(&mut self, path: impl Into<PathBuf>, angle_degrees: f64) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        self.send(StationCommand::Rotate {
            path: path.into(),
            angle_degrees,
        });
        true
    }

    pub fn split_two_page(&mut self, path: impl Into<PathBuf>, layout: SplitLayout) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        self.send(StationCommand::SplitTwoPage {
            path: path.into(),
            layout,
            auto: false,
        });
        true
    }

    pub fn split_at(&mut self, path: impl Into<PathBuf>, x: u32) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        let path = path.into();
        self.publish(StationEvent::InvalidateCache {
            paths: vec![path.clone()],
        });
        self.send(StationCommand::SplitAt { path, x });
        true
    }

    pub fn restore(&mut self, path: impl Into<PathBuf>) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        self.send(StationCommand::Restore { path: path.into() });
        true
    }

    pub fn delete(&mut self, path: impl Into<PathBuf>) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        let path = path.into();
        self.publish(StationEvent::InvalidateCache {
            paths: vec![path.clone()],
        });
        self.send(StationCommand::Delete { path });
        true
    }

    /// Delete what is on screen: the pair in dual mode, the scan and its
    /// split pages in single-split mode
    pub fn delete_current(&mut self) -> bool {
        if !self.edits_allowed() {
            return false;
        }
        let visible = self.sequence.visible().to_vec();
        if visible.is_empty() {
            return false;
        }

        self.publish(StationEvent::InvalidateCache {
            paths: visible.clone(),
        });
        for path in visible {
            match self.sequence.mode() {
                PageMode::Dual => self.send(StationCommand::Delete { path }),
                PageMode::Single => self.send(StationCommand::DeleteWithArtifacts { path }),
            }
        }
        true
    }

    // ===== Books and transfer =====

    /// Assemble the current pages into book `name`.
    ///
    /// Dual mode takes every scan in the sequence; single-split mode takes
    /// the split pages under `final/`.
    pub async fn create_book(&mut self, name: &str) -> Result<()> {
        if self.active_cancel.is_some() {
            return Err(StationError::Config(
                "Another operation is still running".to_string(),
            ));
        }

        let (pages, source_hint) = match self.sequence.mode() {
            PageMode::Dual => (
                self.sequence.files().to_vec(),
                self.config.scan_folder.clone(),
            ),
            PageMode::Single => {
                let final_dir = self.config.final_folder();
                let pages = if final_dir.is_dir() {
                    scan_directory(&final_dir).await?
                } else {
                    Vec::new()
                };
                (pages, final_dir)
            }
        };

        if pages.is_empty() {
            return Err(StationError::Config("No pages to put in a book".to_string()));
        }

        let cancel = CancellationToken::new();
        self.active_cancel = Some(cancel.clone());
        self.send(StationCommand::CreateBook {
            name: name.to_string(),
            pages,
            source_hint: Some(source_hint),
            cancel,
        });
        Ok(())
    }

    /// Cancel the running book creation or transfer. Returns `false` if
    /// nothing cancellable is running.
    pub fn cancel_current_operation(&mut self) -> bool {
        match self.active_cancel.take() {
            Some(token) => {
                token.cancel();
                self.status("Cancelling...");
                true
            }
            None => false,
        }
    }

    pub fn prepare_transfer(&mut self) {
        self.pending_transfer = None;
        self.send(StationCommand::PrepareTransfer);
    }

    /// Execute every move of the pending plan
    pub fn confirm_transfer(&mut self) -> bool {
        let moves = match &self.pending_transfer {
            Some(plan) if !plan.moves.is_empty() => plan.moves.clone(),
            _ => return false,
        };
        self.confirm_transfer_with(moves)
    }

    /// Execute a confirmed subset of the pending plan
    pub fn confirm_transfer_with(&mut self, moves: Vec<TransferMove>) -> bool {
        if moves.is_empty() || self.active_cancel.is_some() {
            return false;
        }
        let cancel = CancellationToken::new();
        self.active_cancel = Some(cancel.clone());
        self.pending_transfer = None;
        self.send(StationCommand::ExecuteTransfer { moves, cancel });
        true
    }

    pub fn calculate_stats(&mut self) {
        self.send(StationCommand::CalculateStats);
    }

    pub fn rescan(&mut self) {
        self.send(StationCommand::ScanDirectory);
    }

    // ===== Event processing =====

    /// Apply every update and watcher event already queued. Returns how many
    /// were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(update) = self.update_rx.try_recv() {
            self.handle_update(update);
            handled += 1;
        }
        while let Ok(event) = self.watch_rx.try_recv() {
            self.handle_watch_event(event);
            handled += 1;
        }
        handled
    }

    /// Wait for the next update or watcher event and apply it
    pub async fn process_next(&mut self) {
        tokio::select! {
            Some(update) = self.update_rx.recv() => self.handle_update(update),
            Some(event) = self.watch_rx.recv() => self.handle_watch_event(event),
            else => {}
        }
    }

    fn handle_update(&mut self, update: StationUpdate) {
        match &update {
            StationUpdate::ScanComplete { files } => {
                self.sequence.set_files(files.clone());
                self.publish(StationEvent::Worker(update));
                self.publish_view();
            }
            StationUpdate::TransferPlanReady { plan } => {
                self.pending_transfer = Some(plan.clone());
                self.publish(StationEvent::Worker(update));
            }
            StationUpdate::OperationComplete { kind, paths, .. } => {
                let (kind, paths) = (*kind, paths.clone());
                self.apply_completion(kind, &paths);
                self.publish(StationEvent::Worker(update));
                self.publish_view();
            }
            StationUpdate::Error { kind, message } => {
                log::warn!("Worker reported: {}", message);
                match kind {
                    Some(OperationKind::CreateBook | OperationKind::Transfer) => {
                        self.active_cancel = None;
                    }
                    Some(
                        OperationKind::Crop
                        | OperationKind::Rotate
                        | OperationKind::Restore
                        | OperationKind::PageSplit
                        | OperationKind::Split,
                    ) => {
                        self.editing = false;
                    }
                    _ => {}
                }
                self.publish(StationEvent::Worker(update));
            }
            StationUpdate::StatsCalculated { .. } | StationUpdate::BookProgress { .. } => {
                self.publish(StationEvent::Worker(update));
            }
        }
    }

    fn apply_completion(&mut self, kind: OperationKind, paths: &[PathBuf]) {
        match kind {
            OperationKind::Crop
            | OperationKind::Rotate
            | OperationKind::Restore
            | OperationKind::PageSplit => {
                self.editing = false;
                self.invalidate(paths);
            }
            // Issued for incoming scans, so the edit lock is left alone
            OperationKind::AutoSplit => self.invalidate(paths),
            OperationKind::Split => {
                self.editing = false;
                self.invalidate(paths);
                if let Some((source, halves)) = paths.split_first() {
                    self.sequence
                        .replace(std::slice::from_ref(source), halves.to_vec());
                }
            }
            OperationKind::Delete => {
                self.invalidate(paths);
                self.sequence.remove(paths);
            }
            OperationKind::ReplacePair => {
                self.invalidate(paths);
                if paths.len() == 4 {
                    self.sequence.replace(&paths[..2], paths[2..].to_vec());
                }
            }
            OperationKind::CreateBook => {
                self.active_cancel = None;
                self.invalidate(paths);
                self.send(StationCommand::ScanDirectory);
                self.send(StationCommand::CalculateStats);
            }
            OperationKind::CreateBookCancelled => {
                self.active_cancel = None;
            }
            OperationKind::Transfer => {
                self.active_cancel = None;
                self.send(StationCommand::CalculateStats);
            }
        }
    }

    fn invalidate(&mut self, paths: &[PathBuf]) {
        if !paths.is_empty() {
            self.publish(StationEvent::InvalidateCache {
                paths: paths.to_vec(),
            });
        }
    }

    fn handle_watch_event(&mut self, event: WatchEvent) {
        match event {
            WatchEvent::NewImage(path) => self.on_new_image(path),
            WatchEvent::FolderChanged => self.send(StationCommand::ScanDirectory),
            WatchEvent::Error(message) => {
                log::warn!("Watcher error: {}", message);
                self.status(format!("Watcher error: {}", message));
            }
            WatchEvent::Finished => log::debug!("Watcher finished"),
        }
    }

    fn on_new_image(&mut self, path: PathBuf) {
        if let Some(session) = self.replace.as_mut() {
            match session.push(path) {
                ReplaceProgress::Collecting(collected) => {
                    self.publish(StationEvent::ReplaceProgress { collected });
                    self.status("Waiting for 1 more scan to replace the pair");
                }
                ReplaceProgress::Ready { old, new } => {
                    self.replace = None;
                    self.publish(StationEvent::ReplaceProgress {
                        collected: ReplaceSession::CAPACITY,
                    });
                    self.invalidate(&old);
                    self.send(StationCommand::ReplacePair { old, new });
                    self.publish_view();
                }
            }
            return;
        }

        if !self.sequence.append_and_resort(path.clone()) {
            return;
        }
        self.rate.record();

        if self.sequence.mode() == PageMode::Single {
            if let Some(layout) = self.split_layout {
                self.send(StationCommand::SplitTwoPage {
                    path: path.clone(),
                    layout,
                    auto: true,
                });
            }
        }

        if !self.editing {
            self.sequence.jump_to_end();
        }
        self.publish_view();
    }

    // ===== Lifecycle =====

    /// Stop the watcher, let the worker finish its queue, then start again
    /// with `config` and rescan.
    ///
    /// An invalid `config` is rejected before anything is stopped.
    pub async fn reconfigure(&mut self, config: StationConfig) -> Result<()> {
        config.validate()?;
        self.stop().await?;

        self.sequence = PageSequence::new(config.scanner_mode.into());
        self.config = config;
        self.editing = false;
        self.replace = None;
        self.pending_transfer = None;
        self.rate.reset();

        self.launch()?;
        self.publish_view();
        Ok(())
    }

    /// Stop the watcher and drain the worker
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop().await
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(mut watcher) = self.watcher.take() {
            // Joins the watch thread, which may be mid-way through a stability wait
            tokio::task::spawn_blocking(move || watcher.stop()).await?;
        }
        if let Some(token) = self.active_cancel.take() {
            token.cancel();
        }

        // Closing the command channel ends the worker once its queue is empty
        self.command_tx = None;
        if let Some(worker) = self.worker.take() {
            worker.await?;
        }

        // Results addressed to the old configuration
        while self.update_rx.try_recv().is_ok() {}
        while self.watch_rx.try_recv().is_ok() {}
        Ok(())
    }
}

impl Drop for Station {
    fn drop(&mut self) {
        if let Some(token) = self.active_cancel.take() {
            token.cancel();
        }
    }
}
