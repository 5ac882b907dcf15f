use digipage_core::{BookAssembler, CompletedLog, JsonLogStore, StationConfig, TransformEngine};
use digipage_runtime::{CommandReceiver, StationCommand, UpdateSender};
use std::sync::Arc;

use crate::handlers;

/// Everything the worker needs to run commands for one configuration
pub struct WorkerContext {
    pub config: StationConfig,
    pub engine: TransformEngine,
    pub assembler: BookAssembler,
    pub log_store: Arc<dyn CompletedLog>,
}

impl WorkerContext {
    pub fn new(config: StationConfig) -> Self {
        Self {
            engine: TransformEngine::new(&config.backup_folder),
            assembler: BookAssembler::new(&config.todays_books_folder),
            log_store: Arc::new(JsonLogStore::new(&config.completed_log_file)),
            config,
        }
    }
}

/// Async worker task that processes station commands one at a time and
/// sends updates.
///
/// Returns once every sender of `command_rx` has been dropped and the queue
/// is drained.
pub async fn worker_task(
    mut command_rx: CommandReceiver,
    update_tx: UpdateSender,
    context: WorkerContext,
) {
    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &context, &update_tx).await;
    }
    log::debug!("Worker drained, stopping");
}

async fn process_command(cmd: StationCommand, context: &WorkerContext, update_tx: &UpdateSender) {
    match cmd {
        StationCommand::ScanDirectory => {
            handlers::scan::handle_scan_directory(&context.config, update_tx).await;
        }
        StationCommand::CalculateStats => {
            handlers::scan::handle_calculate_stats(context, update_tx).await;
        }
        StationCommand::Crop { path, region } => {
            handlers::edit::handle_crop(&context.engine, path, region, update_tx).await;
        }
        StationCommand::Rotate {
            path,
            angle_degrees,
        } => {
            handlers::edit::handle_rotate(&context.engine, path, angle_degrees, update_tx).await;
        }
        StationCommand::SplitTwoPage { path, layout, auto } => {
            handlers::edit::handle_split_two_page(&context.engine, path, layout, auto, update_tx)
                .await;
        }
        StationCommand::SplitAt { path, x } => {
            handlers::edit::handle_split_at(&context.engine, path, x, update_tx).await;
        }
        StationCommand::Delete { path } => {
            handlers::edit::handle_delete(&context.engine, path, update_tx).await;
        }
        StationCommand::DeleteWithArtifacts { path } => {
            handlers::edit::handle_delete_with_artifacts(&context.engine, path, update_tx).await;
        }
        StationCommand::Restore { path } => {
            handlers::edit::handle_restore(&context.engine, path, update_tx).await;
        }
        StationCommand::ReplacePair { old, new } => {
            handlers::edit::handle_replace_pair(&context.engine, old, new, update_tx).await;
        }
        StationCommand::CreateBook {
            name,
            pages,
            source_hint,
            cancel,
        } => {
            handlers::book::handle_create_book(
                &context.assembler,
                name,
                pages,
                source_hint,
                cancel,
                update_tx,
            )
            .await;
        }
        StationCommand::PrepareTransfer => {
            handlers::transfer::handle_prepare_transfer(&context.config, update_tx).await;
        }
        StationCommand::ExecuteTransfer { moves, cancel } => {
            handlers::transfer::handle_execute_transfer(
                moves,
                context.log_store.clone(),
                cancel,
                update_tx,
            )
            .await;
        }
    }
}
