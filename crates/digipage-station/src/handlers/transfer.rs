use digipage_core::{
    CancellationToken, CompletedLog, StationConfig, TransferMove, execute_transfer,
    prepare_transfer,
};
use digipage_runtime::{OperationKind, StationUpdate, UpdateSender};
use std::sync::Arc;

pub async fn handle_prepare_transfer(config: &StationConfig, update_tx: &UpdateSender) {
    match prepare_transfer(&config.todays_books_folder, config.city_paths.clone()).await {
        Ok(plan) => {
            log::info!(
                "Transfer plan: {} moves, {} warnings",
                plan.moves.len(),
                plan.warnings.len()
            );
            let _ = update_tx.send(StationUpdate::TransferPlanReady { plan });
        }
        Err(e) => {
            let _ = update_tx.send(StationUpdate::Error {
                kind: None,
                message: format!("Failed to prepare transfer: {}", e),
            });
        }
    }
}

pub async fn handle_execute_transfer(
    moves: Vec<TransferMove>,
    log_store: Arc<dyn CompletedLog>,
    cancel: CancellationToken,
    update_tx: &UpdateSender,
) {
    let total = moves.len();
    let mut moved_paths: Vec<_> = moves.iter().map(|m| m.source.clone()).collect();

    match execute_transfer(moves, log_store, cancel, |_, _| {}).await {
        Ok(summary) => {
            let message = if summary.cancelled {
                format!(
                    "Transfer cancelled. Transferred {} of {} books.",
                    summary.transferred, total
                )
            } else {
                format!("Transferred {} books.", summary.transferred)
            };
            moved_paths.truncate(summary.transferred);
            let _ = update_tx.send(StationUpdate::OperationComplete {
                kind: OperationKind::Transfer,
                paths: moved_paths,
                message,
            });
        }
        Err(e) => {
            let _ = update_tx.send(StationUpdate::Error {
                kind: Some(OperationKind::Transfer),
                message: format!("Transfer failed: {}", e),
            });
        }
    }
}
