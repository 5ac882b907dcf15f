use digipage_core::{StationConfig, calculate_stats, scan_directory};
use digipage_runtime::{StationUpdate, UpdateSender};

use crate::worker::WorkerContext;

pub async fn handle_scan_directory(config: &StationConfig, update_tx: &UpdateSender) {
    match scan_directory(&config.scan_folder).await {
        Ok(files) => {
            log::debug!("Scanned {} images in {}", files.len(), config.scan_folder.display());
            let _ = update_tx.send(StationUpdate::ScanComplete { files });
        }
        Err(e) => {
            let _ = update_tx.send(StationUpdate::Error {
                kind: None,
                message: format!("Failed to scan folder: {}", e),
            });
            // Callers still get an (empty) listing to show
            let _ = update_tx.send(StationUpdate::ScanComplete { files: Vec::new() });
        }
    }
}

pub async fn handle_calculate_stats(context: &WorkerContext, update_tx: &UpdateSender) {
    match calculate_stats(&context.config.todays_books_folder, context.log_store.clone()).await {
        Ok(stats) => {
            let _ = update_tx.send(StationUpdate::StatsCalculated { stats });
        }
        Err(e) => {
            let _ = update_tx.send(StationUpdate::Error {
                kind: None,
                message: format!("Stats calculation error: {}", e),
            });
        }
    }
}
