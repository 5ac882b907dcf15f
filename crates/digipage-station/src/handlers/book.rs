use digipage_core::{BookAssembler, BookOutcome, CancellationToken};
use digipage_runtime::{OperationKind, StationUpdate, UpdateSender};
use std::path::PathBuf;

pub async fn handle_create_book(
    assembler: &BookAssembler,
    name: String,
    pages: Vec<PathBuf>,
    source_hint: Option<PathBuf>,
    cancel: CancellationToken,
    update_tx: &UpdateSender,
) {
    let progress_tx = update_tx.clone();
    let progress = move |done, total| {
        let _ = progress_tx.send(StationUpdate::BookProgress { done, total });
    };

    log::info!("Creating book {} from {} pages", name, pages.len());

    match assembler
        .assemble(&name, pages.clone(), source_hint, cancel, progress)
        .await
    {
        Ok(BookOutcome::Completed { folder, pages: count }) => {
            log::info!("Book {} created with {} pages", name, count);
            let mut paths = pages;
            paths.push(folder);
            let _ = update_tx.send(StationUpdate::OperationComplete {
                kind: OperationKind::CreateBook,
                paths,
                message: name,
            });
        }
        Ok(BookOutcome::Cancelled) => {
            log::info!("Book {} cancelled", name);
            let _ = update_tx.send(StationUpdate::OperationComplete {
                kind: OperationKind::CreateBookCancelled,
                paths: Vec::new(),
                message: name,
            });
        }
        Err(e) => {
            let _ = update_tx.send(StationUpdate::Error {
                kind: Some(OperationKind::CreateBook),
                message: format!("Failed to create book {}: {}", name, e),
            });
        }
    }
}
