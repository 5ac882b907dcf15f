use digipage_core::{CropRegion, SplitLayout, TransformEngine, display_name};
use digipage_runtime::{OperationKind, StationUpdate, UpdateSender};
use std::path::PathBuf;

fn complete(update_tx: &UpdateSender, kind: OperationKind, paths: Vec<PathBuf>, message: String) {
    let _ = update_tx.send(StationUpdate::OperationComplete {
        kind,
        paths,
        message,
    });
}

fn fail(update_tx: &UpdateSender, kind: OperationKind, what: &str, e: impl std::fmt::Display) {
    log::error!("{} failed: {}", what, e);
    let _ = update_tx.send(StationUpdate::Error {
        kind: Some(kind),
        message: format!("{} failed: {}", what, e),
    });
}

pub async fn handle_crop(
    engine: &TransformEngine,
    path: PathBuf,
    region: CropRegion,
    update_tx: &UpdateSender,
) {
    match engine.crop(&path, region).await {
        Ok(()) => {
            let message = display_name(&path);
            complete(update_tx, OperationKind::Crop, vec![path], message);
        }
        Err(e) => fail(update_tx, OperationKind::Crop, "Crop", e),
    }
}

pub async fn handle_rotate(
    engine: &TransformEngine,
    path: PathBuf,
    angle_degrees: f64,
    update_tx: &UpdateSender,
) {
    match engine.rotate(&path, angle_degrees).await {
        Ok(()) => {
            let message = format!("{} rotated {:.1}°", display_name(&path), angle_degrees);
            complete(update_tx, OperationKind::Rotate, vec![path], message);
        }
        Err(e) => fail(update_tx, OperationKind::Rotate, "Rotate", e),
    }
}

pub async fn handle_split_two_page(
    engine: &TransformEngine,
    path: PathBuf,
    layout: SplitLayout,
    auto: bool,
    update_tx: &UpdateSender,
) {
    let kind = if auto {
        OperationKind::AutoSplit
    } else {
        OperationKind::PageSplit
    };
    match engine.split_two_page(&path, layout).await {
        Ok(output) => {
            // Source first, then the outputs the viewer has to reload or drop
            let mut paths = vec![path.clone()];
            paths.extend(output.left);
            paths.extend(output.right);
            paths.extend(output.removed);
            complete(update_tx, kind, paths, display_name(&path));
        }
        Err(e) => fail(update_tx, kind, "Split", e),
    }
}

pub async fn handle_split_at(
    engine: &TransformEngine,
    path: PathBuf,
    x: u32,
    update_tx: &UpdateSender,
) {
    match engine.split_at(&path, x).await {
        Ok((left, right)) => {
            let message = display_name(&path);
            complete(update_tx, OperationKind::Split, vec![path, left, right], message);
        }
        Err(e) => fail(update_tx, OperationKind::Split, "Split", e),
    }
}

pub async fn handle_delete(engine: &TransformEngine, path: PathBuf, update_tx: &UpdateSender) {
    match engine.delete(&path).await {
        Ok(()) => {
            let message = display_name(&path);
            complete(update_tx, OperationKind::Delete, vec![path], message);
        }
        Err(e) => fail(update_tx, OperationKind::Delete, "Delete", e),
    }
}

pub async fn handle_delete_with_artifacts(
    engine: &TransformEngine,
    path: PathBuf,
    update_tx: &UpdateSender,
) {
    match engine.delete_with_split_artifacts(&path).await {
        Ok(mut removed) => {
            // Always report the source so the sequence drops it even if it was already gone
            if !removed.contains(&path) {
                removed.insert(0, path.clone());
            }
            complete(update_tx, OperationKind::Delete, removed, display_name(&path));
        }
        Err(e) => fail(update_tx, OperationKind::Delete, "Delete", e),
    }
}

pub async fn handle_restore(engine: &TransformEngine, path: PathBuf, update_tx: &UpdateSender) {
    match engine.restore(&path).await {
        Ok(()) => {
            let message = display_name(&path);
            complete(update_tx, OperationKind::Restore, vec![path], message);
        }
        Err(e) => fail(update_tx, OperationKind::Restore, "Restore", e),
    }
}

/// Reports `[old0, old1, new0, new1]` so the controller can swap the pair in place
pub async fn handle_replace_pair(
    engine: &TransformEngine,
    old: [PathBuf; 2],
    new: [PathBuf; 2],
    update_tx: &UpdateSender,
) {
    match engine.replace_pair(old.clone(), new).await {
        Ok(replaced) => {
            let message = format!("{} and {}", display_name(&old[0]), display_name(&old[1]));
            let mut paths = old.to_vec();
            paths.extend(replaced);
            complete(update_tx, OperationKind::ReplacePair, paths, message);
        }
        Err(e) => fail(update_tx, OperationKind::ReplacePair, "Replace", e),
    }
}
