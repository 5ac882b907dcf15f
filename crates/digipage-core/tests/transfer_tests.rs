use chrono::NaiveDate;
use digipage_core::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Fixture {
    _dir: tempfile::TempDir,
    books: PathBuf,
    archive: PathBuf,
    log_path: PathBuf,
}

fn fixture(books: &[(&str, usize)]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let books_root = dir.path().join("today");
    let archive = dir.path().join("archive").join("123");
    std::fs::create_dir_all(&books_root).unwrap();
    std::fs::create_dir_all(&archive).unwrap();

    for (name, pages) in books {
        let folder = books_root.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        for i in 1..=*pages {
            std::fs::write(folder.join(format!("{:04}.jpg", i)), b"page").unwrap();
        }
    }

    Fixture {
        log_path: dir.path().join("log.json"),
        _dir: dir,
        books: books_root,
        archive,
    }
}

fn routes(archive: &Path) -> BTreeMap<String, PathBuf> {
    BTreeMap::from([("123".to_string(), archive.to_path_buf())])
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 7).unwrap()
}

#[test]
fn test_plan_routes_by_city_code() {
    let fx = fixture(&[("A-123-X", 2), ("B-999-Y", 1), ("NoCode", 1)]);
    std::fs::write(fx.books.join("stray.txt"), b"not a book").unwrap();

    let plan = plan_transfer(&fx.books, &routes(&fx.archive), date()).unwrap();

    assert_eq!(plan.moves.len(), 1);
    let planned = &plan.moves[0];
    assert_eq!(planned.name, "A-123-X");
    assert_eq!(planned.source, fx.books.join("A-123-X"));
    assert_eq!(planned.destination_parent, fx.archive.join("07-03"));
    assert_eq!(planned.destination, fx.archive.join("07-03").join("A-123-X"));

    assert_eq!(plan.warnings.len(), 2);
    assert!(plan.warnings.iter().any(|w| w.contains("999") && w.contains("B-999-Y")));
    assert!(plan.warnings.iter().any(|w| w == "No city code found in: NoCode"));

    // Planning never touches the filesystem
    assert!(fx.books.join("A-123-X").exists());
    assert!(!fx.archive.join("07-03").exists());
}

#[test]
fn test_route_to_missing_directory_is_a_warning() {
    let fx = fixture(&[("A-123-X", 1)]);
    let routes = BTreeMap::from([("123".to_string(), fx.archive.join("does-not-exist"))]);

    let plan = plan_transfer(&fx.books, &routes, date()).unwrap();
    assert!(plan.moves.is_empty());
    assert_eq!(plan.warnings, vec!["Invalid path for city 123: A-123-X".to_string()]);
}

#[test]
fn test_plan_on_missing_root_fails() {
    let fx = fixture(&[]);
    let result = plan_transfer(&fx.books.join("missing"), &routes(&fx.archive), date());
    assert!(matches!(result, Err(StationError::InvalidDirectory(_))));
}

#[tokio::test]
async fn test_execute_moves_and_logs() {
    let fx = fixture(&[("A-123-1", 3), ("B-123-2", 2)]);
    let plan = plan_transfer(&fx.books, &routes(&fx.archive), date()).unwrap();
    let store = Arc::new(JsonLogStore::new(&fx.log_path));

    let summary = execute_transfer(
        plan.moves.clone(),
        store.clone(),
        CancellationToken::new(),
        |_, _| {},
    )
    .await
    .unwrap();

    assert_eq!(
        summary,
        TransferSummary {
            transferred: 2,
            cancelled: false
        }
    );
    for planned in &plan.moves {
        assert!(!planned.source.exists());
        assert!(planned.destination.is_dir());
    }

    let (pages, entries) = store.today().unwrap();
    assert_eq!(pages, 5);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "A-123-1");
    assert_eq!(entries[0].pages, 3);
    assert_eq!(entries[0].path, plan.moves[0].destination);
}

#[tokio::test]
async fn test_cancel_keeps_completed_moves() {
    let fx = fixture(&[("A-123-1", 1), ("B-123-2", 1), ("C-123-3", 1)]);
    let plan = plan_transfer(&fx.books, &routes(&fx.archive), date()).unwrap();
    let store = Arc::new(JsonLogStore::new(&fx.log_path));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let summary = execute_transfer(plan.moves.clone(), store.clone(), cancel, move |_, _| {
        trigger.cancel();
    })
    .await
    .unwrap();

    assert_eq!(summary.transferred, 1);
    assert!(summary.cancelled);
    assert!(plan.moves[0].destination.exists());
    assert!(plan.moves[1].source.exists());
    assert!(plan.moves[2].source.exists());
    assert_eq!(store.today().unwrap().1.len(), 1);
}

#[tokio::test]
async fn test_existing_destination_aborts_batch() {
    let fx = fixture(&[("A-123-1", 1), ("B-123-2", 1)]);
    let plan = plan_transfer(&fx.books, &routes(&fx.archive), date()).unwrap();
    std::fs::create_dir_all(&plan.moves[1].destination).unwrap();
    let store = Arc::new(JsonLogStore::new(&fx.log_path));

    let result = execute_transfer(
        plan.moves.clone(),
        store.clone(),
        CancellationToken::new(),
        |_, _| {},
    )
    .await;

    assert!(matches!(result, Err(StationError::DestinationExists(_))));
    assert!(plan.moves[0].destination.exists());
    assert!(plan.moves[1].source.exists());
    assert_eq!(store.today().unwrap().1.len(), 1);
}
