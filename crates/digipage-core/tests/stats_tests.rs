use chrono::NaiveDate;
use digipage_core::*;
use std::path::PathBuf;
use std::sync::Arc;

fn entry(name: &str, pages: usize) -> CompletedBookLogEntry {
    CompletedBookLogEntry {
        name: name.to_string(),
        pages,
        path: PathBuf::from(format!("/archive/{name}")),
        timestamp: "2024-03-07T10:00:00".to_string(),
    }
}

#[tokio::test]
async fn test_scan_directory_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["p10.JPG", "p2.png", "p1.tiff", "notes.txt", "layout_data.json"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::create_dir(dir.path().join("final.jpg")).unwrap();

    let files = scan_directory(dir.path()).await.unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["p1.tiff", "p2.png", "p10.JPG"]);
}

#[tokio::test]
async fn test_scan_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = scan_directory(dir.path().join("missing")).await;
    assert!(matches!(result, Err(StationError::InvalidDirectory(_))));
}

#[test]
fn test_log_store_groups_by_day() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonLogStore::new(dir.path().join("log.json"));
    let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

    store.append_on(monday, entry("A-123-1", 10)).unwrap();
    store.append_on(tuesday, entry("B-123-2", 4)).unwrap();
    store.append_on(tuesday, entry("C-123-3", 6)).unwrap();

    assert_eq!(store.entries_on(monday).len(), 1);
    assert_eq!(store.entries_on(tuesday).len(), 2);

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
    assert!(raw.get("2024-03-04").is_some());
    assert_eq!(raw["2024-03-05"][1]["pages"], 6);
}

#[test]
fn test_corrupt_log_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.json");
    std::fs::write(&path, b"[broken").unwrap();

    let store = JsonLogStore::new(&path);
    let (pages, entries) = store.today().unwrap();
    assert_eq!(pages, 0);
    assert!(entries.is_empty());

    store.append(entry("A-123-1", 3)).unwrap();
    assert_eq!(store.today().unwrap().0, 3);

    let aside = dir.path().join("log.json.corrupt");
    assert_eq!(std::fs::read(&aside).unwrap(), b"[broken");
}

#[test]
fn test_malformed_entries_survive_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.json");
    std::fs::write(
        &path,
        r#"{
            "2024-01-01": [
                {"name": "Old-123-1", "pages": 5, "path": "/archive/Old-123-1", "timestamp": "2024-01-01T09:00:00"},
                {"name": "NoPages-123-2", "path": "/archive/NoPages-123-2", "timestamp": "2024-01-01T09:30:00"},
                "garbage"
            ]
        }"#,
    )
    .unwrap();

    let store = JsonLogStore::new(&path);
    let new_year = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let next_day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    let old = store.entries_on(new_year);
    let pages: Vec<_> = old.iter().map(|e| (e.name.as_str(), e.pages)).collect();
    assert_eq!(pages, vec![("Old-123-1", 5), ("NoPages-123-2", 0)]);

    store.append_on(next_day, entry("New-123-3", 7)).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("Old-123-1"));
    assert!(raw.contains("garbage"));
    assert_eq!(store.entries_on(new_year).len(), 2);
    assert_eq!(store.entries_on(next_day), vec![entry("New-123-3", 7)]);
}

#[tokio::test]
async fn test_calculate_stats() {
    let dir = tempfile::tempdir().unwrap();
    let books = dir.path().join("books");
    for (name, pages) in [("A-123-1", 3), ("B-123-2", 0)] {
        let folder = books.join(name);
        std::fs::create_dir_all(&folder).unwrap();
        for i in 0..pages {
            std::fs::write(folder.join(format!("{i}.png")), b"x").unwrap();
        }
        std::fs::write(folder.join("thumbs.db"), b"x").unwrap();
    }

    let store = Arc::new(JsonLogStore::new(dir.path().join("log.json")));
    store.append(entry("Z-123-9", 12)).unwrap();

    let stats = calculate_stats(&books, store).await.unwrap();
    assert_eq!(stats.staged.get("A-123-1"), Some(&3));
    assert_eq!(stats.staged.get("B-123-2"), Some(&0));
    assert_eq!(stats.staged_pages(), 3);
    assert_eq!(stats.archived_pages, 12);
    assert_eq!(stats.archived_books.len(), 1);
}

#[tokio::test]
async fn test_stats_without_books_folder() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonLogStore::new(dir.path().join("log.json")));

    let stats = calculate_stats(dir.path().join("missing"), store).await.unwrap();
    assert!(stats.staged.is_empty());
    assert_eq!(stats.archived_pages, 0);
}
