use digipage_core::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

fn touch(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn setup(names: &[&str]) -> (tempfile::TempDir, PathBuf, PathBuf, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let scans = dir.path().join("scans");
    let books = dir.path().join("books");
    std::fs::create_dir_all(&scans).unwrap();
    std::fs::create_dir_all(&books).unwrap();

    let pages = names
        .iter()
        .map(|name| {
            let path = scans.join(name);
            touch(&path, name);
            path
        })
        .collect();
    (dir, scans, books, pages)
}

#[tokio::test]
async fn test_pages_are_renumbered_in_natural_order() {
    let (_dir, scans, books, pages) = setup(&["p10.jpg", "p2.jpg", "p1.jpg"]);
    let assembler = BookAssembler::new(&books);

    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = progress.clone();
    let outcome = assembler
        .assemble(
            "Lib-123-0001",
            pages,
            Some(scans.clone()),
            CancellationToken::new(),
            move |done, total| sink.lock().unwrap().push((done, total)),
        )
        .await
        .unwrap();

    let folder = books.join("Lib-123-0001");
    assert_eq!(
        outcome,
        BookOutcome::Completed {
            folder: folder.clone(),
            pages: 3
        }
    );
    assert_eq!(listing(&folder), vec!["0001.jpg", "0002.jpg", "0003.jpg"]);
    assert_eq!(std::fs::read_to_string(folder.join("0001.jpg")).unwrap(), "p1.jpg");
    assert_eq!(std::fs::read_to_string(folder.join("0002.jpg")).unwrap(), "p2.jpg");
    assert_eq!(std::fs::read_to_string(folder.join("0003.jpg")).unwrap(), "p10.jpg");
    assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
    assert!(listing(&scans).is_empty());
}

#[tokio::test]
async fn test_cancel_midway_rolls_back() {
    let (_dir, scans, books, pages) = setup(&["a1.jpg", "a2.jpg", "a3.jpg", "a4.jpg"]);
    let assembler = BookAssembler::new(&books);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let outcome = assembler
        .assemble("Book-001-1", pages, None, cancel, move |done, _| {
            if done == 2 {
                trigger.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(outcome, BookOutcome::Cancelled);
    assert!(!books.join("Book-001-1").exists());
    assert_eq!(listing(&scans), vec!["a1.jpg", "a2.jpg", "a3.jpg", "a4.jpg"]);
}

#[tokio::test]
async fn test_cancel_before_start_leaves_nothing() {
    let (_dir, scans, books, pages) = setup(&["a1.jpg"]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = BookAssembler::new(&books)
        .assemble("Early", pages, None, cancel, |_, _| {})
        .await
        .unwrap();

    assert_eq!(outcome, BookOutcome::Cancelled);
    assert!(!books.join("Early").exists());
    assert_eq!(listing(&scans), vec!["a1.jpg"]);
}

#[tokio::test]
async fn test_reused_folder_keeps_existing_pages() {
    let (_dir, scans, books, pages) = setup(&["b1.png", "b2.png"]);
    let folder = books.join("Existing");
    std::fs::create_dir_all(&folder).unwrap();
    touch(&folder.join("0001.png"), "earlier");

    let outcome = BookAssembler::new(&books)
        .assemble("Existing", pages.clone(), None, CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(matches!(outcome, BookOutcome::Completed { pages: 2, .. }));
    assert_eq!(listing(&folder), vec!["0001.png", "0002.png", "0003.png"]);
    assert_eq!(std::fs::read_to_string(folder.join("0001.png")).unwrap(), "earlier");
    assert!(listing(&scans).is_empty());
}

#[tokio::test]
async fn test_reused_folder_numbering_continues_after_highest_page() {
    let (_dir, scans, books, pages) = setup(&["g1.png"]);
    let folder = books.join("Existing");
    std::fs::create_dir_all(&folder).unwrap();
    touch(&folder.join("0002.png"), "earlier page");

    let outcome = BookAssembler::new(&books)
        .assemble("Existing", pages, None, CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(matches!(outcome, BookOutcome::Completed { pages: 1, .. }));
    assert_eq!(listing(&folder), vec!["0002.png", "0003.png"]);
    assert_eq!(std::fs::read_to_string(folder.join("0002.png")).unwrap(), "earlier page");
    assert_eq!(std::fs::read_to_string(folder.join("0003.png")).unwrap(), "g1.png");
    assert!(listing(&scans).is_empty());
}

#[tokio::test]
async fn test_occupied_page_name_aborts_and_rolls_back() {
    let (_dir, scans, books, pages) = setup(&["h1.png", "h2.png"]);
    let folder = books.join("Existing");
    std::fs::create_dir_all(folder.join("0003.png")).unwrap();
    touch(&folder.join("0001.png"), "earlier");

    let result = BookAssembler::new(&books)
        .assemble("Existing", pages, None, CancellationToken::new(), |_, _| {})
        .await;

    match result {
        Err(StationError::BookMove { file, source }) => {
            assert_eq!(file, "h2.png");
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
        }
        _ => panic!("Expected BookMove error"),
    }
    assert_eq!(listing(&folder), vec!["0001.png", "0003.png"]);
    assert_eq!(listing(&scans), vec!["h1.png", "h2.png"]);
}

#[tokio::test]
async fn test_cancel_in_reused_folder_keeps_folder() {
    let (_dir, scans, books, pages) = setup(&["c1.png", "c2.png"]);
    let folder = books.join("Existing");
    std::fs::create_dir_all(&folder).unwrap();
    touch(&folder.join("0001.png"), "earlier");

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let outcome = BookAssembler::new(&books)
        .assemble("Existing", pages, None, cancel, move |_, _| trigger.cancel())
        .await
        .unwrap();

    assert_eq!(outcome, BookOutcome::Cancelled);
    assert_eq!(listing(&folder), vec!["0001.png"]);
    assert_eq!(listing(&scans), vec!["c1.png", "c2.png"]);
}

#[tokio::test]
async fn test_missing_pages_are_skipped_without_gaps() {
    let (_dir, scans, books, mut pages) = setup(&["d1.jpg", "d3.jpg"]);
    pages.insert(1, scans.join("d2.jpg"));

    let outcome = BookAssembler::new(&books)
        .assemble("Gaps", pages, None, CancellationToken::new(), |_, _| {})
        .await
        .unwrap();

    assert!(matches!(outcome, BookOutcome::Completed { pages: 2, .. }));
    assert_eq!(listing(&books.join("Gaps")), vec!["0001.jpg", "0002.jpg"]);
}

#[tokio::test]
async fn test_split_sources_are_cleaned_up() {
    let (_dir, scans, books, _) = setup(&["wide1.jpg", "wide2.jpg"]);
    let final_dir = scans.join("final");
    std::fs::create_dir_all(&final_dir).unwrap();
    touch(&scans.join("layout_data.json"), "{}");
    touch(&scans.join("notes.txt"), "keep me");

    let pages: Vec<PathBuf> = ["wide1_L.jpg", "wide1_R.jpg", "wide2_L.jpg"]
        .iter()
        .map(|name| {
            let path = final_dir.join(name);
            touch(&path, name);
            path
        })
        .collect();

    let outcome = BookAssembler::new(&books)
        .assemble(
            "Split",
            pages,
            Some(final_dir.clone()),
            CancellationToken::new(),
            |_, _| {},
        )
        .await
        .unwrap();

    assert!(matches!(outcome, BookOutcome::Completed { pages: 3, .. }));
    assert!(!final_dir.exists());
    assert_eq!(listing(&scans), vec!["notes.txt"]);
    assert_eq!(
        std::fs::read_to_string(books.join("Split").join("0002.jpg")).unwrap(),
        "wide1_R.jpg"
    );
}

#[tokio::test]
async fn test_invalid_book_name_is_rejected() {
    let (_dir, _scans, books, pages) = setup(&["e1.jpg"]);
    let result = BookAssembler::new(&books)
        .assemble("../escape", pages, None, CancellationToken::new(), |_, _| {})
        .await;

    match result {
        Err(StationError::Config(msg)) => assert!(msg.contains("Invalid book name")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}
