use digipage_core::*;
use std::io::Write;
use std::time::Duration;

fn fast_probe(timeout_ms: u64) -> ProbeOptions {
    ProbeOptions {
        timeout: Duration::from_millis(timeout_ms),
        interval: Duration::from_millis(20),
    }
}

#[test]
fn test_settled_file_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.jpg");
    std::fs::write(&path, vec![1u8; 2048]).unwrap();

    let result = wait_for_stable(&path, &fast_probe(1000));
    assert_eq!(result, Stability::Stable { size: 2048 });
}

#[test]
fn test_missing_file_vanishes() {
    let dir = tempfile::tempdir().unwrap();
    let result = wait_for_stable(&dir.path().join("nope.jpg"), &fast_probe(200));
    assert_eq!(result, Stability::Vanished);
}

#[test]
fn test_empty_file_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.jpg");
    std::fs::write(&path, b"").unwrap();

    let result = wait_for_stable(&path, &fast_probe(150));
    assert_eq!(result, Stability::TimedOut);
}

#[test]
fn test_growing_file_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("growing.jpg");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"x").unwrap();

    let writer = std::thread::spawn(move || {
        for _ in 0..200 {
            file.write_all(&[0u8; 64]).unwrap();
            file.flush().unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
    });

    let result = wait_for_stable(&path, &fast_probe(300));
    assert_eq!(result, Stability::TimedOut);
    writer.join().unwrap();
}

#[test]
fn test_file_deleted_mid_probe_vanishes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doomed.jpg");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"x").unwrap();

    let doomed = path.clone();
    let writer = std::thread::spawn(move || {
        for _ in 0..10 {
            file.write_all(&[0u8; 64]).unwrap();
            file.flush().unwrap();
            std::thread::sleep(Duration::from_millis(5));
        }
        drop(file);
        std::fs::remove_file(&doomed).unwrap();
    });

    let result = wait_for_stable(&path, &fast_probe(2000));
    writer.join().unwrap();
    assert_eq!(result, Stability::Vanished);
}

#[tokio::test]
async fn test_async_probe() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::write(&path, b"png bytes").unwrap();

    let result = probe(&path, fast_probe(1000)).await.unwrap();
    assert!(result.is_stable());
}
