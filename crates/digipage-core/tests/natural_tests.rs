use digipage_core::*;
use std::path::PathBuf;

#[test]
fn test_numeric_runs_sort_by_value() {
    let mut names = vec!["img1.jpg", "img10.jpg", "img2.jpg"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(names, vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
}

#[test]
fn test_digit_count_does_not_matter() {
    let mut names = vec!["scan_100.png", "scan_9.png", "scan_0010.png", "scan_99.png"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(
        names,
        vec!["scan_9.png", "scan_0010.png", "scan_99.png", "scan_100.png"]
    );
}

#[test]
fn test_letters_compare_case_insensitively() {
    let mut names = vec!["b.jpg", "A.jpg", "c.jpg"];
    names.sort_by(|a, b| natural_cmp(a, b));
    assert_eq!(names, vec!["A.jpg", "b.jpg", "c.jpg"]);
}

#[test]
fn test_sort_paths_uses_file_names() {
    let mut paths = vec![
        PathBuf::from("/scans/page12.tiff"),
        PathBuf::from("/scans/page3.tiff"),
        PathBuf::from("/scans/page1.tiff"),
    ];
    sort_paths(&mut paths);
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/scans/page1.tiff"),
            PathBuf::from("/scans/page3.tiff"),
            PathBuf::from("/scans/page12.tiff"),
        ]
    );
}
