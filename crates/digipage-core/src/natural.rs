use std::borrow::Cow;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Compare two names so that digit runs order numerically (`img2 < img10`).
///
/// Letters compare case-insensitively and whitespace counts as a character
/// ordered before any letter or digit. Names equal under that rule fall back
/// to a plain byte comparison so the order stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(&sort_key(a), &sort_key(b))
        .then_with(|| a.cmp(b))
}

/// Natural comparison of two paths by their file names
pub fn natural_cmp_paths(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&file_name(a), &file_name(b)).then_with(|| a.cmp(b))
}

/// Sort paths in place by file name
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp_paths(a, b));
}

fn file_name(path: &Path) -> Cow<'_, str> {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

/// `scan_0010` -> `scan_10`, so natord compares every digit run as an integer
/// instead of switching to its left-aligned mode for zero-prefixed runs.
/// Whitespace becomes `\u{1}`, which natord does not skip.
fn sort_key(name: &str) -> Cow<'_, str> {
    if !name.contains(|c: char| c == '0' || c.is_whitespace()) {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    let mut in_digits = false;

    while let Some(c) = chars.next() {
        let next_is_digit = chars.peek().is_some_and(|n| n.is_ascii_digit());
        if c == '0' && !in_digits && next_is_digit {
            continue;
        }
        in_digits = c.is_ascii_digit();
        out.push(if c.is_whitespace() { '\u{1}' } else { c });
    }

    Cow::Owned(out)
}
