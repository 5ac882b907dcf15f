use super::save_as;
use crate::constants::{FINAL_DIR, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::types::*;
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};

/// `(left, right)` output paths for splitting `source` into `dir`
fn sided_paths(source: &Path, dir: &Path) -> (PathBuf, PathBuf) {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (
        dir.join(format!("{stem}{LEFT_SUFFIX}{ext}")),
        dir.join(format!("{stem}{RIGHT_SUFFIX}{ext}")),
    )
}

/// `final/{stem}_L{ext}` and `final/{stem}_R{ext}` next to `source`
pub fn split_output_paths(source: &Path) -> (PathBuf, PathBuf) {
    let dir = source.parent().unwrap_or_else(|| Path::new("")).join(FINAL_DIR);
    sided_paths(source, &dir)
}

pub(super) fn split_two_page_sync(source: &Path, layout: &SplitLayout) -> Result<SplitOutput> {
    let (left_path, right_path) = split_output_paths(source);
    if let Some(dir) = left_path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let img = image::open(source)?;
    let mut output = SplitOutput {
        left: None,
        right: None,
        removed: Vec::new(),
    };

    output.left = write_side(
        source,
        &img,
        &layout.left,
        layout.left_enabled,
        &left_path,
        &mut output.removed,
    )?;
    output.right = write_side(
        source,
        &img,
        &layout.right,
        layout.right_enabled,
        &right_path,
        &mut output.removed,
    )?;

    Ok(output)
}

fn write_side(
    source: &Path,
    img: &DynamicImage,
    rect: &RatioRect,
    enabled: bool,
    target: &Path,
    removed: &mut Vec<PathBuf>,
) -> Result<Option<PathBuf>> {
    if !enabled {
        // A disabled side must not leave an older split behind
        if target.exists() {
            std::fs::remove_file(target)?;
            removed.push(target.to_path_buf());
        }
        return Ok(None);
    }

    let (width, height) = img.dimensions();
    let region = rect
        .to_pixels(width, height)
        .clamp_to(width, height)
        .ok_or_else(|| StationError::EmptyRegion {
            file: display_name(source),
        })?;

    let page = img.crop_imm(region.x, region.y, region.width, region.height);
    save_as(page, img.color(), target)?;
    Ok(Some(target.to_path_buf()))
}

pub(super) fn split_at_sync(source: &Path, x: u32) -> Result<(PathBuf, PathBuf)> {
    let img = image::open(source)?;
    let (width, height) = img.dimensions();
    if x == 0 || x >= width {
        return Err(StationError::EmptyRegion {
            file: display_name(source),
        });
    }

    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let (left_path, right_path) = sided_paths(source, dir);

    save_as(img.crop_imm(0, 0, x, height), img.color(), &left_path)?;
    save_as(img.crop_imm(x, 0, width - x, height), img.color(), &right_path)?;
    std::fs::remove_file(source)?;

    Ok((left_path, right_path))
}
