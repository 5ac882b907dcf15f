//! In-place edits of scan files
//!
//! Every destructive edit first copies the untouched file into the backup
//! folder (once; later edits keep the first copy). The heavy lifting runs on
//! the blocking pool so callers can await it from async code.

mod backup;
mod crop;
mod files;
mod rotate;
mod split;

pub use rotate::zoom_factor;
pub use split::split_output_paths;

use crate::types::*;
use std::path::{Path, PathBuf};

/// Applies crop / rotate / split edits to image files
#[derive(Debug, Clone)]
pub struct TransformEngine {
    backup_dir: PathBuf,
}

impl TransformEngine {
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Where the pre-edit copy of `path` is (or would be) kept
    pub fn backup_path(&self, path: &Path) -> Option<PathBuf> {
        backup::backup_path(&self.backup_dir, path)
    }

    /// Crop `path` in place to `region`, clamped to the image bounds
    pub async fn crop(&self, path: impl AsRef<Path>, region: CropRegion) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let backup_dir = self.backup_dir.clone();
        blocking(move || {
            backup::backup_if_absent(&backup_dir, &path);
            crop::crop_sync(&path, region).map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Rotate `path` in place by `angle_degrees` (positive is clockwise),
    /// zooming so the original frame stays fully covered
    pub async fn rotate(&self, path: impl AsRef<Path>, angle_degrees: f64) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let backup_dir = self.backup_dir.clone();
        blocking(move || {
            backup::backup_if_absent(&backup_dir, &path);
            rotate::rotate_sync(&path, angle_degrees).map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Write the two pages of a wide scan into `final/`, leaving the source intact
    pub async fn split_two_page(
        &self,
        path: impl AsRef<Path>,
        layout: SplitLayout,
    ) -> Result<SplitOutput> {
        let path = path.as_ref().to_path_buf();
        blocking(move || {
            split::split_two_page_sync(&path, &layout)
                .map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Cut `path` at pixel column `x` into `_L`/`_R` files beside it and remove it
    pub async fn split_at(&self, path: impl AsRef<Path>, x: u32) -> Result<(PathBuf, PathBuf)> {
        let path = path.as_ref().to_path_buf();
        let backup_dir = self.backup_dir.clone();
        blocking(move || {
            backup::backup_if_absent(&backup_dir, &path);
            split::split_at_sync(&path, x).map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Delete a scan. A missing file is not an error.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        blocking(move || files::delete_sync(&path).map_err(|e| StationError::transform(&path, e)))
            .await
    }

    /// Delete a scan together with its `final/` split pages.
    /// Returns every path that was removed.
    pub async fn delete_with_split_artifacts(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>> {
        let path = path.as_ref().to_path_buf();
        blocking(move || {
            files::delete_with_split_artifacts_sync(&path)
                .map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Copy the pre-edit backup of `path` back over it
    pub async fn restore(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let backup_dir = self.backup_dir.clone();
        blocking(move || {
            files::restore_sync(&backup_dir, &path).map_err(|e| StationError::transform(&path, e))
        })
        .await
    }

    /// Replace a displayed pair with two rescanned files.
    ///
    /// The old files are removed and each new file takes the stem of the old
    /// one it replaces (keeping its own extension). Returns the new paths.
    pub async fn replace_pair(
        &self,
        old: [PathBuf; 2],
        new: [PathBuf; 2],
    ) -> Result<[PathBuf; 2]> {
        let backup_dir = self.backup_dir.clone();
        blocking(move || {
            for path in &old {
                backup::backup_if_absent(&backup_dir, path);
            }
            files::replace_pair_sync(&old, &new)
        })
        .await
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Save `img` to `path`, converting back to the color type it was loaded with
pub(crate) fn save_as(
    img: image::DynamicImage,
    color: image::ColorType,
    path: &Path,
) -> Result<()> {
    restore_color(img, color).save(path)?;
    Ok(())
}

fn restore_color(img: image::DynamicImage, color: image::ColorType) -> image::DynamicImage {
    use image::{ColorType, DynamicImage};

    if img.color() == color {
        return img;
    }

    match color {
        ColorType::L8 => DynamicImage::ImageLuma8(img.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(img.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(img.to_rgb8()),
        ColorType::Rgba8 => DynamicImage::ImageRgba8(img.to_rgba8()),
        ColorType::L16 => DynamicImage::ImageLuma16(img.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(img.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(img.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(img.to_rgba16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(img.to_rgb32f()),
        ColorType::Rgba32F => DynamicImage::ImageRgba32F(img.to_rgba32f()),
        _ => img,
    }
}
