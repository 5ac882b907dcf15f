use super::save_as;
use crate::types::*;
use image::GenericImageView;
use std::path::Path;

pub(super) fn crop_sync(path: &Path, region: CropRegion) -> Result<()> {
    let img = image::open(path)?;
    let color = img.color();
    let (width, height) = img.dimensions();

    let region = region
        .clamp_to(width, height)
        .ok_or_else(|| StationError::EmptyRegion {
            file: display_name(path),
        })?;

    let cropped = img.crop_imm(region.x, region.y, region.width, region.height);
    save_as(cropped, color, path)
}
