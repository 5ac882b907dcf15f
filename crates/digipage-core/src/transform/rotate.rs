use super::save_as;
use crate::types::*;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use std::path::Path;

const FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Minimum zoom that keeps a `width` x `height` frame fully covered after
/// rotating by `angle_degrees`.
pub fn zoom_factor(width: u32, height: u32, angle_degrees: f64) -> f64 {
    if width == 0 || height == 0 || angle_degrees == 0.0 {
        return 1.0;
    }

    let theta = angle_degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let w = width as f64;
    let h = height as f64;

    (cos + (h / w) * sin).max((w / h) * sin + cos)
}

pub(super) fn rotate_sync(path: &Path, angle_degrees: f64) -> Result<()> {
    let img = image::open(path)?;
    let color = img.color();
    let rotated = rotate_to_fill(&img, angle_degrees);
    save_as(DynamicImage::ImageRgba8(rotated), color, path)
}

/// Rotate about the center on an expanded canvas, scale by the zoom factor,
/// then center-crop back to the original dimensions.
pub(crate) fn rotate_to_fill(img: &DynamicImage, angle_degrees: f64) -> RgbaImage {
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    if angle_degrees == 0.0 || width == 0 || height == 0 {
        return rgba;
    }

    // Expanded canvas holding the whole rotated frame
    let theta = angle_degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let canvas_w = (width as f64 * cos + height as f64 * sin).ceil() as u32;
    let canvas_h = (width as f64 * sin + height as f64 * cos).ceil() as u32;
    let canvas_w = canvas_w.max(width);
    let canvas_h = canvas_h.max(height);

    let mut canvas = RgbaImage::from_pixel(canvas_w, canvas_h, FILL);
    let offset_x = ((canvas_w - width) / 2) as i64;
    let offset_y = ((canvas_h - height) / 2) as i64;
    imageops::replace(&mut canvas, &rgba, offset_x, offset_y);

    let rotated = rotate_about_center(&canvas, theta as f32, Interpolation::Bilinear, FILL);

    let zoom = zoom_factor(width, height, angle_degrees);
    let scaled_w = ((canvas_w as f64 * zoom) as u32).max(width);
    let scaled_h = ((canvas_h as f64 * zoom) as u32).max(height);
    let scaled = imageops::resize(&rotated, scaled_w, scaled_h, FilterType::Lanczos3);

    let left = (scaled_w - width) / 2;
    let top = (scaled_h - height) / 2;
    imageops::crop_imm(&scaled, left, top, width, height).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_one_without_rotation() {
        assert_eq!(zoom_factor(800, 600, 0.0), 1.0);
    }

    #[test]
    fn test_zoom_square_at_45_degrees() {
        let expected = 45f64.to_radians().cos() + 45f64.to_radians().sin();
        assert!((zoom_factor(500, 500, 45.0) - expected).abs() < 1e-9);
        assert!((zoom_factor(500, 500, 45.0) - 1.4142).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_is_symmetric_in_angle_sign() {
        assert_eq!(zoom_factor(640, 480, 7.5), zoom_factor(640, 480, -7.5));
    }

    #[test]
    fn test_zoom_guards_degenerate_dimensions() {
        assert_eq!(zoom_factor(0, 480, 10.0), 1.0);
        assert_eq!(zoom_factor(640, 0, 10.0), 1.0);
    }

    #[test]
    fn test_rotate_to_fill_keeps_dimensions() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            61,
            40,
            image::Rgb([10, 120, 200]),
        ));
        for angle in [-30.0, -3.0, 1.5, 12.0, 45.0] {
            let out = rotate_to_fill(&img, angle);
            assert_eq!(out.dimensions(), (61, 40), "angle {angle}");
        }
    }

    #[test]
    fn test_rotate_to_fill_leaves_no_border() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            120,
            80,
            image::Rgb([0, 0, 0]),
        ));
        let out = rotate_to_fill(&img, 10.0);

        // Near-corner pixels would be white fill if the zoom were too small
        for (x, y) in [(3, 3), (116, 3), (3, 76), (116, 76)] {
            let px = out.get_pixel(x, y);
            assert!(px[0] < 128, "corner ({x}, {y}) is {:?}", px);
        }
    }
}
