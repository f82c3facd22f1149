#![allow(dead_code)]

use image::{GrayImage, Luma};
use maskpoly::Mask;
use ndarray::Array2;
use tempfile::NamedTempFile;

/// Class raster of `width` x `height` with every pixel set by `class_at(x, y)`
pub fn mask_from_fn(width: u32, height: u32, class_at: impl Fn(u32, u32) -> u8) -> Mask {
    let img = GrayImage::from_fn(width, height, |x, y| Luma([class_at(x, y)]));
    Mask::from_gray(img).expect("fixture mask has a non-empty shape")
}

/// Axis-aligned rectangle [x0, x1) x [y0, y1) of class 1 on a zero background
pub fn rect_mask(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Mask {
    mask_from_fn(width, height, |x, y| {
        u8::from((x0..x1).contains(&x) && (y0..y1).contains(&y))
    })
}

/// 100x100 mask with ones on rows and columns 30..70
pub fn square_mask() -> Mask {
    rect_mask(100, 100, 30, 30, 70, 70)
}

/// Filled disk of class 1
pub fn disk_mask(size: u32, cx: f64, cy: f64, radius: f64) -> Mask {
    mask_from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
        u8::from(dx * dx + dy * dy <= radius * radius)
    })
}

/// Same geometry as [`square_mask`], as a float array the way a model emits it
pub fn square_array_f64() -> Array2<f64> {
    Array2::from_shape_fn((100, 100), |(r, c)| {
        if (30..70).contains(&r) && (30..70).contains(&c) { 1.0 } else { 0.0 }
    })
}

/// Saves the mask as an 8-bit PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn save_png(mask: &Mask) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp mask file");
    mask.as_image()
        .save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test mask");
    file
}

/// Bounding box of a point list as (min_x, min_y, max_x, max_y)
pub fn bbox(points: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    points.iter().fold(
        (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    )
}

/// Assert two boxes agree within `tol` on every side
pub fn assert_bbox_near(actual: (f64, f64, f64, f64), expected: (f64, f64, f64, f64), tol: f64) {
    let pairs = [
        (actual.0, expected.0),
        (actual.1, expected.1),
        (actual.2, expected.2),
        (actual.3, expected.3),
    ];
    for (a, e) in pairs {
        assert!(
            (a - e).abs() <= tol,
            "bbox {:?} not within {} of {:?}",
            actual,
            tol,
            expected
        );
    }
}
