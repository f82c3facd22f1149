use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::dilate;

use crate::config::EdgeMode;

const EDGE: Luma<u8> = Luma([255]);

/// Detect region edges in a class raster
pub fn detect_edges(classes: &GrayImage, mode: EdgeMode) -> GrayImage {
    match mode {
        EdgeMode::Binary => binary_edges(classes),
        EdgeMode::Canny { low, high } => canny_edges(classes, low, high),
    }
}

/// Mark foreground pixels that touch a different value through a 4-neighbour.
///
/// Positions outside the raster count as background, so a region touching
/// the image border still gets a closed edge ring.
pub fn binary_edges(classes: &GrayImage) -> GrayImage {
    let (width, height) = classes.dimensions();
    let value_at = |x: i64, y: i64| -> u8 {
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            0
        } else {
            classes.get_pixel(x as u32, y as u32)[0]
        }
    };

    let mut edges = GrayImage::new(width, height);
    for (x, y, pixel) in classes.enumerate_pixels() {
        let v = pixel[0];
        if v == 0 {
            continue;
        }
        let (xi, yi) = (x as i64, y as i64);
        let neighbours = [(xi - 1, yi), (xi + 1, yi), (xi, yi - 1), (xi, yi + 1)];
        if neighbours.iter().any(|&(nx, ny)| value_at(nx, ny) != v) {
            edges.put_pixel(x, y, EDGE);
        }
    }
    edges
}

/// Canny on the foreground rendered as 0/255.
///
/// Canny can leave one or two pixel breaks at sharp corners; a 3x3 dilation
/// closes them so border following sees a ring.
pub fn canny_edges(classes: &GrayImage, low: f32, high: f32) -> GrayImage {
    let (width, height) = classes.dimensions();
    let rendered = GrayImage::from_fn(width, height, |x, y| {
        if classes.get_pixel(x, y)[0] != 0 { EDGE } else { Luma([0]) }
    });
    let edges = canny(&rendered, low, high);
    dilate(&edges, Norm::LInf, 1)
}
