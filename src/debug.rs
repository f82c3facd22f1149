//! Inspection images for the debug output directory.

use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use crate::mask::Mask;
use crate::models::Diagnostics;

const FOREGROUND: Rgb<u8> = Rgb([110, 110, 110]);
const EDGE: Rgb<u8> = Rgb([255, 0, 0]);
const OUTLINE: Rgb<u8> = Rgb([0, 255, 0]);
const VERTEX: Rgb<u8> = Rgb([0, 128, 255]);

/// Stretch small class ids over the full 8-bit range so they are visible
pub fn stretch_classes(classes: &GrayImage) -> GrayImage {
    let max = classes.pixels().map(|p| p[0]).max().unwrap_or(0);
    if max == 0 {
        return classes.clone();
    }
    let (w, h) = classes.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let v = classes.get_pixel(x, y)[0] as u32;
        Luma([(v * 255 / max as u32) as u8])
    })
}

/// Mask foreground in grey, edge map in red, simplified outline in green
/// with its vertices in blue. Drawn in mask pixel space.
pub fn render_overlay(mask: &Mask, diagnostics: &Diagnostics) -> RgbImage {
    let (w, h) = mask.as_image().dimensions();
    let mut canvas = RgbImage::from_fn(w, h, |x, y| {
        if diagnostics.edges.get_pixel(x, y)[0] != 0 {
            EDGE
        } else if mask.as_image().get_pixel(x, y)[0] != 0 {
            FOREGROUND
        } else {
            Rgb([0, 0, 0])
        }
    });

    let ring = diagnostics.simplified.exterior();
    for line in ring.lines() {
        draw_line_segment_mut(
            &mut canvas,
            (line.start.x as f32, line.start.y as f32),
            (line.end.x as f32, line.end.y as f32),
            OUTLINE,
        );
    }
    for c in ring.coords() {
        draw_filled_circle_mut(&mut canvas, (c.x.round() as i32, c.y.round() as i32), 1, VERTEX);
    }

    canvas
}
