//! Class-id rasters and the numeric casting rules used to build them.

use std::collections::BTreeSet;

use image::{DynamicImage, GrayImage, Luma};
use ndarray::{Array2, ArrayView2, ArrayView3, s};

use crate::error::{ExtractError, ExtractResult};

/// Element types a mask can be built from.
///
/// Casting follows the usual 8-bit conversion of class predictions:
/// floats truncate toward zero and anything above 255 saturates.
/// Negative and non-finite values have no class id and are rejected.
pub trait MaskValue: Copy {
    fn to_class(self) -> Option<u8>;
}

macro_rules! unsigned_mask_value {
    ($($t:ty),*) => {$(
        impl MaskValue for $t {
            fn to_class(self) -> Option<u8> {
                Some(self.min(u8::MAX as $t) as u8)
            }
        }
    )*};
}

macro_rules! signed_mask_value {
    ($($t:ty),*) => {$(
        impl MaskValue for $t {
            fn to_class(self) -> Option<u8> {
                if self < 0 {
                    None
                } else {
                    Some(u8::try_from(self).unwrap_or(u8::MAX))
                }
            }
        }
    )*};
}

macro_rules! float_mask_value {
    ($($t:ty),*) => {$(
        impl MaskValue for $t {
            fn to_class(self) -> Option<u8> {
                if !self.is_finite() || self < 0.0 {
                    None
                } else {
                    // `as` truncates toward zero and saturates at 255
                    Some(self as u8)
                }
            }
        }
    )*};
}

unsigned_mask_value!(u8, u16, u32, u64, usize);
signed_mask_value!(i8, i16, i32, i64);
float_mask_value!(f32, f64);

impl MaskValue for bool {
    fn to_class(self) -> Option<u8> {
        Some(self as u8)
    }
}

/// Dense 2D grid of class ids, shape (rows, cols).
///
/// Stored as a [`GrayImage`] with `width = cols` and `height = rows`, so pixel
/// `(x, y)` is array element `[[y, x]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    classes: GrayImage,
}

impl Mask {
    /// Cast a numeric 2D array into a class raster
    pub fn from_array<T: MaskValue>(array: ArrayView2<'_, T>) -> ExtractResult<Self> {
        let (rows, cols) = array.dim();
        check_shape(rows, cols)?;
        let width = u32::try_from(cols).map_err(|_| ExtractError::input("mask too wide"))?;
        let height = u32::try_from(rows).map_err(|_| ExtractError::input("mask too tall"))?;

        let mut classes = GrayImage::new(width, height);
        for ((row, col), value) in array.indexed_iter() {
            let class = value.to_class().ok_or_else(|| {
                ExtractError::input(format!(
                    "value at ({}, {}) is negative or not a number",
                    row, col
                ))
            })?;
            classes.put_pixel(col as u32, row as u32, Luma([class]));
        }

        Ok(Self { classes })
    }

    /// Use an 8-bit raster as-is; each pixel value is a class id
    pub fn from_gray(classes: GrayImage) -> ExtractResult<Self> {
        let (w, h) = classes.dimensions();
        check_shape(h as usize, w as usize)?;
        Ok(Self { classes })
    }

    /// Build from a decoded image.
    ///
    /// 8-bit luma is taken directly, 16-bit luma saturates at 255, and every
    /// other layout uses its first (red) channel.
    pub fn from_image(img: &DynamicImage) -> ExtractResult<Self> {
        match img {
            DynamicImage::ImageLuma8(gray) => Self::from_gray(gray.clone()),
            DynamicImage::ImageLuma16(gray) => {
                let (w, h) = gray.dimensions();
                let classes = GrayImage::from_fn(w, h, |x, y| {
                    Luma([gray.get_pixel(x, y)[0].min(255) as u8])
                });
                Self::from_gray(classes)
            }
            other => {
                let rgb = other.to_rgb8();
                let (w, h) = rgb.dimensions();
                let classes = GrayImage::from_fn(w, h, |x, y| Luma([rgb.get_pixel(x, y)[0]]));
                Self::from_gray(classes)
            }
        }
    }

    /// (rows, cols), i.e. (height, width)
    pub fn shape(&self) -> (usize, usize) {
        let (w, h) = self.classes.dimensions();
        (h as usize, w as usize)
    }

    pub fn width(&self) -> u32 {
        self.classes.width()
    }

    pub fn height(&self) -> u32 {
        self.classes.height()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.classes
    }

    pub fn into_image(self) -> GrayImage {
        self.classes
    }

    pub fn to_array(&self) -> Array2<u8> {
        let (rows, cols) = self.shape();
        Array2::from_shape_fn((rows, cols), |(r, c)| {
            self.classes.get_pixel(c as u32, r as u32)[0]
        })
    }

    pub fn foreground_count(&self) -> usize {
        self.classes.pixels().filter(|p| p[0] != 0).count()
    }

    /// Distinct non-zero class ids present in the mask
    pub fn class_values(&self) -> BTreeSet<u8> {
        self.classes
            .pixels()
            .map(|p| p[0])
            .filter(|&v| v != 0)
            .collect()
    }
}

fn check_shape(rows: usize, cols: usize) -> ExtractResult<()> {
    if rows == 0 || cols == 0 {
        return Err(ExtractError::input(format!(
            "mask must be non-empty, got shape ({}, {})",
            rows, cols
        )));
    }
    Ok(())
}

/// Reduce per-class scores of shape (rows, cols, classes) to class ids.
///
/// Ties pick the lowest class index and NaN scores never win.
pub fn argmax_classes<T>(scores: ArrayView3<'_, T>) -> ExtractResult<Array2<u8>>
where
    T: Copy + PartialOrd,
{
    let (rows, cols, classes) = scores.dim();
    check_shape(rows, cols)?;
    if classes == 0 {
        return Err(ExtractError::input("score array has no class axis entries"));
    }
    if classes > 256 {
        return Err(ExtractError::input(format!(
            "{} classes do not fit in an 8-bit class id",
            classes
        )));
    }

    let mut out = Array2::<u8>::zeros((rows, cols));
    for ((row, col), class_id) in out.indexed_iter_mut() {
        let lane = scores.slice(s![row, col, ..]);
        let mut best: Option<(usize, T)> = None;
        for (class, &score) in lane.iter().enumerate() {
            // NaN is unordered, even against itself
            if score.partial_cmp(&score).is_none() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((class, score)),
            }
        }
        *class_id = best.map(|(class, _)| class as u8).unwrap_or(0);
    }

    Ok(out)
}
