//! Grayscale morphology with a square structuring element.
//!
//! Mask cleanup uses a 10x10 element anchored at (5, 5). Erosion applies it
//! as given and dilation applies its reflection (anchor (4, 4)), so closing
//! and opening leave regions in place. Pixels outside the image are ignored.

use std::fmt;

use image::{GrayImage, Luma};
use imageproc::morphology::{Mask as Element, grayscale_dilate, grayscale_erode};

use crate::config::MAX_KERNEL_SIZE;
use crate::error::{ExtractError, ExtractResult};

/// Square structuring element of ones, anchored at `size / 2`
pub struct Kernel {
    size: u32,
    erosion: Element,
    dilation: Element,
}

impl Kernel {
    pub fn square(size: u32) -> ExtractResult<Self> {
        if !(1..=MAX_KERNEL_SIZE).contains(&size) {
            return Err(ExtractError::config(format!(
                "kernel size must be between 1 and {}, got {}",
                MAX_KERNEL_SIZE, size
            )));
        }
        let anchor = size / 2;
        let reflected = size - 1 - anchor;
        let block = GrayImage::from_pixel(size, size, Luma([255]));
        Ok(Self {
            size,
            erosion: Element::from_image(&block, anchor as u8, anchor as u8),
            dilation: Element::from_image(&block, reflected as u8, reflected as u8),
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn anchor(&self) -> u32 {
        self.size / 2
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("size", &self.size)
            .field("anchor", &self.anchor())
            .finish()
    }
}

pub fn dilate(img: &GrayImage, kernel: &Kernel) -> GrayImage {
    grayscale_dilate(img, &kernel.dilation)
}

pub fn erode(img: &GrayImage, kernel: &Kernel) -> GrayImage {
    grayscale_erode(img, &kernel.erosion)
}

/// Dilate then erode: fills holes and gaps narrower than the kernel
pub fn close(img: &GrayImage, kernel: &Kernel) -> GrayImage {
    erode(&dilate(img, kernel), kernel)
}

/// Erode then dilate: strips specks and protrusions narrower than the kernel
pub fn open(img: &GrayImage, kernel: &Kernel) -> GrayImage {
    dilate(&erode(img, kernel), kernel)
}
