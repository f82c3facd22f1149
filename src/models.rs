use std::fmt;
use std::str::FromStr;

use geo::{Area, BoundingRect, Polygon, Rect};
use image::GrayImage;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// Pixel space the boundary is rescaled into, as (width, height)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: f64,
    pub height: f64,
}

impl TargetSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub(crate) fn validate(&self) -> ExtractResult<()> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(self.width) && usable(self.height) {
            Ok(())
        } else {
            Err(ExtractError::config(format!(
                "target size must be positive, got {}",
                self
            )))
        }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parses `WIDTHxHEIGHT`, e.g. `1024x768`
impl FromStr for TargetSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(|c: char| c == 'x' || c == 'X')
            .ok_or_else(|| anyhow::anyhow!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: f64 = w.trim().parse()?;
        let height: f64 = h.trim().parse()?;
        Ok(Self::new(width, height))
    }
}

/// Simplified closed boundary of the largest foreground region
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygon: Polygon<f64>,
    scale: Option<(f64, f64)>,
}

impl Boundary {
    pub(crate) fn new(polygon: Polygon<f64>, scale: Option<(f64, f64)>) -> Self {
        Self { polygon, scale }
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Closed ring: the first point is repeated as the last one
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.polygon
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect()
    }

    /// Ring without the closing point
    pub fn vertices(&self) -> Vec<(f64, f64)> {
        let mut points = self.points();
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices().len()
    }

    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }

    /// (scale_x, scale_y) applied to the points, if any
    pub fn scale(&self) -> Option<(f64, f64)> {
        self.scale
    }

    pub fn is_scaled(&self) -> bool {
        self.scale.is_some()
    }
}

/// Intermediate artifacts kept for inspection
#[derive(Debug, Clone)]
pub struct Diagnostics {
    /// Class raster after close + open
    pub processed: GrayImage,
    /// Edge map the contours were traced from (255 = edge)
    pub edges: GrayImage,
    /// Selected external contour as a ring of pixel corners, with straight
    /// runs collapsed to their end points
    pub contour: Vec<Point<i32>>,
    /// Number of external contours that enclosed a region
    pub candidates: usize,
    /// Simplified polygon in mask pixel space, before any scaling
    pub simplified: Polygon<f64>,
}

/// Result record of one extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub boundary: Boundary,
    pub diagnostics: Option<Diagnostics>,
}
