pub mod contours;
pub mod edges;
pub mod morphology;
pub mod polygon;

use tracing::{debug, warn};

use crate::config::ExtractorConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::mask::Mask;
use crate::models::{Boundary, Diagnostics, Extraction, TargetSize};
use morphology::Kernel;

/// Converts a class mask into the simplified boundary of its largest region.
///
/// Holds only configuration; every call works on call-local buffers, so one
/// instance can serve many threads at once.
#[derive(Debug, Clone)]
pub struct MaskToPolygon {
    target: Option<TargetSize>,
    config: ExtractorConfig,
    keep_diagnostics: bool,
}

impl MaskToPolygon {
    pub fn new(target: Option<TargetSize>) -> Self {
        Self {
            target,
            config: ExtractorConfig::default(),
            keep_diagnostics: false,
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Keep intermediate rasters and the chosen contour in the result
    pub fn with_diagnostics(mut self, keep: bool) -> Self {
        self.keep_diagnostics = keep;
        self
    }

    pub fn target(&self) -> Option<TargetSize> {
        self.target
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Ordered boundary points as a closed ring (first point repeated last).
    ///
    /// With `scale_points` the points are mapped into the configured target
    /// size; see [`MaskToPolygon::scale_factors`].
    pub fn extract_boundary(&self, mask: &Mask, scale_points: bool) -> ExtractResult<Vec<(f64, f64)>> {
        Ok(self.extract(mask, scale_points)?.boundary.points())
    }

    /// Run the full extraction and return the result record
    pub fn extract(&self, mask: &Mask, scale_points: bool) -> ExtractResult<Extraction> {
        self.config.validate()?;
        let factors = if scale_points {
            Some(self.scale_factors(mask)?)
        } else {
            None
        };
        let kernel = Kernel::square(self.config.kernel_size)?;

        // Close first to fill holes inside the region, then open to strip specks outside it
        let closed = morphology::close(mask.as_image(), &kernel);
        let processed = morphology::open(&closed, &kernel);
        debug!(
            width = mask.width(),
            height = mask.height(),
            foreground_before = mask.foreground_count(),
            foreground_after = processed.pixels().filter(|p| p[0] != 0).count(),
            "morphological cleanup done"
        );

        let edges = edges::detect_edges(&processed, self.config.edge_mode);
        let mut candidates = contours::find_external_contours(&edges);
        let candidate_count = candidates.len();
        let chosen = contours::largest_by_area(&candidates).ok_or(ExtractError::EmptyMask)?;
        debug!(
            candidates = candidate_count,
            chosen,
            vertices = candidates[chosen].len(),
            "selected largest external contour"
        );

        let fitted = polygon::fit_polygon(&candidates[chosen]);
        let simplified = match polygon::simplify(&fitted, self.config.tolerance) {
            Some(simplified) => simplified,
            None => {
                warn!(
                    tolerance = self.config.tolerance,
                    "simplification collapsed the ring, keeping the unsimplified contour"
                );
                fitted
            }
        };
        debug!(
            vertices = polygon::distinct_vertices(&simplified),
            "simplified boundary"
        );

        let output = match factors {
            Some((sx, sy)) => polygon::scale_about_origin(&simplified, sx, sy),
            None => simplified.clone(),
        };
        let boundary = Boundary::new(output, factors);

        let diagnostics = self.keep_diagnostics.then(|| Diagnostics {
            processed,
            edges,
            contour: candidates.swap_remove(chosen),
            candidates: candidate_count,
            simplified,
        });

        Ok(Extraction {
            boundary,
            diagnostics,
        })
    }

    /// Per-axis factors taken against the mask's own shape:
    /// `(target.width / rows, target.height / cols)`.
    pub fn scale_factors(&self, mask: &Mask) -> ExtractResult<(f64, f64)> {
        let target = self.target.ok_or_else(|| {
            ExtractError::config("point scaling requested but no target size was configured")
        })?;
        target.validate()?;
        let (rows, cols) = mask.shape();
        Ok((target.width / rows as f64, target.height / cols as f64))
    }
}

impl Default for MaskToPolygon {
    fn default() -> Self {
        Self::new(None)
    }
}
