use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

pub const DEFAULT_KERNEL_SIZE: u32 = 10;
/// Largest element imageproc can anchor (`u8` centre coordinates)
pub const MAX_KERNEL_SIZE: u32 = 511;
pub const DEFAULT_TOLERANCE: f64 = 1.5;

/// How the cleaned mask is turned into an edge map
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeMode {
    /// Foreground pixels with a differing 4-neighbour; exact on class rasters
    #[default]
    Binary,
    /// Canny on the mask rendered as 0/255, gaps closed with a 3x3 dilation
    Canny { low: f32, high: f32 },
}

/// Tunable parameters of [`MaskToPolygon`](crate::MaskToPolygon)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Side length of the square structuring element
    pub kernel_size: u32,
    /// Douglas-Peucker tolerance in pixels
    pub tolerance: f64,
    pub edge_mode: EdgeMode,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            tolerance: DEFAULT_TOLERANCE,
            edge_mode: EdgeMode::Binary,
        }
    }
}

impl ExtractorConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ExtractResult<()> {
        if !(1..=MAX_KERNEL_SIZE).contains(&self.kernel_size) {
            return Err(ExtractError::config(format!(
                "kernel size must be between 1 and {}, got {}",
                MAX_KERNEL_SIZE, self.kernel_size
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ExtractError::config(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if let EdgeMode::Canny { low, high } = self.edge_mode {
            if !(low > 0.0 && high >= low) {
                return Err(ExtractError::config(format!(
                    "canny thresholds need 0 < low <= high, got low={} high={}",
                    low, high
                )));
            }
        }
        Ok(())
    }
}
