//! Geographic extents.

use serde::{Deserialize, Serialize};

use crate::error::{AnimError, AnimResult};

/// A geographic bounding box in degrees.
///
/// Used both as the configured map region (`x` = longitude, `y` = latitude)
/// and as the coverage of a loaded grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a map region in the `lon_min, lon_max, lat_min, lat_max` order
    /// used by configuration files, rejecting empty or inverted extents.
    pub fn from_region(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> AnimResult<Self> {
        let bbox = Self::new(lon_min, lat_min, lon_max, lat_max);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check that the extent is finite and non-degenerate.
    pub fn validate(&self) -> AnimResult<()> {
        let values = [self.min_x, self.min_y, self.max_x, self.max_y];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AnimError::config(format!("region has non-finite bounds: {:?}", self)));
        }
        if self.min_x >= self.max_x {
            return Err(AnimError::config(format!(
                "region lon_min ({}) must be less than lon_max ({})",
                self.min_x, self.max_x
            )));
        }
        if self.min_y >= self.max_y {
            return Err(AnimError::config(format!(
                "region lat_min ({}) must be less than lat_max ({})",
                self.min_y, self.max_y
            )));
        }
        Ok(())
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}
