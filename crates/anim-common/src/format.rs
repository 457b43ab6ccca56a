//! Supported source raster formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnimError;

/// Declared format of the input rasters.
///
/// `Nc4` and `NetCdf` are read the same way; they are kept apart because
/// configuration files use both names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Nc4,
    NetCdf,
    GeoTiff,
}

impl DataFormat {
    /// Configuration name of this format.
    pub fn name(&self) -> &'static str {
        match self {
            DataFormat::Nc4 => "nc4",
            DataFormat::NetCdf => "netcdf",
            DataFormat::GeoTiff => "geotiff",
        }
    }

    /// True for the labeled multidimensional dataset family.
    pub fn is_netcdf(&self) -> bool {
        matches!(self, DataFormat::Nc4 | DataFormat::NetCdf)
    }
}

impl FromStr for DataFormat {
    type Err = AnimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nc4" => Ok(DataFormat::Nc4),
            "netcdf" => Ok(DataFormat::NetCdf),
            "geotiff" => Ok(DataFormat::GeoTiff),
            other => Err(AnimError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
