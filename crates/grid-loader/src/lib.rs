//! Format-agnostic grid loading.
//!
//! Every supported source format produces the same [`Grid`] shape: a value
//! array plus longitude/latitude axes. Dispatch is a plain `match` on
//! [`DataFormat`]; supporting another format means one new variant and one
//! new arm here.
//!
//! All file handles are owned by the load call and closed before it returns.

pub mod geotiff;
pub mod nc;

use std::path::Path;

use anim_common::{AnimResult, DataFormat, Grid};
use tracing::debug;

pub use nc::silence_hdf5_errors;

/// Loads one grid per input file for a fixed format and variable.
#[derive(Debug, Clone)]
pub struct GridLoader {
    format: DataFormat,
    variable_name: String,
}

impl GridLoader {
    pub fn new(format: DataFormat, variable_name: impl Into<String>) -> Self {
        Self {
            format,
            variable_name: variable_name.into(),
        }
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn load(&self, path: &Path) -> AnimResult<Grid> {
        load(path, self.format, &self.variable_name)
    }
}

/// Load `path` as `format`.
///
/// For NetCDF sources `variable_name` selects the data variable; GeoTIFF
/// sources always read band 1 and ignore it.
pub fn load(path: &Path, format: DataFormat, variable_name: &str) -> AnimResult<Grid> {
    let grid = match format {
        DataFormat::Nc4 | DataFormat::NetCdf => nc::load_netcdf(path, variable_name)?,
        DataFormat::GeoTiff => geotiff::load_geotiff(path)?,
    };

    debug!(
        path = %path.display(),
        format = %format,
        width = grid.width(),
        height = grid.height(),
        order = ?grid.order(),
        "Loaded grid"
    );

    Ok(grid)
}
