//! NetCDF grid loading using the native netcdf library.
//!
//! The named variable is read with every singleton dimension (typically
//! `time`) dropped; exactly two dimensions must remain. Their coordinate
//! variables become the grid axes, and the dimension order decides the
//! grid's [`AxisOrder`].

use std::path::Path;
use std::sync::Once;

use anim_common::{AnimError, AnimResult, AxisOrder, Grid};
use tracing::{debug, warn};

const LON_NAMES: &[&str] = &["lon", "longitude", "x"];
const LAT_NAMES: &[&str] = &["lat", "latitude", "y"];

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics even when a missing
/// attribute is handled gracefully on the Rust side. Safe to call more than
/// once; only the first call has an effect.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and null handlers are a
        // documented way to disable automatic error output.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Which horizontal axis a dimension represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Lon,
    Lat,
}

fn classify_dimension(name: &str) -> Option<Axis> {
    let lower = name.to_ascii_lowercase();
    if LON_NAMES.contains(&lower.as_str()) {
        Some(Axis::Lon)
    } else if LAT_NAMES.contains(&lower.as_str()) {
        Some(Axis::Lat)
    } else {
        None
    }
}

/// Decide the storage order from the two non-singleton dimension names.
fn axis_order(first: &str, second: &str) -> AxisOrder {
    match (classify_dimension(first), classify_dimension(second)) {
        (Some(Axis::Lon), _) | (_, Some(Axis::Lat)) => AxisOrder::LonLat,
        _ => AxisOrder::LatLon,
    }
}

/// Load `variable_name` from the NetCDF file at `path`.
pub fn load_netcdf(path: &Path, variable_name: &str) -> AnimResult<Grid> {
    silence_hdf5_errors();

    let file = ::netcdf::open(path)
        .map_err(|e| AnimError::data_load(path, format!("failed to open NetCDF: {}", e)))?;

    let var = file.variable(variable_name).ok_or_else(|| {
        AnimError::data_load(path, format!("variable '{}' not found", variable_name))
    })?;

    let dims: Vec<(String, usize)> = var
        .dimensions()
        .iter()
        .map(|d| (d.name(), d.len()))
        .collect();
    let kept: Vec<&(String, usize)> = dims.iter().filter(|(_, len)| *len != 1).collect();
    if kept.len() != 2 {
        return Err(AnimError::data_load(
            path,
            format!(
                "variable '{}' has dimensions {:?}; expected two after dropping singletons",
                variable_name, dims
            ),
        ));
    }
    let (rows_dim, cols_dim) = (&kept[0].0, &kept[1].0);

    let order = axis_order(rows_dim, cols_dim);
    let (lon_dim, lat_dim) = match order {
        AxisOrder::LonLat => (rows_dim, cols_dim),
        AxisOrder::LatLon => (cols_dim, rows_dim),
    };
    if classify_dimension(lon_dim).is_none() || classify_dimension(lat_dim).is_none() {
        warn!(
            path = %path.display(),
            dims = ?dims,
            "Unrecognised coordinate dimension names, assuming (lat, lon) order"
        );
    }

    let lons = read_axis(&file, path, lon_dim)?;
    let lats = read_axis(&file, path, lat_dim)?;

    let raw: Vec<f32> = var.get_values::<f32, _>(..).map_err(|e| {
        AnimError::data_load(path, format!("failed to read '{}': {}", variable_name, e))
    })?;

    let scale_factor = get_f64_attr(&var, "scale_factor").unwrap_or(1.0) as f32;
    let add_offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0) as f32;
    let fill_values: Vec<f32> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|name| get_f64_attr(&var, name))
        .map(|v| v as f32)
        .collect();

    let values: Vec<f32> = raw
        .into_iter()
        .map(|val| {
            if !val.is_finite() || fill_values.contains(&val) {
                f32::NAN
            } else {
                val * scale_factor + add_offset
            }
        })
        .collect();

    debug!(
        path = %path.display(),
        variable = variable_name,
        dims = ?dims,
        scale_factor,
        add_offset,
        "Read NetCDF variable"
    );

    Grid::new_for(path, values, lons, lats, order)
}

/// Read a 1-D coordinate variable named after its dimension.
fn read_axis(file: &::netcdf::File, path: &Path, name: &str) -> AnimResult<Vec<f64>> {
    let var = file.variable(name).ok_or_else(|| {
        AnimError::data_load(path, format!("coordinate variable '{}' not found", name))
    })?;
    var.get_values::<f64, _>(..)
        .map_err(|e| AnimError::data_load(path, format!("failed to read '{}': {}", name, e)))
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &::netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Numeric attribute as f64, whatever its stored type.
fn get_f64_attr(var: &::netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_dimension() {
        assert_eq!(classify_dimension("lon"), Some(Axis::Lon));
        assert_eq!(classify_dimension("Longitude"), Some(Axis::Lon));
        assert_eq!(classify_dimension("lat"), Some(Axis::Lat));
        assert_eq!(classify_dimension("time"), None);
    }

    #[test]
    fn test_axis_order_from_dimension_names() {
        // IMERG stores precipitation as (time, lon, lat)
        assert_eq!(axis_order("lon", "lat"), AxisOrder::LonLat);
        assert_eq!(axis_order("lat", "lon"), AxisOrder::LatLon);
        assert_eq!(axis_order("latitude", "longitude"), AxisOrder::LatLon);
        // CF default when names are unknown
        assert_eq!(axis_order("rows", "cols"), AxisOrder::LatLon);
    }
}
