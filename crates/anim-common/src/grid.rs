//! In-memory geospatial grids.

use crate::bbox::BoundingBox;
use crate::error::{AnimError, AnimResult};
use std::path::Path;

/// Storage order of a grid's value array.
///
/// Source formats disagree on which axis varies fastest. Rather than copying
/// every array into one layout, the grid records the layout and resolves it
/// on access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisOrder {
    /// `values[j * width + i]`: rows are latitudes (GeoTIFF bands, most NetCDF).
    LatLon,
    /// `values[i * height + j]`: rows are longitudes (e.g. IMERG `(lon, lat)`).
    LonLat,
}

/// A 2-D field of values with its longitude/latitude coordinate axes.
///
/// Missing samples are stored as `NaN`.
#[derive(Debug, Clone)]
pub struct Grid {
    values: Vec<f32>,
    lons: Vec<f64>,
    lats: Vec<f64>,
    order: AxisOrder,
}

impl Grid {
    /// Create a grid, checking that the axes match the value array.
    pub fn new(values: Vec<f32>, lons: Vec<f64>, lats: Vec<f64>, order: AxisOrder) -> AnimResult<Self> {
        if lons.is_empty() || lats.is_empty() {
            return Err(AnimError::DataLoad {
                path: Default::default(),
                reason: "grid has an empty coordinate axis".to_string(),
            });
        }
        if values.len() != lons.len() * lats.len() {
            return Err(AnimError::DataLoad {
                path: Default::default(),
                reason: format!(
                    "value count {} does not match axes {} lon x {} lat",
                    values.len(),
                    lons.len(),
                    lats.len()
                ),
            });
        }
        Ok(Self {
            values,
            lons,
            lats,
            order,
        })
    }

    /// Attach a source path to a construction error.
    pub fn new_for(
        path: &Path,
        values: Vec<f32>,
        lons: Vec<f64>,
        lats: Vec<f64>,
        order: AxisOrder,
    ) -> AnimResult<Self> {
        Self::new(values, lons, lats, order).map_err(|e| match e {
            AnimError::DataLoad { reason, .. } => AnimError::data_load(path, reason),
            other => other,
        })
    }

    /// Number of longitude samples.
    pub fn width(&self) -> usize {
        self.lons.len()
    }

    /// Number of latitude samples.
    pub fn height(&self) -> usize {
        self.lats.len()
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn order(&self) -> AxisOrder {
        self.order
    }

    /// Value at longitude index `i`, latitude index `j`.
    pub fn at(&self, i: usize, j: usize) -> Option<f32> {
        if i >= self.width() || j >= self.height() {
            return None;
        }
        let idx = match self.order {
            AxisOrder::LatLon => j * self.width() + i,
            AxisOrder::LonLat => i * self.height() + j,
        };
        self.values.get(idx).copied()
    }

    /// Coverage of the coordinate axes (sample centers, not cell edges).
    pub fn bbox(&self) -> BoundingBox {
        let (min_x, max_x) = axis_range(&self.lons);
        let (min_y, max_y) = axis_range(&self.lats);
        BoundingBox::new(min_x, min_y, max_x, max_y)
    }

    /// Finite value range, ignoring missing samples.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// `count` evenly spaced samples from `start` to `end`, both inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|k| if k == count - 1 { end } else { start + step * k as f64 })
                .collect()
        }
    }
}

/// Index of the axis sample nearest to `value`.
///
/// The axis may be ascending or descending. Values beyond half a cell past
/// either end return `None`, so pixels outside the data stay empty.
pub fn nearest_axis_index(axis: &[f64], value: f64) -> Option<usize> {
    nearest_axis_index_within(axis, value, 0.0)
}

/// Like [`nearest_axis_index`], but the end cells reach at least
/// `min_half_cell` past the outer samples.
///
/// A single-sample axis has no spacing to derive a cell from; its only cell
/// is `min_half_cell` wide on each side.
pub fn nearest_axis_index_within(axis: &[f64], value: f64, min_half_cell: f64) -> Option<usize> {
    let n = axis.len();
    if n == 0 || !value.is_finite() {
        return None;
    }
    if n == 1 {
        return ((axis[0] - value).abs() <= min_half_cell).then_some(0);
    }

    let ascending = axis[n - 1] >= axis[0];
    let half_first = ((axis[1] - axis[0]).abs() / 2.0).max(min_half_cell);
    let half_last = ((axis[n - 1] - axis[n - 2]).abs() / 2.0).max(min_half_cell);
    let (lo, hi) = if ascending {
        (axis[0] - half_first, axis[n - 1] + half_last)
    } else {
        (axis[n - 1] - half_last, axis[0] + half_first)
    };
    if value < lo || value > hi {
        return None;
    }

    // First index whose sample lies past `value` in axis direction.
    let upper = if ascending {
        axis.partition_point(|&a| a < value)
    } else {
        axis.partition_point(|&a| a > value)
    };
    let idx = match upper {
        0 => 0,
        u if u >= n => n - 1,
        u => {
            if (axis[u] - value).abs() < (value - axis[u - 1]).abs() {
                u
            } else {
                u - 1
            }
        }
    };
    Some(idx)
}

fn axis_range(axis: &[f64]) -> (f64, f64) {
    axis.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid(order: AxisOrder) -> Grid {
        // 3 lons x 2 lats
        let values = match order {
            AxisOrder::LatLon => vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0],
            AxisOrder::LonLat => vec![0.0, 10.0, 1.0, 11.0, 2.0, 12.0],
        };
        Grid::new(values, vec![100.0, 101.0, 102.0], vec![20.0, 21.0], order).unwrap()
    }

    #[test]
    fn test_axis_orders_agree() {
        let a = small_grid(AxisOrder::LatLon);
        let b = small_grid(AxisOrder::LonLat);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(a.at(i, j), b.at(i, j), "mismatch at ({}, {})", i, j);
            }
        }
        assert_eq!(a.at(2, 1), Some(12.0));
        assert_eq!(a.at(3, 0), None);
    }

    #[test]
    fn test_new_rejects_shape_mismatch() {
        let err = Grid::new(vec![0.0; 5], vec![0.0, 1.0, 2.0], vec![0.0, 1.0], AxisOrder::LatLon);
        assert!(matches!(err, Err(AnimError::DataLoad { .. })));
    }

    #[test]
    fn test_linspace_inclusive() {
        let xs = linspace(-10.0, 10.0, 5);
        assert_eq!(xs, vec![-10.0, -5.0, 0.0, 5.0, 10.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_nearest_axis_index_ascending_and_descending() {
        let asc = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(nearest_axis_index(&asc, 1.4), Some(1));
        assert_eq!(nearest_axis_index(&asc, 1.6), Some(2));
        assert_eq!(nearest_axis_index(&asc, -0.4), Some(0));
        assert_eq!(nearest_axis_index(&asc, 3.4), Some(3));
        assert_eq!(nearest_axis_index(&asc, 3.6), None);

        let desc = [3.0, 2.0, 1.0, 0.0];
        assert_eq!(nearest_axis_index(&desc, 2.9), Some(0));
        assert_eq!(nearest_axis_index(&desc, 0.2), Some(3));
        assert_eq!(nearest_axis_index(&desc, -0.6), None);
    }

    #[test]
    fn test_single_sample_axis_has_footprint() {
        let axis = [60.5];
        assert_eq!(nearest_axis_index(&axis, 60.5), Some(0));
        assert_eq!(nearest_axis_index(&axis, 60.51), None);
        assert_eq!(nearest_axis_index_within(&axis, 60.51, 0.1), Some(0));
        assert_eq!(nearest_axis_index_within(&axis, 60.42, 0.1), Some(0));
        assert_eq!(nearest_axis_index_within(&axis, 60.7, 0.1), None);
    }

    #[test]
    fn test_bbox_and_range() {
        let mut grid = small_grid(AxisOrder::LatLon);
        grid.values[0] = f32::NAN;
        assert_eq!(grid.value_range(), Some((1.0, 12.0)));
        assert_eq!(grid.bbox(), BoundingBox::new(100.0, 20.0, 102.0, 21.0));
    }
}
