//! GeoTIFF loading against files written by the test fixtures.

use anim_common::{AnimError, AxisOrder, DataFormat};
use grid_loader::{load, GridLoader};
use test_utils::{assert_approx_eq, create_test_grid, write_corrupt_file, write_geotiff};

#[test]
fn test_axes_match_value_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precip_20200101.tif");
    let (w, h) = (8, 5);
    write_geotiff(&path, w, h, &create_test_grid(w, h), (60.0, 5.0, 100.0, 30.0), None).unwrap();

    let grid = load(&path, DataFormat::GeoTiff, "ignored").unwrap();
    assert_eq!(grid.width(), w);
    assert_eq!(grid.height(), h);
    assert_eq!(grid.lons().len(), grid.width());
    assert_eq!(grid.lats().len(), grid.height());
    assert_eq!(grid.order(), AxisOrder::LatLon);
}

#[test]
fn test_axes_span_bounds_inclusive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precip_20200101.tif");
    write_geotiff(&path, 5, 3, &create_test_grid(5, 3), (-10.0, 20.0, 10.0, 26.0), None).unwrap();

    let grid = load(&path, DataFormat::GeoTiff, "").unwrap();
    assert_approx_eq!(grid.lons()[0], -10.0, 1e-9);
    assert_approx_eq!(grid.lons()[4], 10.0, 1e-9);
    assert_approx_eq!(grid.lons()[2], 0.0, 1e-9);
    assert_approx_eq!(grid.lats()[0], 20.0, 1e-9);
    assert_approx_eq!(grid.lats()[2], 26.0, 1e-9);
}

#[test]
fn test_rows_are_flipped_south_to_north() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precip_20200101.tif");
    // Raster row 0 is the northern edge: value = col * 1000 + row
    write_geotiff(&path, 4, 3, &create_test_grid(4, 3), (0.0, 0.0, 4.0, 3.0), None).unwrap();

    let grid = load(&path, DataFormat::GeoTiff, "").unwrap();
    // lat index 0 is the southern row, i.e. raster row 2
    assert_eq!(grid.at(0, 0), Some(2.0));
    assert_eq!(grid.at(3, 0), Some(3002.0));
    // lat index 2 is the northern row, raster row 0
    assert_eq!(grid.at(1, 2), Some(1000.0));
}

#[test]
fn test_nodata_becomes_nan() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precip_20200101.tif");
    let mut data = vec![1.0f32; 6];
    data[0] = -9999.0;
    write_geotiff(&path, 3, 2, &data, (0.0, 0.0, 3.0, 2.0), Some(-9999.0)).unwrap();

    let grid = GridLoader::new(DataFormat::GeoTiff, "band").load(&path).unwrap();
    // raster (0, 0) is the north-west corner: lon index 0, lat index 1
    assert!(grid.at(0, 1).unwrap().is_nan());
    assert_eq!(grid.at(1, 1), Some(1.0));
    assert_eq!(grid.value_range(), Some((1.0, 1.0)));
}

#[test]
fn test_corrupt_file_is_data_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("precip_20200101.tif");
    write_corrupt_file(&path).unwrap();

    let err = load(&path, DataFormat::GeoTiff, "").unwrap_err();
    assert!(matches!(err, AnimError::DataLoad { .. }), "{err}");
    assert!(err.is_per_file());
}

#[test]
fn test_missing_file_is_data_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("nope_20200101.tif"), DataFormat::GeoTiff, "").unwrap_err();
    assert!(matches!(err, AnimError::DataLoad { .. }));
}
