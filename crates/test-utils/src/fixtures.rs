//! On-disk fixtures: small GeoTIFF, NetCDF and GeoJSON files.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::json;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Test regions as `(min_lon, min_lat, max_lon, max_lat)`.
pub mod bbox {
    /// South Asia, a typical IMERG precipitation study area
    pub const SOUTH_ASIA: (f64, f64, f64, f64) = (60.0, 5.0, 100.0, 40.0);
}

fn tiff_to_io(err: tiff::TiffError) -> io::Error {
    io::Error::other(err.to_string())
}

/// Write a single-band float32 GeoTIFF.
///
/// `data` is row-major with row 0 at the northern edge, as rasters are
/// stored on disk. `bounds` is `(min_lon, min_lat, max_lon, max_lat)` of the
/// raster's outer edges.
pub fn write_geotiff(
    path: &Path,
    width: usize,
    height: usize,
    data: &[f32],
    bounds: (f64, f64, f64, f64),
    nodata: Option<f32>,
) -> io::Result<()> {
    let (min_lon, min_lat, max_lon, max_lat) = bounds;
    let pixel_x = (max_lon - min_lon) / width as f64;
    let pixel_y = (max_lat - min_lat) / height as f64;

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(file).map_err(tiff_to_io)?;
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(width as u32, height as u32)
        .map_err(tiff_to_io)?;

    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel_x, pixel_y, 0.0][..])
        .map_err(tiff_to_io)?;
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, min_lon, max_lat, 0.0][..])
        .map_err(tiff_to_io)?;
    if let Some(nd) = nodata {
        let text = format!("{}", nd);
        image
            .encoder()
            .write_tag(Tag::GdalNodata, text.as_str())
            .map_err(tiff_to_io)?;
    }

    image.write_data(data).map_err(tiff_to_io)
}

/// Write a NetCDF file with a `(time=1, lon, lat)` or `(time=1, lat, lon)` variable.
///
/// `data` must already be in the requested dimension order.
pub fn write_netcdf(
    path: &Path,
    variable: &str,
    lons: &[f64],
    lats: &[f64],
    data: &[f32],
    lon_major: bool,
    fill_value: Option<f32>,
) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("time", 1)?;
    file.add_dimension("lon", lons.len())?;
    file.add_dimension("lat", lats.len())?;

    {
        let mut lon_var = file.add_variable::<f64>("lon", &["lon"])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(lons, ..)?;
    }
    {
        let mut lat_var = file.add_variable::<f64>("lat", &["lat"])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(lats, ..)?;
    }

    let dims: &[&str] = if lon_major {
        &["time", "lon", "lat"]
    } else {
        &["time", "lat", "lon"]
    };
    let mut var = file.add_variable::<f32>(variable, dims)?;
    if let Some(fill) = fill_value {
        var.put_attribute("_FillValue", fill)?;
    }
    var.put_attribute("units", "mm/day")?;
    var.put_values(data, ..)?;

    Ok(())
}

/// Write a GeoJSON FeatureCollection of LineStrings.
pub fn write_geojson_lines(path: &Path, lines: &[Vec<(f64, f64)>]) -> io::Result<()> {
    let features: Vec<_> = lines
        .iter()
        .map(|line| {
            let coords: Vec<[f64; 2]> = line.iter().map(|&(x, y)| [x, y]).collect();
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "LineString", "coordinates": coords }
            })
        })
        .collect();
    write_collection(path, features)
}

/// Write a GeoJSON FeatureCollection of single-ring Polygons.
pub fn write_geojson_polygons(path: &Path, rings: &[Vec<(f64, f64)>]) -> io::Result<()> {
    let features: Vec<_> = rings
        .iter()
        .map(|ring| {
            let coords: Vec<[f64; 2]> = ring.iter().map(|&(x, y)| [x, y]).collect();
            json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [coords] }
            })
        })
        .collect();
    write_collection(path, features)
}

fn write_collection(path: &Path, features: Vec<serde_json::Value>) -> io::Result<()> {
    let doc = json!({ "type": "FeatureCollection", "features": features });
    std::fs::write(path, serde_json::to_vec_pretty(&doc)?)
}

/// Write a file that has the right name but is not a valid raster.
pub fn write_corrupt_file(path: &Path) -> io::Result<()> {
    std::fs::write(path, b"this is not a raster file")
}

/// Write one GeoTIFF per day named `{prefix}_{YYYYMMDD}.tif`, each a
/// distinct constant field so frames can be told apart.
pub fn write_daily_geotiffs(
    dir: &Path,
    prefix: &str,
    first: NaiveDate,
    days: usize,
    width: usize,
    height: usize,
    bounds: (f64, f64, f64, f64),
) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(days);
    let mut date = first;
    for day in 0..days {
        let path = dir.join(format!("{}_{}.tif", prefix, date.format("%Y%m%d")));
        let data = vec![(day as f32 + 1.0) * 2.0; width * height];
        write_geotiff(&path, width, height, &data, bounds, None)?;
        paths.push(path);
        date = date
            .succ_opt()
            .ok_or_else(|| io::Error::other("date overflow"))?;
    }
    Ok(paths)
}
