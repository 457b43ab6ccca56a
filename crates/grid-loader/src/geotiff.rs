//! GeoTIFF grid loading.
//!
//! Reads band 1 of a single-image TIFF and derives the geographic bounds
//! from the GeoTIFF model tags. Coordinate axes are synthesised as evenly
//! spaced samples between the bounds (both edges included, one sample per
//! pixel row/column).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anim_common::grid::linspace;
use anim_common::{AnimError, AnimResult, AxisOrder, Grid};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;
use tracing::{debug, warn};

/// Geographic bounds of a raster, in the raster's model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterBounds {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    /// True when raster row 0 is the northern edge.
    pub north_up: bool,
}

impl RasterBounds {
    /// Bounds from a tie point `[I, J, K, X, Y, Z]` and pixel scale `[sx, sy, sz]`.
    pub fn from_tiepoint(tiepoint: &[f64], scale: &[f64], width: u32, height: u32) -> Option<Self> {
        if tiepoint.len() < 6 || scale.len() < 2 {
            return None;
        }
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);
        let left = x - i * sx;
        let top = y + j * sy;
        Some(Self {
            left,
            right: left + width as f64 * sx,
            bottom: top - height as f64 * sy,
            top,
            north_up: true,
        })
    }

    /// Bounds from a 4x4 model transformation matrix (row-major).
    ///
    /// Rotation terms are ignored.
    pub fn from_transformation(matrix: &[f64], width: u32, height: u32) -> Option<Self> {
        if matrix.len() < 16 {
            return None;
        }
        let (a, d, f, h) = (matrix[0], matrix[3], matrix[5], matrix[7]);
        let left = d;
        let right = d + a * width as f64;
        let edge = h + f * height as f64;
        let north_up = f < 0.0;
        let (bottom, top) = if north_up { (edge, h) } else { (h, edge) };
        Some(Self {
            left,
            right,
            bottom,
            top,
            north_up,
        })
    }
}

/// Load band 1 of the GeoTIFF at `path`.
///
/// Rows are reordered south-to-north so that value row `j` corresponds to
/// `lats[j]`, with `lats` ascending from the bottom bound to the top bound.
pub fn load_geotiff(path: &Path) -> AnimResult<Grid> {
    let file = File::open(path).map_err(|e| AnimError::data_load(path, e))?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| AnimError::data_load(path, format!("not a TIFF: {}", e)))?
        .with_limits(Limits::unlimited());

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| AnimError::data_load(path, e))?;
    let colortype = decoder
        .colortype()
        .map_err(|e| AnimError::data_load(path, e))?;
    let samples = samples_per_pixel(colortype);

    let bounds = read_bounds(&mut decoder, width, height).ok_or_else(|| {
        AnimError::data_load(path, "no GeoTIFF georeferencing tags (tie point/pixel scale or transformation)")
    })?;

    let nodata = decoder
        .get_tag_ascii_string(Tag::GdalNodata)
        .ok()
        .and_then(|s| s.trim().trim_end_matches('\0').parse::<f64>().ok());

    let image = decoder
        .read_image()
        .map_err(|e| AnimError::data_load(path, format!("failed to read band 1: {}", e)))?;
    let band = first_band(image, samples)
        .ok_or_else(|| AnimError::data_load(path, "unsupported TIFF sample format"))?;

    let (w, h) = (width as usize, height as usize);
    if band.len() < w * h {
        return Err(AnimError::data_load(
            path,
            format!("band 1 has {} samples, expected {}", band.len(), w * h),
        ));
    }

    let mut values = Vec::with_capacity(w * h);
    for j in 0..h {
        let row = if bounds.north_up { h - 1 - j } else { j };
        values.extend(band[row * w..(row + 1) * w].iter().map(|&v| match nodata {
            Some(nd) if (v - nd).abs() < 1e-10 => f32::NAN,
            _ => v as f32,
        }));
    }

    let lons = linspace(bounds.left, bounds.right, w);
    let lats = linspace(bounds.bottom, bounds.top, h);

    debug!(
        path = %path.display(),
        width = w,
        height = h,
        samples_per_pixel = samples,
        bounds = ?bounds,
        nodata = ?nodata,
        "Read GeoTIFF band 1"
    );

    Grid::new_for(path, values, lons, lats, AxisOrder::LatLon)
}

fn read_bounds<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
    width: u32,
    height: u32,
) -> Option<RasterBounds> {
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    if let (Some(tiepoint), Some(scale)) = (tiepoint, scale) {
        return RasterBounds::from_tiepoint(&tiepoint, &scale, width, height);
    }

    let matrix = decoder.get_tag_f64_vec(Tag::ModelTransformationTag).ok()?;
    if matrix.len() >= 16 && (matrix[1] != 0.0 || matrix[4] != 0.0) {
        warn!("GeoTIFF model transformation has rotation terms; they are ignored");
    }
    RasterBounds::from_transformation(&matrix, width, height)
}

fn samples_per_pixel(colortype: ColorType) -> usize {
    match colortype {
        ColorType::Gray(_) | ColorType::Palette(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) | ColorType::CMYK(_) => 4,
        _ => 1,
    }
}

/// Widen the decoded buffer to f64 and keep only the first sample of each pixel.
fn first_band(image: DecodingResult, samples: usize) -> Option<Vec<f64>> {
    fn take<T: Copy + Into<f64>>(buf: Vec<T>, samples: usize) -> Vec<f64> {
        buf.into_iter().step_by(samples.max(1)).map(Into::into).collect()
    }

    let band = match image {
        DecodingResult::U8(buf) => take(buf, samples),
        DecodingResult::U16(buf) => take(buf, samples),
        DecodingResult::U32(buf) => take(buf, samples),
        DecodingResult::I8(buf) => take(buf, samples),
        DecodingResult::I16(buf) => take(buf, samples),
        DecodingResult::I32(buf) => take(buf, samples),
        DecodingResult::F32(buf) => take(buf, samples),
        DecodingResult::F64(buf) => take(buf, samples),
        DecodingResult::U64(buf) => buf.into_iter().step_by(samples.max(1)).map(|v| v as f64).collect(),
        DecodingResult::I64(buf) => buf.into_iter().step_by(samples.max(1)).map(|v| v as f64).collect(),
        #[allow(unreachable_patterns)]
        _ => return None,
    };
    Some(band)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_from_tiepoint() {
        let b = RasterBounds::from_tiepoint(&[0.0, 0.0, 0.0, 60.0, 40.0, 0.0], &[0.5, 0.25, 0.0], 80, 140)
            .unwrap();
        assert_eq!(b.left, 60.0);
        assert_eq!(b.right, 100.0);
        assert_eq!(b.top, 40.0);
        assert_eq!(b.bottom, 5.0);
        assert!(b.north_up);
    }

    #[test]
    fn test_bounds_from_transformation() {
        let mut m = [0.0; 16];
        m[0] = 0.1;
        m[3] = -10.0;
        m[5] = -0.1;
        m[7] = 50.0;
        m[15] = 1.0;
        let b = RasterBounds::from_transformation(&m, 100, 200).unwrap();
        assert!((b.right - 0.0).abs() < 1e-9);
        assert!((b.bottom - 30.0).abs() < 1e-9);
        assert_eq!(b.top, 50.0);
        assert!(b.north_up);
    }

    #[test]
    fn test_first_band_strides_samples() {
        let rgb = DecodingResult::U8(vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(first_band(rgb, 3).unwrap(), vec![1.0, 4.0]);
        let gray = DecodingResult::F32(vec![0.5, 1.5]);
        assert_eq!(first_band(gray, 1).unwrap(), vec![0.5, 1.5]);
    }
}
