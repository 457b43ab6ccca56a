//! Latitude/longitude gridlines and their labels.

use anim_common::BoundingBox;
use projection::Equirectangular;
use tiny_skia::{Mask, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::colormap::Color;

/// Candidate spacings in degrees, smallest first.
const STEPS: &[f64] = &[
    0.1, 0.2, 0.25, 0.5, 1.0, 2.0, 2.5, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0, 90.0, 180.0,
];
/// Upper bound on gridline intervals across an axis.
const MAX_INTERVALS: f64 = 6.0;

/// Smallest candidate spacing that keeps `span` within the interval budget.
pub fn degree_step(span: f64) -> f64 {
    STEPS
        .iter()
        .copied()
        .find(|step| span / step <= MAX_INTERVALS)
        .unwrap_or(180.0)
}

/// Multiples of `step` within `[min, max]`.
pub fn tick_values(min: f64, max: f64, step: f64) -> Vec<f64> {
    let eps = step * 1e-9;
    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|k| k as f64 * step)
        .filter(|v| *v >= min - eps && *v <= max + eps)
        .collect()
}

fn degrees(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    format!("{}°", rounded)
}

/// Longitude label: `60°E`, `120°W`, `0°`, `180°`.
pub fn format_lon(lon: f64) -> String {
    let wrapped = ((lon + 180.0).rem_euclid(360.0)) - 180.0;
    let lon = if (lon - 180.0).abs() < 1e-9 { 180.0 } else { wrapped };
    if lon.abs() < 1e-9 || (lon.abs() - 180.0).abs() < 1e-9 {
        degrees(lon.abs())
    } else if lon > 0.0 {
        format!("{}E", degrees(lon))
    } else {
        format!("{}W", degrees(-lon))
    }
}

/// Latitude label: `10°N`, `10°S`, `0°`.
pub fn format_lat(lat: f64) -> String {
    if lat.abs() < 1e-9 {
        degrees(0.0)
    } else if lat > 0.0 {
        format!("{}N", degrees(lat))
    } else {
        format!("{}S", degrees(-lat))
    }
}

/// Gridline positions for a map extent.
#[derive(Debug, Clone, PartialEq)]
pub struct Graticule {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
}

impl Graticule {
    pub fn for_extent(bbox: &BoundingBox) -> Self {
        let step = degree_step(bbox.width().max(bbox.height()));
        Self {
            lons: tick_values(bbox.min_x, bbox.max_x, step),
            lats: tick_values(bbox.min_y, bbox.max_y, step),
        }
    }

    /// Dashed half-transparent gray lines across the map.
    pub fn draw(&self, pixmap: &mut Pixmap, proj: &Equirectangular, scale: f64, clip: Option<&Mask>) {
        let bbox = *proj.bbox();
        let color = Color::rgb(128, 128, 128).with_opacity(0.5);

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;

        let width = (0.8 * scale) as f32;
        let stroke = Stroke {
            width,
            dash: StrokeDash::new(vec![3.7 * width, 1.6 * width], 0.0),
            ..Stroke::default()
        };

        let mut pb = PathBuilder::new();
        for &lon in &self.lons {
            let (x0, y0) = proj.geo_to_pixel(lon, bbox.max_y);
            let (x1, y1) = proj.geo_to_pixel(lon, bbox.min_y);
            pb.move_to(x0 as f32, y0 as f32);
            pb.line_to(x1 as f32, y1 as f32);
        }
        for &lat in &self.lats {
            let (x0, y0) = proj.geo_to_pixel(bbox.min_x, lat);
            let (x1, y1) = proj.geo_to_pixel(bbox.max_x, lat);
            pb.move_to(x0 as f32, y0 as f32);
            pb.line_to(x1 as f32, y1 as f32);
        }
        if let Some(path) = pb.finish() {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
        }
    }

    /// Labels along the left edge: `(pixel y, text)`.
    pub fn left_labels(&self, proj: &Equirectangular) -> Vec<(f64, String)> {
        let x = proj.bbox().min_x;
        self.lats
            .iter()
            .map(|&lat| (proj.geo_to_pixel(x, lat).1, format_lat(lat)))
            .collect()
    }

    /// Labels along the bottom edge: `(pixel x, text)`.
    pub fn bottom_labels(&self, proj: &Equirectangular) -> Vec<(f64, String)> {
        let y = proj.bbox().min_y;
        self.lons
            .iter()
            .map(|&lon| (proj.geo_to_pixel(lon, y).0, format_lon(lon)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::PixelRect;

    #[test]
    fn test_degree_step() {
        assert_eq!(degree_step(360.0), 60.0);
        assert_eq!(degree_step(40.0), 10.0);
        assert_eq!(degree_step(12.0), 2.0);
        assert_eq!(degree_step(1.0), 0.2);
    }

    #[test]
    fn test_tick_values() {
        assert_eq!(tick_values(60.0, 100.0, 10.0), vec![60.0, 70.0, 80.0, 90.0, 100.0]);
        assert_eq!(tick_values(5.0, 40.0, 10.0), vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(tick_values(-15.0, 15.0, 10.0), vec![-10.0, 0.0, 10.0]);
    }

    #[test]
    fn test_format_lon() {
        assert_eq!(format_lon(60.0), "60°E");
        assert_eq!(format_lon(-120.0), "120°W");
        assert_eq!(format_lon(0.0), "0°");
        assert_eq!(format_lon(180.0), "180°");
        assert_eq!(format_lon(-180.0), "180°");
        assert_eq!(format_lon(270.0), "90°W");
        assert_eq!(format_lon(2.5), "2.5°E");
    }

    #[test]
    fn test_format_lat() {
        assert_eq!(format_lat(10.0), "10°N");
        assert_eq!(format_lat(-45.0), "45°S");
        assert_eq!(format_lat(0.0), "0°");
    }

    #[test]
    fn test_labels_follow_projection() {
        let bbox = BoundingBox::new(60.0, 5.0, 100.0, 40.0);
        let proj = Equirectangular::new(bbox, PixelRect::new(0.0, 0.0, 400.0, 350.0));
        let grat = Graticule::for_extent(&bbox);

        let left = grat.left_labels(&proj);
        assert_eq!(left.first(), Some(&(300.0, "10°N".to_string())));
        let bottom = grat.bottom_labels(&proj);
        assert_eq!(bottom.len(), 5);
        assert_eq!(bottom[0], (0.0, "60°E".to_string()));
        assert_eq!(bottom[4].0, 400.0);
    }
}
