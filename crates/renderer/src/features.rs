//! Map feature layers (coastlines, borders, land, ocean) read from GeoJSON.
//!
//! Layers are loaded once per run from a directory holding
//! `coastline.geojson`, `borders.geojson`, `land.geojson` and
//! `ocean.geojson` (for example Natural Earth exports). A layer whose file
//! is missing or unreadable is left empty and reported with a warning; a
//! frame is never failed over a missing overlay.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A sequence of (lon, lat) vertices.
pub type LineString = Vec<(f64, f64)>;

/// A polygon as an exterior ring followed by any holes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub rings: Vec<LineString>,
}

/// Which overlays to draw on each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapFeatures {
    #[serde(default)]
    pub coastline: bool,
    #[serde(default)]
    pub borders: bool,
    #[serde(default)]
    pub land: bool,
    #[serde(default)]
    pub ocean: bool,
    #[serde(default)]
    pub gridlines: bool,
}

/// Geometry collected from one GeoJSON document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub lines: Vec<LineString>,
    pub polygons: Vec<Polygon>,
}

impl Geometry {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.polygons.is_empty()
    }

    /// Every line plus every polygon ring, for stroked layers.
    pub fn outlines(&self) -> impl Iterator<Item = &LineString> {
        self.lines
            .iter()
            .chain(self.polygons.iter().flat_map(|p| p.rings.iter()))
    }
}

/// Geometry for every overlay, shared by all frames of a run.
#[derive(Debug, Clone, Default)]
pub struct FeatureLayers {
    pub coastline: Geometry,
    pub borders: Geometry,
    pub land: Geometry,
    pub ocean: Geometry,
}

impl FeatureLayers {
    /// Load the enabled layers from `data_dir`.
    ///
    /// With no directory configured, enabled layers are reported and left
    /// empty.
    pub fn load(data_dir: Option<&Path>, wanted: &MapFeatures) -> Self {
        let mut layers = Self::default();
        let requests: [(&str, bool, &mut Geometry); 4] = [
            ("coastline", wanted.coastline, &mut layers.coastline),
            ("borders", wanted.borders, &mut layers.borders),
            ("land", wanted.land, &mut layers.land),
            ("ocean", wanted.ocean, &mut layers.ocean),
        ];

        for (name, enabled, slot) in requests {
            if !enabled {
                continue;
            }
            let Some(dir) = data_dir else {
                warn!(layer = name, "No map feature data directory configured, layer disabled");
                continue;
            };
            let path = dir.join(format!("{}.geojson", name));
            match read_geojson(&path) {
                Ok(geometry) => {
                    debug!(
                        layer = name,
                        path = %path.display(),
                        lines = geometry.lines.len(),
                        polygons = geometry.polygons.len(),
                        "Loaded map feature layer"
                    );
                    *slot = geometry;
                }
                Err(reason) => {
                    warn!(layer = name, path = %path.display(), %reason, "Map feature layer disabled");
                }
            }
        }

        layers
    }
}

/// Read and parse a GeoJSON file.
pub fn read_geojson(path: &Path) -> Result<Geometry, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse_geojson(&text)
}

/// Parse a GeoJSON document (FeatureCollection, Feature or bare geometry).
pub fn parse_geojson(text: &str) -> Result<Geometry, String> {
    let doc: GeoJson = serde_json::from_str(text).map_err(|e| format!("invalid GeoJSON: {}", e))?;
    let mut out = Geometry::default();
    doc.collect_into(&mut out)?;
    Ok(out)
}

/// The GeoJSON object types, keyed by their `type` member.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeoJson {
    FeatureCollection {
        features: Vec<GeoJson>,
    },
    Feature {
        #[serde(default)]
        geometry: Option<Box<GeoJson>>,
    },
    GeometryCollection {
        #[serde(default)]
        geometries: Vec<GeoJson>,
    },
    // Points carry nothing drawable for these layers.
    Point {},
    MultiPoint {},
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
}

impl GeoJson {
    fn collect_into(self, out: &mut Geometry) -> Result<(), String> {
        match self {
            GeoJson::FeatureCollection { features: children }
            | GeoJson::GeometryCollection { geometries: children } => {
                for child in children {
                    child.collect_into(out)?;
                }
            }
            GeoJson::Feature { geometry } => {
                if let Some(geometry) = geometry {
                    geometry.collect_into(out)?;
                }
            }
            GeoJson::Point {} | GeoJson::MultiPoint {} => {}
            GeoJson::LineString { coordinates } => out.lines.push(line(coordinates)?),
            GeoJson::MultiLineString { coordinates } => {
                for part in coordinates {
                    out.lines.push(line(part)?);
                }
            }
            GeoJson::Polygon { coordinates } => out.polygons.push(polygon(coordinates)?),
            GeoJson::MultiPolygon { coordinates } => {
                for part in coordinates {
                    out.polygons.push(polygon(part)?);
                }
            }
        }
        Ok(())
    }
}

fn position(pair: Vec<f64>) -> Result<(f64, f64), String> {
    match pair[..] {
        [lon, lat, ..] => Ok((lon, lat)),
        _ => Err("position must hold two numbers".to_string()),
    }
}

fn line(positions: Vec<Vec<f64>>) -> Result<LineString, String> {
    positions.into_iter().map(position).collect()
}

fn polygon(rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon, String> {
    let rings = rings.into_iter().map(line).collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { rings })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feature_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1.5]]}},
                {"type": "Feature", "properties": {},
                 "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                    [[[5, 5], [6, 5], [6, 6], [5, 5]], [[5.2, 5.2], [5.4, 5.2], [5.4, 5.4], [5.2, 5.2]]]
                 ]}},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let geometry = parse_geojson(text).unwrap();
        assert_eq!(geometry.lines, vec![vec![(0.0, 0.0), (1.0, 1.5)]]);
        assert_eq!(geometry.polygons.len(), 2);
        assert_eq!(geometry.polygons[1].rings.len(), 2);
        assert_eq!(geometry.outlines().count(), 4);
    }

    #[test]
    fn test_bare_geometry() {
        let geometry =
            parse_geojson(r#"{"type": "MultiLineString", "coordinates": [[[0,0],[1,1]], [[2,2],[3,3]]]}"#)
                .unwrap();
        assert_eq!(geometry.lines.len(), 2);
    }

    #[test]
    fn test_malformed_documents() {
        assert!(parse_geojson("not json").is_err());
        assert!(parse_geojson(r#"{"features": []}"#).is_err());
        assert!(parse_geojson(r#"{"type": "LineString", "coordinates": [[0]]}"#).is_err());
        assert!(parse_geojson(r#"{"type": "Hexagon", "coordinates": []}"#).is_err());
        assert!(parse_geojson(r#"{"type": "Polygon", "coordinates": [[0, 1]]}"#).is_err());
    }

    #[test]
    fn test_points_are_ignored() {
        let geometry = parse_geojson(r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();
        assert!(geometry.is_empty());
        let geometry = parse_geojson(
            r#"{"type": "GeometryCollection", "geometries": [
                {"type": "MultiPoint", "coordinates": [[1, 2], [3, 4]]},
                {"type": "LineString", "coordinates": [[1, 2, 100.0], [3, 4, 120.0]]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(geometry.lines, vec![vec![(1.0, 2.0), (3.0, 4.0)]]);
    }

    #[test]
    fn test_load_skips_disabled_and_missing_layers() {
        let dir = std::env::temp_dir().join("renderer-features-missing-dir-does-not-exist");
        let wanted = MapFeatures {
            coastline: true,
            ..Default::default()
        };
        let layers = FeatureLayers::load(Some(&dir), &wanted);
        assert!(layers.coastline.is_empty());
        assert!(layers.borders.is_empty());

        let layers = FeatureLayers::load(None, &wanted);
        assert!(layers.coastline.is_empty());
    }
}
