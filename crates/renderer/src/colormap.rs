//! Named colormaps for mapping normalized values to colors.
//!
//! Each map is a list of evenly spaced anchor colors sampled from the
//! well-known matplotlib/ColorBrewer tables, linearly interpolated between
//! anchors. Values below 0 take the map's "under" color and values above 1
//! its "over" color, matching a colorbar drawn with extensions at both ends.

use anim_common::{AnimError, AnimResult};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Same color with alpha scaled by `opacity` (0..1).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let a = (self.a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Linear interpolation between two colors, `t` clamped to 0..1.
pub fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

const VIRIDIS: &[&str] = &[
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];
const PLASMA: &[&str] = &[
    "#0d0887", "#4c02a1", "#7e03a8", "#a92395", "#cc4778", "#e66c5c", "#f89540", "#fdc527",
    "#f0f921",
];
const INFERNO: &[&str] = &[
    "#000004", "#1f0c48", "#550f6d", "#88226a", "#ba3655", "#e35933", "#f98e09", "#f9cb35",
    "#fcffa4",
];
const MAGMA: &[&str] = &[
    "#000004", "#1c1044", "#4f127b", "#812581", "#b5367a", "#e55964", "#fb8761", "#fec287",
    "#fcfdbf",
];
const CIVIDIS: &[&str] = &[
    "#00224e", "#123570", "#3b496c", "#575d6d", "#707173", "#8a8678", "#a59c74", "#c3b369",
    "#fee838",
];
const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];
const YLGNBU: &[&str] = &[
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
    "#081d58",
];
const GNBU: &[&str] = &[
    "#f7fcf0", "#e0f3db", "#ccebc5", "#a8ddb5", "#7bccc4", "#4eb3d3", "#2b8cbe", "#0868ac",
    "#084081",
];
const JET: &[&str] = &[
    "#00007f", "#0000ff", "#007fff", "#00ffff", "#7fff7f", "#ffff00", "#ff7f00", "#ff0000",
    "#7f0000",
];
const TURBO: &[&str] = &[
    "#30123b", "#4662d7", "#36aaf9", "#1ae4b6", "#72fe5e", "#c8ef34", "#faba39", "#f66b19",
    "#ca2a04", "#7a0403",
];
const COOLWARM: &[&str] = &[
    "#3b4cc0", "#6788ee", "#9abbff", "#c9d7f0", "#edd1c2", "#f7a889", "#e26952", "#b40426",
];
const RDYLBU: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee090", "#ffffbf", "#e0f3f8", "#abd9e9",
    "#74add1", "#4575b4", "#313695",
];
const GREYS: &[&str] = &[
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525",
    "#000000",
];
const GRAY: &[&str] = &["#000000", "#ffffff"];

/// Anchor table for a base colormap name (case-sensitive, as in matplotlib).
fn anchors(name: &str) -> Option<&'static [&'static str]> {
    let table = match name {
        "viridis" => VIRIDIS,
        "plasma" => PLASMA,
        "inferno" => INFERNO,
        "magma" => MAGMA,
        "cividis" => CIVIDIS,
        "Blues" => BLUES,
        "YlGnBu" => YLGNBU,
        "GnBu" => GNBU,
        "jet" => JET,
        "turbo" => TURBO,
        "coolwarm" => COOLWARM,
        "RdYlBu" => RDYLBU,
        "Greys" => GREYS,
        "gray" | "grey" => GRAY,
        _ => return None,
    };
    Some(table)
}

/// A continuous colormap resolved from its name.
#[derive(Debug, Clone)]
pub struct Colormap {
    name: String,
    stops: Vec<Color>,
}

impl Colormap {
    /// Resolve a colormap by name. A `_r` suffix reverses the map.
    pub fn by_name(name: &str) -> AnimResult<Self> {
        let (base, reversed) = match name.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (name, false),
        };
        let table = anchors(base)
            .ok_or_else(|| AnimError::config(format!("unknown colormap '{}'", name)))?;

        let mut stops = table
            .iter()
            .map(|hex| {
                hex_to_rgb(hex)
                    .map(|(r, g, b)| Color::rgb(r, g, b))
                    .ok_or_else(|| AnimError::config(format!("bad color '{}' in colormap '{}'", hex, base)))
            })
            .collect::<AnimResult<Vec<_>>>()?;
        if reversed {
            stops.reverse();
        }

        Ok(Self {
            name: name.to_string(),
            stops,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Color used for values below the normalized range.
    pub fn under(&self) -> Color {
        self.stops[0]
    }

    /// Color used for values above the normalized range.
    pub fn over(&self) -> Color {
        self.stops[self.stops.len() - 1]
    }

    /// Map a normalized value to a color. `NaN` maps to `None` (not drawn).
    pub fn map(&self, t: f32) -> Option<Color> {
        if t.is_nan() {
            return None;
        }
        if t < 0.0 {
            return Some(self.under());
        }
        if t > 1.0 {
            return Some(self.over());
        }

        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let low = (pos.floor() as usize).min(self.stops.len() - 2);
        Some(interpolate_color(
            self.stops[low],
            self.stops[low + 1],
            pos - low as f32,
        ))
    }
}
