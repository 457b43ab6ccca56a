//! Frame rendering: one map image per grid.
//!
//! Geometry (mesh, colorbar, overlays) is drawn with tiny-skia; the pixmap is
//! then handed to `image` where text is drawn with rusttype.

use std::fmt::Write as _;

use anim_common::grid::nearest_axis_index_within;
use anim_common::{AnimError, AnimResult, BoundingBox, Grid};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use image::{Rgba, RgbaImage};
use projection::Equirectangular;
use tiny_skia::{FillRule, Mask, Paint, PathBuilder, Pixmap, Rect, Stroke, StrokeDash, Transform};
use tracing::debug;

use crate::colormap::{Color, Colormap};
use crate::features::{FeatureLayers, Geometry, LineString, MapFeatures};
use crate::graticule::Graticule;
use crate::layout::{FrameLayout, LABEL_PT, LINE_SPACING, TITLE_PT};
use crate::legend::{self, Tick};
use crate::normalize::Normalization;
use crate::text::{Align, FontBook};

const LAND: Color = Color { r: 240, g: 240, b: 220, a: 255 };
const OCEAN: Color = Color { r: 152, g: 183, b: 226, a: 255 };
const FEATURE_ALPHA: f32 = 0.1;
const TEXT: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fixed visual parameters of every frame in a run.
#[derive(Debug, Clone)]
pub struct FrameStyle {
    /// Figure size in inches (width, height).
    pub size_in: (f64, f64),
    pub dpi: f64,
    pub colormap: Colormap,
    pub colorbar_label: String,
}

/// Two-line frame title: static text over the formatted frame date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSpec {
    pub enabled: bool,
    pub text: String,
    pub date_format: String,
}

impl TitleSpec {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            text: String::new(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    /// Reject date formats chrono cannot render.
    pub fn validate(&self) -> AnimResult<()> {
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(AnimError::config(format!(
                "title.date_format '{}' is not a valid strftime format",
                self.date_format
            )));
        }
        Ok(())
    }

    /// Title lines for `date`, `None` when the title is off.
    pub fn lines(&self, date: NaiveDate) -> AnimResult<Option<[String; 2]>> {
        if !self.enabled {
            return Ok(None);
        }
        let mut formatted = String::new();
        write!(formatted, "{}", date.format(&self.date_format)).map_err(|_| {
            AnimError::render(format!("cannot format date with '{}'", self.date_format))
        })?;
        Ok(Some([self.text.clone(), formatted]))
    }
}

/// A rendered frame that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct FrameImage {
    image: RgbaImage,
    date: NaiveDate,
}

impl FrameImage {
    pub fn new(image: RgbaImage, date: NaiveDate) -> Self {
        Self { image, date }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

/// Draws map frames with a fixed style.
pub struct FrameRenderer {
    style: FrameStyle,
    layers: FeatureLayers,
    font: Option<FontBook>,
}

impl FrameRenderer {
    pub fn new(style: FrameStyle, layers: FeatureLayers, font: Option<FontBook>) -> Self {
        Self { style, layers, font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render `grid` over `region` for `date`.
    pub fn render(
        &self,
        grid: &Grid,
        region: &BoundingBox,
        norm: &Normalization,
        features: &MapFeatures,
        title: &TitleSpec,
        date: NaiveDate,
    ) -> AnimResult<FrameImage> {
        let title_lines = title.lines(date)?;
        let layout = FrameLayout::compute(self.style.size_in, self.style.dpi, region, title_lines.is_some())?;

        let mut pixmap = Pixmap::new(layout.width, layout.height).ok_or_else(|| {
            AnimError::render(format!("cannot allocate {}x{} canvas", layout.width, layout.height))
        })?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let painted = paint_mesh(&mut pixmap, grid, &layout.projection, norm, &self.style.colormap);

        let ticks = legend::colorbar_ticks(norm);
        legend::draw_colorbar(&mut pixmap, &layout.colorbar, layout.extend, &self.style.colormap, layout.scale);
        legend::draw_ticks(&mut pixmap, &layout.colorbar, &ticks, layout.scale);

        let clip = map_clip(&layout)?;
        if features.land {
            fill_layer(&mut pixmap, &layout.projection, &self.layers.land, LAND, &clip);
        }
        if features.ocean {
            fill_layer(&mut pixmap, &layout.projection, &self.layers.ocean, OCEAN, &clip);
        }
        if features.coastline {
            let stroke = Stroke {
                width: layout.pt(1.0) as f32,
                ..Stroke::default()
            };
            stroke_layer(&mut pixmap, &layout.projection, &self.layers.coastline, &stroke, &clip);
        }
        if features.borders {
            let width = layout.pt(0.5) as f32;
            let stroke = Stroke {
                width,
                dash: StrokeDash::new(vec![width, 1.65 * width], 0.0),
                ..Stroke::default()
            };
            stroke_layer(&mut pixmap, &layout.projection, &self.layers.borders, &stroke, &clip);
        }
        let graticule = features.gridlines.then(|| Graticule::for_extent(region));
        if let Some(graticule) = &graticule {
            graticule.draw(&mut pixmap, &layout.projection, layout.scale, Some(&clip));
        }
        draw_map_frame(&mut pixmap, &layout);

        let (width, height) = (pixmap.width(), pixmap.height());
        // The canvas is opaque, so premultiplied and straight RGBA agree.
        let mut image = RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| AnimError::render("canvas buffer has the wrong size"))?;

        if let Some(font) = &self.font {
            self.draw_text(&mut image, font, &layout, &ticks, graticule.as_ref(), title_lines.as_ref());
        }

        debug!(
            %date,
            width,
            height,
            painted_pixels = painted,
            "Rendered frame"
        );

        Ok(FrameImage::new(image, date))
    }

    fn draw_text(
        &self,
        image: &mut RgbaImage,
        font: &FontBook,
        layout: &FrameLayout,
        ticks: &[Tick],
        graticule: Option<&Graticule>,
        title: Option<&[String; 2]>,
    ) {
        let label_px = layout.pt(LABEL_PT) as f32;
        let (_, label_h) = font.measure("0", label_px);
        let map = layout.map_area();

        if let Some(graticule) = graticule {
            let x = (map.x - layout.pt(4.0)) as i32;
            for (y, text) in graticule.left_labels(&layout.projection) {
                let top = y as i32 - label_h as i32 / 2;
                font.draw(image, &text, x, top, label_px, Align::Right, TEXT);
            }
            let top = (map.bottom() + layout.pt(4.0)) as i32;
            for (x, text) in graticule.bottom_labels(&layout.projection) {
                font.draw(image, &text, x as i32, top, label_px, Align::Center, TEXT);
            }
        }

        let bar = &layout.colorbar;
        let label_x = (bar.right() + layout.pt(6.0)) as i32;
        let mut widest = 0;
        for tick in ticks {
            let y = legend::tick_y(bar, tick) as i32 - label_h as i32 / 2;
            font.draw(image, &tick.label, label_x, y, label_px, Align::Left, TEXT);
            widest = widest.max(font.measure(&tick.label, label_px).0);
        }
        if !self.style.colorbar_label.is_empty() {
            let cx = label_x + widest as i32 + layout.pt(4.0) as i32 + label_h as i32 / 2;
            let cy = (bar.y + bar.height / 2.0) as i32;
            font.draw_vertical(image, &self.style.colorbar_label, cx, cy, label_px, TEXT);
        }

        if let (Some(lines), Some(top)) = (title, layout.title_top) {
            let title_px = layout.pt(TITLE_PT) as f32;
            let line_h = layout.pt(TITLE_PT * LINE_SPACING);
            let cx = (map.x + map.width / 2.0) as i32;
            for (n, line) in lines.iter().enumerate() {
                let y = (top + n as f64 * line_h) as i32;
                font.draw(image, line, cx, y, title_px, Align::Center, TEXT);
            }
        }
    }
}

/// Color every map pixel from its nearest grid cell; returns the number of
/// pixels painted. NaN cells and pixels outside the grid keep the background.
fn paint_mesh(
    pixmap: &mut Pixmap,
    grid: &Grid,
    proj: &Equirectangular,
    norm: &Normalization,
    cmap: &Colormap,
) -> usize {
    let area = proj.area();
    let (width, height) = (pixmap.width() as usize, pixmap.height() as usize);
    let x0 = area.x.floor().max(0.0) as usize;
    let x1 = (area.right().ceil() as usize).min(width);
    let y0 = area.y.floor().max(0.0) as usize;
    let y1 = (area.bottom().ceil() as usize).min(height);

    // A one-sample axis still covers at least one pixel.
    let lon_px = proj.bbox().width() / area.width;
    let lat_px = proj.bbox().height() / area.height;

    // Plate carrée is separable: each column has one longitude and each row
    // one latitude.
    let columns: Vec<Option<usize>> = (x0..x1)
        .map(|px| {
            let cx = px as f64 + 0.5;
            if cx < area.x || cx > area.right() {
                return None;
            }
            nearest_axis_index_within(grid.lons(), proj.pixel_to_geo(cx, area.y).0, lon_px)
        })
        .collect();

    let data = pixmap.data_mut();
    let mut painted = 0;
    for py in y0..y1 {
        let cy = py as f64 + 0.5;
        if cy < area.y || cy > area.bottom() {
            continue;
        }
        let Some(j) = nearest_axis_index_within(grid.lats(), proj.pixel_to_geo(area.x, cy).1, lat_px) else {
            continue;
        };
        for (offset, column) in columns.iter().enumerate() {
            let Some(i) = *column else { continue };
            let Some(value) = grid.at(i, j) else { continue };
            let Some(color) = cmap.map(norm.normalize(value as f64) as f32) else {
                continue;
            };
            let idx = (py * width + x0 + offset) * 4;
            data[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
            painted += 1;
        }
    }
    painted
}

/// Mask limiting overlays to the map viewport.
fn map_clip(layout: &FrameLayout) -> AnimResult<Mask> {
    let area = layout.map_area();
    let mut mask = Mask::new(layout.width, layout.height)
        .ok_or_else(|| AnimError::render("cannot allocate clip mask"))?;
    let rect = Rect::from_xywh(area.x as f32, area.y as f32, area.width as f32, area.height as f32)
        .ok_or_else(|| AnimError::render("map viewport is empty"))?;
    mask.fill_path(&PathBuilder::from_rect(rect), FillRule::Winding, false, Transform::identity());
    Ok(mask)
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Whether a vertex list's extent touches the map extent.
fn touches(ring: &LineString, bbox: &BoundingBox) -> bool {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in ring {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    min_x <= bbox.max_x && max_x >= bbox.min_x && min_y <= bbox.max_y && max_y >= bbox.min_y
}

fn append_ring(pb: &mut PathBuilder, proj: &Equirectangular, ring: &LineString, close: bool) {
    let mut points = ring.iter().map(|&(lon, lat)| proj.geo_to_pixel(lon, lat));
    let Some((x, y)) = points.next() else { return };
    pb.move_to(x as f32, y as f32);
    for (x, y) in points {
        pb.line_to(x as f32, y as f32);
    }
    if close {
        pb.close();
    }
}

fn stroke_layer(
    pixmap: &mut Pixmap,
    proj: &Equirectangular,
    geometry: &Geometry,
    stroke: &Stroke,
    clip: &Mask,
) {
    let mut pb = PathBuilder::new();
    for line in geometry.outlines().filter(|l| l.len() >= 2 && touches(l, proj.bbox())) {
        append_ring(&mut pb, proj, line, false);
    }
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint(Color::black()), stroke, Transform::identity(), Some(clip));
    }
}

fn fill_layer(pixmap: &mut Pixmap, proj: &Equirectangular, geometry: &Geometry, color: Color, clip: &Mask) {
    let fill = paint(color.with_opacity(FEATURE_ALPHA));
    for polygon in &geometry.polygons {
        let Some(exterior) = polygon.rings.first() else { continue };
        if exterior.len() < 3 || !touches(exterior, proj.bbox()) {
            continue;
        }
        let mut pb = PathBuilder::new();
        for ring in &polygon.rings {
            append_ring(&mut pb, proj, ring, true);
        }
        if let Some(path) = pb.finish() {
            // Each polygon is filled on its own so overlaps do not darken.
            pixmap.fill_path(&path, &fill, FillRule::EvenOdd, Transform::identity(), Some(clip));
        }
    }
}

/// Thin black border around the map.
fn draw_map_frame(pixmap: &mut Pixmap, layout: &FrameLayout) {
    let area = layout.map_area();
    let Some(rect) = Rect::from_xywh(area.x as f32, area.y as f32, area.width as f32, area.height as f32) else {
        return;
    };
    let stroke = Stroke {
        width: layout.pt(0.8) as f32,
        ..Stroke::default()
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(&path, &paint(Color::black()), &stroke, Transform::identity(), None);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_lines() {
        let title = TitleSpec {
            enabled: true,
            text: "IMERG Daily Precipitation".to_string(),
            date_format: "%B %d, %Y".to_string(),
        };
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let lines = title.lines(date).unwrap().unwrap();
        assert_eq!(lines[0], "IMERG Daily Precipitation");
        assert_eq!(lines[1], "January 02, 2020");
        assert!(TitleSpec::disabled().lines(date).unwrap().is_none());
    }

    #[test]
    fn test_title_format_validation() {
        let mut title = TitleSpec::disabled();
        assert!(title.validate().is_ok());
        title.date_format = "%Y-%Q".to_string();
        assert!(matches!(title.validate(), Err(AnimError::Config(_))));
    }

    #[test]
    fn test_touches() {
        let bbox = BoundingBox::new(60.0, 5.0, 100.0, 40.0);
        assert!(touches(&vec![(50.0, 10.0), (70.0, 10.0)], &bbox));
        assert!(!touches(&vec![(-10.0, 50.0), (0.0, 60.0)], &bbox));
    }
}
