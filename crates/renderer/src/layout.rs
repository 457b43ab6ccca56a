//! Placement of the map, colorbar and title on the frame canvas.
//!
//! Distances are expressed in typographic points and scaled by `dpi / 72`,
//! so a frame keeps its proportions at any resolution.

use anim_common::{AnimError, AnimResult, BoundingBox};
use projection::{Equirectangular, PixelRect};

/// Points per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Tick label and axis label size.
pub const LABEL_PT: f64 = 10.0;
/// Title size.
pub const TITLE_PT: f64 = 12.0;
/// Line spacing as a multiple of the font size.
pub const LINE_SPACING: f64 = 1.25;

const MARGIN_PT: f64 = 10.0;
const LEFT_LABELS_PT: f64 = 34.0;
const BOTTOM_LABELS_PT: f64 = 20.0;
const TITLE_PAD_PT: f64 = 20.0;
const COLORBAR_GAP_PT: f64 = 14.0;
const COLORBAR_WIDTH_PT: f64 = 12.0;
const COLORBAR_LABELS_PT: f64 = 62.0;
/// Fraction of the bar length taken by each extension triangle.
const EXTEND_FRACTION: f64 = 0.05;

/// Resolved pixel geometry of one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout {
    pub width: u32,
    pub height: u32,
    /// Pixels per point.
    pub scale: f64,
    /// Map viewport.
    pub projection: Equirectangular,
    /// Gradient part of the colorbar, excluding the extension triangles.
    pub colorbar: PixelRect,
    /// Height of each extension triangle.
    pub extend: f64,
    /// Top of the first title line, when a title is drawn.
    pub title_top: Option<f64>,
}

impl FrameLayout {
    /// Lay out a `size_in` (inches) figure at `dpi` showing `bbox`.
    pub fn compute(size_in: (f64, f64), dpi: f64, bbox: &BoundingBox, with_title: bool) -> AnimResult<Self> {
        let width_px = (size_in.0 * dpi).round();
        let height_px = (size_in.1 * dpi).round();
        if !(width_px >= 1.0 && height_px >= 1.0) {
            return Err(AnimError::render(format!(
                "figure of {}x{} in at {} dpi has no pixels",
                size_in.0, size_in.1, dpi
            )));
        }
        bbox.validate()?;

        let scale = dpi / POINTS_PER_INCH;
        let pt = |v: f64| v * scale;

        let title_block = if with_title {
            2.0 * TITLE_PT * LINE_SPACING + TITLE_PAD_PT
        } else {
            0.0
        };
        let left = pt(MARGIN_PT + LEFT_LABELS_PT);
        let top = pt(MARGIN_PT + title_block);
        let right = pt(COLORBAR_GAP_PT + COLORBAR_WIDTH_PT + COLORBAR_LABELS_PT + MARGIN_PT);
        let bottom = pt(MARGIN_PT + BOTTOM_LABELS_PT);

        let available = PixelRect::new(left, top, width_px - left - right, height_px - top - bottom);
        if available.width < 1.0 || available.height < 1.0 {
            return Err(AnimError::render(format!(
                "figure of {}x{} px is too small for the map layout",
                width_px, height_px
            )));
        }

        let projection = Equirectangular::fitted(*bbox, available);
        let map = projection.area();

        let extend = map.height * EXTEND_FRACTION;
        let colorbar = PixelRect::new(
            map.right() + pt(COLORBAR_GAP_PT),
            map.y + extend,
            pt(COLORBAR_WIDTH_PT),
            map.height - 2.0 * extend,
        );

        let title_top = with_title.then(|| map.y - pt(TITLE_PAD_PT + 2.0 * TITLE_PT * LINE_SPACING));

        Ok(Self {
            width: width_px as u32,
            height: height_px as u32,
            scale,
            projection,
            colorbar,
            extend,
            title_top,
        })
    }

    /// Convert a size in points to pixels.
    pub fn pt(&self, points: f64) -> f64 {
        points * self.scale
    }

    /// Map viewport in pixels.
    pub fn map_area(&self) -> PixelRect {
        self.projection.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn south_asia() -> BoundingBox {
        BoundingBox::new(60.0, 5.0, 100.0, 40.0)
    }

    #[test]
    fn test_canvas_size_is_inches_times_dpi() {
        let layout = FrameLayout::compute((12.0, 8.0), 100.0, &south_asia(), true).unwrap();
        assert_eq!((layout.width, layout.height), (1200, 800));
        assert!((layout.scale - 100.0 / 72.0).abs() < 1e-12);
    }

    #[test]
    fn test_map_keeps_degree_aspect() {
        let layout = FrameLayout::compute((12.0, 8.0), 100.0, &south_asia(), true).unwrap();
        let map = layout.map_area();
        assert!((map.width / map.height - 40.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn test_everything_fits_on_canvas() {
        for with_title in [false, true] {
            let layout = FrameLayout::compute((6.0, 4.0), 72.0, &south_asia(), with_title).unwrap();
            let map = layout.map_area();
            assert!(map.x >= 0.0 && map.y >= 0.0);
            assert!(map.bottom() <= layout.height as f64);
            assert!(layout.colorbar.right() <= layout.width as f64);
            assert!(layout.colorbar.x > map.right());
            if let Some(top) = layout.title_top {
                assert!(top >= 0.0 && top < map.y);
            }
        }
    }

    #[test]
    fn test_colorbar_spans_map_height() {
        let layout = FrameLayout::compute((10.0, 6.0), 100.0, &south_asia(), false).unwrap();
        let map = layout.map_area();
        let total = layout.colorbar.height + 2.0 * layout.extend;
        assert!((total - map.height).abs() < 1e-9);
        assert!(layout.title_top.is_none());
    }

    #[test]
    fn test_zero_sized_figure_is_render_error() {
        let err = FrameLayout::compute((0.0, 8.0), 100.0, &south_asia(), false).unwrap_err();
        assert!(matches!(err, AnimError::Render(_)));
        assert!(FrameLayout::compute((1.0, 1.0), 10.0, &south_asia(), true).is_err());
    }
}
