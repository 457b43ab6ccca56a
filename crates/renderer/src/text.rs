//! Font loading and text drawing for titles, tick labels and legends.

use std::path::{Path, PathBuf};

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

/// Fonts tried, in order, when no font path is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Horizontal placement of a text run relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A loaded TrueType font.
pub struct FontBook {
    font: Font<'static>,
    source: PathBuf,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook").field("source", &self.source).finish()
    }
}

impl FontBook {
    /// Load the configured font, or the first system font found.
    ///
    /// Returns `None` (with a warning) when nothing can be loaded; frames
    /// are then drawn without text.
    pub fn load(configured: Option<&Path>) -> Option<Self> {
        if let Some(path) = configured {
            match Self::from_file(path) {
                Some(book) => return Some(book),
                None => warn!(path = %path.display(), "Configured font could not be loaded"),
            }
        }

        let found = SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .filter(|p| p.exists())
            .find_map(Self::from_file);
        if found.is_none() {
            warn!("No usable TrueType font found; titles and labels will not be drawn");
        }
        found
    }

    /// Load a font file, `None` if it is missing or not a valid font.
    pub fn from_file(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        let font = Font::try_from_vec(bytes)?;
        debug!(path = %path.display(), "Loaded font");
        Some(Self {
            font,
            source: path.to_path_buf(),
        })
    }

    /// Width and height in pixels of `text` at `size` px.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        let scale = Scale::uniform(size);
        let v = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, v.ascent))
            .filter_map(|g| g.pixel_bounding_box().map(|bb| bb.max.x))
            .max()
            .unwrap_or(0)
            .max(0) as u32;
        let height = (v.ascent - v.descent).ceil().max(0.0) as u32;
        (width, height)
    }

    /// Draw `text` with its top edge at `y` and aligned on `x`.
    pub fn draw(
        &self,
        image: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size: f32,
        align: Align,
        color: Rgba<u8>,
    ) {
        if text.is_empty() {
            return;
        }
        let (w, _) = self.measure(text, size);
        let left = match align {
            Align::Left => x,
            Align::Center => x - w as i32 / 2,
            Align::Right => x - w as i32,
        };
        draw_text_mut(image, color, left, y, Scale::uniform(size), &self.font, text);
    }

    /// Draw `text` rotated 90° counter-clockwise (reading bottom to top),
    /// centred on `(cx, cy)`.
    pub fn draw_vertical(
        &self,
        image: &mut RgbaImage,
        text: &str,
        cx: i32,
        cy: i32,
        size: f32,
        color: Rgba<u8>,
    ) {
        let (w, h) = self.measure(text, size);
        if w == 0 || h == 0 {
            return;
        }
        let mut run = RgbaImage::new(w, h);
        draw_text_mut(&mut run, color, 0, 0, Scale::uniform(size), &self.font, text);
        let rotated = imageops::rotate270(&run);
        let left = cx as i64 - rotated.width() as i64 / 2;
        let top = cy as i64 - rotated.height() as i64 / 2;
        imageops::overlay(image, &rotated, left, top);
    }
}
