//! Equirectangular (plate carrée) projection onto a pixel rectangle.
//!
//! Longitude maps linearly to x and latitude linearly to y, with y growing
//! downwards as in image space. A degree of longitude and a degree of
//! latitude cover the same number of pixels, so the plot rectangle is sized
//! to the bounding box's aspect ratio.

use anim_common::BoundingBox;

/// An axis-aligned rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Largest rectangle with the given width/height ratio that fits inside
    /// `self`, centred.
    pub fn fit_aspect(&self, aspect: f64) -> PixelRect {
        if !(aspect.is_finite() && aspect > 0.0) || self.width <= 0.0 || self.height <= 0.0 {
            return *self;
        }
        let (w, h) = if self.width / self.height > aspect {
            (self.height * aspect, self.height)
        } else {
            (self.width, self.width / aspect)
        };
        PixelRect::new(
            self.x + (self.width - w) / 2.0,
            self.y + (self.height - h) / 2.0,
            w,
            h,
        )
    }
}

/// Maps a geographic bounding box onto a pixel rectangle.
#[derive(Debug, Clone, Copy)]
pub struct Equirectangular {
    bbox: BoundingBox,
    area: PixelRect,
    /// Pixels per degree of longitude
    sx: f64,
    /// Pixels per degree of latitude
    sy: f64,
}

impl Equirectangular {
    /// Project `bbox` onto `area` exactly (the caller controls aspect).
    pub fn new(bbox: BoundingBox, area: PixelRect) -> Self {
        let sx = area.width / bbox.width();
        let sy = area.height / bbox.height();
        Self { bbox, area, sx, sy }
    }

    /// Project `bbox` onto the largest equal-scale rectangle inside `available`.
    pub fn fitted(bbox: BoundingBox, available: PixelRect) -> Self {
        let aspect = bbox.width() / bbox.height();
        Self::new(bbox, available.fit_aspect(aspect))
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// Pixel rectangle covered by the map.
    pub fn area(&self) -> PixelRect {
        self.area
    }

    /// Geographic (lon, lat) in degrees to pixel (x, y).
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = self.area.x + (lon - self.bbox.min_x) * self.sx;
        let y = self.area.y + (self.bbox.max_y - lat) * self.sy;
        (x, y)
    }

    /// Pixel (x, y) to geographic (lon, lat) in degrees.
    pub fn pixel_to_geo(&self, x: f64, y: f64) -> (f64, f64) {
        let lon = self.bbox.min_x + (x - self.area.x) / self.sx;
        let lat = self.bbox.max_y - (y - self.area.y) / self.sy;
        (lon, lat)
    }
}
