//! Colorbar legend: gradient, extension triangles and ticks.

use projection::PixelRect;
use tiny_skia::{Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::colormap::{Color, Colormap};
use crate::normalize::{NormKind, Normalization};

/// Default colorbar axis label.
pub const DEFAULT_LABEL: &str = "Precipitation (mm/day)";

const MAX_LINEAR_TICKS: f64 = 8.0;
const NICE_MULTIPLES: &[f64] = &[1.0, 2.0, 2.5, 5.0, 10.0];

/// A labelled position on the colorbar.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    /// Normalized position, 0 at the bottom of the bar and 1 at the top.
    pub position: f64,
    pub label: String,
}

/// Spacing giving at most eight ticks over `span`, from 1, 2, 2.5, 5 × 10^k.
pub fn nice_step(span: f64) -> f64 {
    if !(span.is_finite() && span > 0.0) {
        return 1.0;
    }
    let raw = span / MAX_LINEAR_TICKS;
    let magnitude = 10f64.powi(raw.log10().floor() as i32);
    NICE_MULTIPLES
        .iter()
        .map(|m| m * magnitude)
        .find(|step| span / step <= MAX_LINEAR_TICKS)
        .unwrap_or(10.0 * magnitude)
}

/// Format a tick value with just enough decimals to tell ticks `step` apart.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = (0..6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d);
            (scaled - scaled.round()).abs() < 1e-6
        })
        .unwrap_or(6) as usize;
    let text = format!("{:.*}", decimals, value);
    // Avoid "-0"
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

fn format_decade(value: f64) -> String {
    let exp = value.log10().round() as i32;
    if exp >= 0 {
        format!("{}", 10f64.powi(exp))
    } else {
        format!("{:.*}", (-exp) as usize, value)
    }
}

/// Tick marks for the colorbar of `norm`.
///
/// Linear scales get evenly spaced round values; log scales get the powers
/// of ten inside the range, or both ends when no decade falls inside.
pub fn colorbar_ticks(norm: &Normalization) -> Vec<Tick> {
    let mut ticks = Vec::new();
    match norm.kind {
        NormKind::Linear => {
            let step = nice_step(norm.vmax - norm.vmin);
            let first = (norm.vmin / step - 1e-9).ceil() as i64;
            let last = (norm.vmax / step + 1e-9).floor() as i64;
            for k in first..=last {
                let value = k as f64 * step;
                ticks.push(Tick {
                    value,
                    position: norm.normalize(value).clamp(0.0, 1.0),
                    label: format_tick(value, step),
                });
            }
        }
        NormKind::Log => {
            if norm.vmin > 0.0 {
                let first = (norm.vmin.log10() - 1e-9).ceil() as i32;
                let last = (norm.vmax.log10() + 1e-9).floor() as i32;
                for exp in first..=last {
                    let value = 10f64.powi(exp);
                    ticks.push(Tick {
                        value,
                        position: norm.normalize(value).clamp(0.0, 1.0),
                        label: format_decade(value),
                    });
                }
                if ticks.is_empty() {
                    for (value, position) in [(norm.vmin, 0.0), (norm.vmax, 1.0)] {
                        ticks.push(Tick {
                            value,
                            position,
                            label: format!("{}", (value * 100.0).round() / 100.0),
                        });
                    }
                }
            }
        }
    }
    ticks
}

/// Paint the colorbar into `bar`, with extension triangles of height
/// `extend` above (over color) and below (under color).
pub fn draw_colorbar(pixmap: &mut Pixmap, bar: &PixelRect, extend: f64, cmap: &Colormap, scale: f64) {
    let rows = bar.height.round().max(1.0) as i64;
    for row in 0..rows {
        // Row 0 is the top of the bar, i.e. the high end of the scale.
        let t = 1.0 - (row as f64 + 0.5) / rows as f64;
        let Some(color) = cmap.map(t as f32) else { continue };
        let y = bar.y + row as f64 * bar.height / rows as f64;
        let h = bar.height / rows as f64;
        if let Some(rect) = Rect::from_xywh(bar.x as f32, y as f32, bar.width as f32, (h + 0.5) as f32) {
            pixmap.fill_rect(rect, &solid(color), Transform::identity(), None);
        }
    }

    let (left, right, mid) = (bar.x as f32, bar.right() as f32, (bar.x + bar.width / 2.0) as f32);
    let (top, bottom) = (bar.y as f32, bar.bottom() as f32);
    let ext = extend as f32;

    let mut over = PathBuilder::new();
    over.move_to(left, top);
    over.line_to(mid, top - ext);
    over.line_to(right, top);
    over.close();
    let mut under = PathBuilder::new();
    under.move_to(left, bottom);
    under.line_to(mid, bottom + ext);
    under.line_to(right, bottom);
    under.close();
    for (pb, color) in [(over, cmap.over()), (under, cmap.under())] {
        if let Some(path) = pb.finish() {
            pixmap.fill_path(
                &path,
                &solid(color),
                tiny_skia::FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    // Outline around bar and both triangles.
    let mut outline = PathBuilder::new();
    outline.move_to(left, top);
    outline.line_to(mid, top - ext);
    outline.line_to(right, top);
    outline.line_to(right, bottom);
    outline.line_to(mid, bottom + ext);
    outline.line_to(left, bottom);
    outline.close();
    if let Some(path) = outline.finish() {
        let stroke = Stroke {
            width: (0.8 * scale) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(Color::black()), &stroke, Transform::identity(), None);
    }
}

/// Short tick marks on the right side of the bar.
pub fn draw_ticks(pixmap: &mut Pixmap, bar: &PixelRect, ticks: &[Tick], scale: f64) {
    let mut pb = PathBuilder::new();
    let x = bar.right() as f32;
    let len = (3.5 * scale) as f32;
    for tick in ticks {
        let y = tick_y(bar, tick) as f32;
        pb.move_to(x, y);
        pb.line_to(x + len, y);
    }
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: (0.8 * scale) as f32,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &solid(Color::black()), &stroke, Transform::identity(), None);
    }
}

/// Pixel row of a tick on the bar.
pub fn tick_y(bar: &PixelRect, tick: &Tick) -> f64 {
    bar.bottom() - tick.position * bar.height
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}
