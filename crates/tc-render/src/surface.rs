//! The drawing target abstraction.
//!
//! `render_frame` only speaks this trait, so the same frame logic drives the
//! Vello scene, the browser's Canvas2D context, and the recording surface
//! used in tests. Coordinates are canvas pixels; each backend owns the
//! mapping to device pixels.

use kurbo::{Affine, Point, Rect};
use tc_core::{BlendMode, Color, Shadow, TextAlign};

/// Stroke parameters. `dash` is `[on, off]` in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub dash: Option<[f64; 2]>,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: None,
        }
    }

    pub fn dashed(color: Color, width: f64, on: f64, off: f64) -> Self {
        Self {
            color,
            width,
            dash: Some([on, off]),
        }
    }
}

/// A single line of placeholder text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub font_family: &'a str,
    pub font_size: f64,
    pub font_weight: u16,
    pub color: Color,
    /// Horizontal anchoring of `at`; text is always vertically centered on it.
    pub align: TextAlign,
    /// Extra advance after each glyph, in canvas pixels.
    pub letter_spacing: f64,
}

/// A 2D drawing target.
///
/// State calls (`transform`, `multiply_alpha`, `set_blend_mode`, `set_shadow`)
/// stay in effect until the matching `restore`.
pub trait Surface {
    /// Decoded raster image the backend can draw.
    type Image;

    fn save(&mut self);
    fn restore(&mut self);

    /// Post-multiply the current transform.
    fn transform(&mut self, affine: Affine);
    /// Scale the current global alpha by `alpha`.
    fn multiply_alpha(&mut self, alpha: f64);
    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_shadow(&mut self, shadow: Option<&Shadow>);

    fn fill_rect(&mut self, rect: Rect, radius: f64, color: Color);
    fn stroke_rect(&mut self, rect: Rect, radius: f64, stroke: &StrokeStyle);
    fn fill_ellipse(&mut self, rect: Rect, color: Color);
    fn stroke_ellipse(&mut self, rect: Rect, stroke: &StrokeStyle);
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle);
    fn line(&mut self, from: Point, to: Point, stroke: &StrokeStyle);
    fn fill_text(&mut self, run: &TextRun<'_>, at: Point);
    /// Draw `image` stretched to `dest`.
    fn draw_image(&mut self, image: &Self::Image, dest: Rect);
}
