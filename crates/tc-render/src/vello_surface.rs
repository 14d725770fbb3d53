//! `Surface` over a Vello scene.
//!
//! Opacity and blend modes become layers clipped to the canvas. Text and
//! shadows need a font context and a blur pass the scene does not have yet;
//! both are logged at trace level and skipped.

use crate::surface::{StrokeStyle, Surface, TextRun};
use kurbo::{Affine, BezPath, Ellipse, Line, Point, Rect, Shape, Stroke as KurboStroke};
use peniko::{Color as PenikoColor, Fill, Image, Mix};
use smallvec::SmallVec;
use tc_core::{BlendMode, CanvasSize, Color, Shadow};
use vello::Scene;

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    /// Layers pushed since the matching `save`.
    layers: usize,
}

/// Paints into a borrowed `Scene`. Call `render_frame` once per frame with a
/// freshly-reset scene; the caller presents it via wgpu.
pub struct VelloSurface<'s> {
    scene: &'s mut Scene,
    clip: Rect,
    state: State,
    stack: SmallVec<[State; 8]>,
}

impl<'s> VelloSurface<'s> {
    pub fn new(scene: &'s mut Scene, canvas: CanvasSize) -> Self {
        Self {
            scene,
            clip: canvas.rect(),
            state: State {
                transform: Affine::IDENTITY,
                layers: 0,
            },
            stack: SmallVec::new(),
        }
    }

    fn push_layer(&mut self, mix: Mix, alpha: f32) {
        self.scene
            .push_layer(mix, alpha, Affine::IDENTITY, &self.clip);
        self.state.layers += 1;
    }

    fn fill_shape(&mut self, shape: &impl Shape, color: Color) {
        self.scene
            .fill(Fill::NonZero, self.state.transform, to_peniko(color), None, shape);
    }

    fn stroke_shape(&mut self, shape: &impl Shape, stroke: &StrokeStyle) {
        let mut kurbo_stroke = KurboStroke::new(stroke.width);
        if let Some([on, off]) = stroke.dash {
            kurbo_stroke = kurbo_stroke.with_dashes(0.0, [on, off]);
        }
        self.scene.stroke(
            &kurbo_stroke,
            self.state.transform,
            to_peniko(stroke.color),
            None,
            shape,
        );
    }
}

impl Drop for VelloSurface<'_> {
    fn drop(&mut self) {
        // Unbalanced saves would leave layers open in the scene.
        while !self.stack.is_empty() {
            self.restore();
        }
        for _ in 0..self.state.layers {
            self.scene.pop_layer();
        }
    }
}

impl Surface for VelloSurface<'_> {
    type Image = Image;

    fn save(&mut self) {
        self.stack.push(self.state);
        self.state.layers = 0;
    }

    fn restore(&mut self) {
        for _ in 0..self.state.layers {
            self.scene.pop_layer();
        }
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("VelloSurface::restore without matching save"),
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.state.transform *= affine;
    }

    fn multiply_alpha(&mut self, alpha: f64) {
        if alpha < 1.0 {
            self.push_layer(Mix::Normal, alpha.clamp(0.0, 1.0) as f32);
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        if mode != BlendMode::Normal {
            self.push_layer(to_mix(mode), 1.0);
        }
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        if let Some(shadow) = shadow {
            log::trace!("shadow skipped (blur {})", shadow.blur);
        }
    }

    fn fill_rect(&mut self, rect: Rect, radius: f64, color: Color) {
        if radius > 0.0 {
            self.fill_shape(&rect.to_rounded_rect(radius), color);
        } else {
            self.fill_shape(&rect, color);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, radius: f64, stroke: &StrokeStyle) {
        if radius > 0.0 {
            self.stroke_shape(&rect.to_rounded_rect(radius), stroke);
        } else {
            self.stroke_shape(&rect, stroke);
        }
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        self.fill_shape(&Ellipse::from_rect(rect), color);
    }

    fn stroke_ellipse(&mut self, rect: Rect, stroke: &StrokeStyle) {
        self.stroke_shape(&Ellipse::from_rect(rect), stroke);
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if let Some(path) = polygon(points) {
            self.fill_shape(&path, color);
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle) {
        if let Some(path) = polygon(points) {
            self.stroke_shape(&path, stroke);
        }
    }

    fn line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        self.stroke_shape(&Line::new(from, to), stroke);
    }

    fn fill_text(&mut self, run: &TextRun<'_>, at: Point) {
        log::trace!(
            "TEXT {:?} at ({}, {}) spacing {}",
            run.text,
            at.x,
            at.y,
            run.letter_spacing
        );
    }

    fn draw_image(&mut self, image: &Image, dest: Rect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let fit = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(
                dest.width() / f64::from(image.width),
                dest.height() / f64::from(image.height),
            );
        self.scene.draw_image(image, self.state.transform * fit);
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn polygon(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    let mut path = BezPath::new();
    path.move_to(*first);
    for p in rest {
        path.line_to(*p);
    }
    path.close_path();
    Some(path)
}

fn to_peniko(c: Color) -> PenikoColor {
    let [r, g, b, a] = c.to_rgba8();
    PenikoColor::from_rgba8(r, g, b, a)
}

fn to_mix(mode: BlendMode) -> Mix {
    match mode {
        BlendMode::Normal => Mix::Normal,
        BlendMode::Multiply => Mix::Multiply,
        BlendMode::Screen => Mix::Screen,
        BlendMode::Overlay => Mix::Overlay,
        BlendMode::Darken => Mix::Darken,
        BlendMode::Lighten => Mix::Lighten,
        BlendMode::ColorDodge => Mix::ColorDodge,
        BlendMode::ColorBurn => Mix::ColorBurn,
        BlendMode::HardLight => Mix::HardLight,
        BlendMode::SoftLight => Mix::SoftLight,
        BlendMode::Difference => Mix::Difference,
        BlendMode::Exclusion => Mix::Exclusion,
        BlendMode::Hue => Mix::Hue,
        BlendMode::Saturation => Mix::Saturation,
        BlendMode::Color => Mix::Color,
        BlendMode::Luminosity => Mix::Luminosity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, RenderTheme, render_frame};
    use crate::hit::HandleMetrics;
    use pretty_assertions::assert_eq;
    use tc_core::{Field, FieldId, FieldType, Geometry, StagingElement, create_field};

    #[test]
    fn colors_convert_to_bytes() {
        let c = to_peniko(Color::rgba(1.0, 0.0, 0.0, 0.5));
        assert_eq!(c, PenikoColor::from_rgba8(255, 0, 0, 128));
    }

    #[test]
    fn polygon_needs_points() {
        assert!(polygon(&[]).is_none());
        assert!(polygon(&[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)]).is_some());
    }

    #[test]
    fn renders_a_frame_into_a_scene() {
        let mut staging = StagingElement::new(FieldType::Shape);
        staging.geometry = Geometry::new(10.0, 10.0, 40.0, 40.0);
        staging.appearance.opacity = 0.5;
        staging.appearance.blend_mode = BlendMode::Multiply;
        let fields: Vec<Field> = vec![create_field(
            &staging,
            FieldId::intern("vello"),
            "vello",
            "Vello",
            0,
            1.0,
        )];
        let theme = RenderTheme::light();
        let mut scene = Scene::new();
        let canvas = CanvasSize::new(200.0, 200.0);
        let mut surface = VelloSurface::new(&mut scene, canvas);
        render_frame(
            &mut surface,
            &Frame {
                canvas,
                fields: &fields,
                staging: None,
                selected: Some(fields[0].id),
                guides: &[],
                background: None,
                show_grid: true,
                grid_size: 20.0,
                show_center_guides: true,
                staging_opacity: 0.5,
                handles: HandleMetrics {
                    size: 10.0,
                    rotate_offset: 30.0,
                },
                theme: &theme,
            },
        );
        assert!(surface.stack.is_empty());
        assert_eq!(surface.state.layers, 0);
    }
}
