//! A surface that records draw calls instead of rasterizing them.

use crate::surface::{StrokeStyle, Surface, TextRun};
use kurbo::{Affine, Point, Rect};
use tc_core::{BlendMode, Color, Shadow};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Transform(Affine),
    Alpha(f64),
    Blend(BlendMode),
    FillRect(Rect),
    StrokeRect(Rect),
    FillEllipse(Rect),
    StrokeEllipse(Rect),
    FillPolygon(usize),
    StrokePolygon(usize),
    Line(Point, Point),
    Text(String),
    Image(u32),
}

/// Records every drawing op; state ops (`save`, `restore`, shadow) only
/// track nesting depth.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<Op>,
    pub depth: usize,
}

impl Surface for RecordingSurface {
    type Image = u32;

    fn save(&mut self) {
        self.depth += 1;
    }

    fn restore(&mut self) {
        self.depth -= 1;
    }

    fn transform(&mut self, affine: Affine) {
        self.ops.push(Op::Transform(affine));
    }

    fn multiply_alpha(&mut self, alpha: f64) {
        self.ops.push(Op::Alpha(alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.ops.push(Op::Blend(mode));
    }

    fn set_shadow(&mut self, _shadow: Option<&Shadow>) {}

    fn fill_rect(&mut self, rect: Rect, _radius: f64, _color: Color) {
        self.ops.push(Op::FillRect(rect));
    }

    fn stroke_rect(&mut self, rect: Rect, _radius: f64, _stroke: &StrokeStyle) {
        self.ops.push(Op::StrokeRect(rect));
    }

    fn fill_ellipse(&mut self, rect: Rect, _color: Color) {
        self.ops.push(Op::FillEllipse(rect));
    }

    fn stroke_ellipse(&mut self, rect: Rect, _stroke: &StrokeStyle) {
        self.ops.push(Op::StrokeEllipse(rect));
    }

    fn fill_polygon(&mut self, points: &[Point], _color: Color) {
        self.ops.push(Op::FillPolygon(points.len()));
    }

    fn stroke_polygon(&mut self, points: &[Point], _stroke: &StrokeStyle) {
        self.ops.push(Op::StrokePolygon(points.len()));
    }

    fn line(&mut self, from: Point, to: Point, _stroke: &StrokeStyle) {
        self.ops.push(Op::Line(from, to));
    }

    fn fill_text(&mut self, run: &TextRun<'_>, _at: Point) {
        self.ops.push(Op::Text(run.text.to_string()));
    }

    fn draw_image(&mut self, image: &u32, _dest: Rect) {
        self.ops.push(Op::Image(*image));
    }
}
