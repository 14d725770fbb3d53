//! Canvas2D surface.
//!
//! Implements `Surface` over the browser's `CanvasRenderingContext2d`, so the
//! dashboard draws frames with the same `render_frame` the native backend
//! uses. Canvas state calls map one-to-one onto `save`/`restore`.

use kurbo::{Affine, Point, Rect};
use tc_core::{BlendMode, Color, Shadow, TextAlign};
use tc_render::{StrokeStyle, Surface, TextRun};
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

pub struct Canvas2dSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl<'a> Canvas2dSurface<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    fn apply_stroke(&self, stroke: &StrokeStyle) {
        self.ctx.set_stroke_style_str(&stroke.color.to_hex());
        self.ctx.set_line_width(stroke.width);
        let dash = match stroke.dash {
            Some([on, off]) => js_sys::Array::of2(&JsValue::from_f64(on), &JsValue::from_f64(off)),
            None => js_sys::Array::new(),
        };
        let _ = self.ctx.set_line_dash(&dash);
    }

    fn ellipse_path(&self, rect: Rect) {
        let c = rect.center();
        self.ctx.begin_path();
        let _ = self.ctx.ellipse(
            c.x,
            c.y,
            rect.width() / 2.0,
            rect.height() / 2.0,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
    }

    fn polygon_path(&self, points: &[Point]) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.close_path();
        true
    }
}

impl Surface for Canvas2dSurface<'_> {
    type Image = HtmlImageElement;

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn transform(&mut self, affine: Affine) {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        let _ = self.ctx.transform(a, b, c, d, e, f);
    }

    fn multiply_alpha(&mut self, alpha: f64) {
        let current = self.ctx.global_alpha();
        self.ctx.set_global_alpha(current * alpha.clamp(0.0, 1.0));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        if let Err(err) = self.ctx.set_global_composite_operation(composite_op(mode)) {
            log::warn!("composite op {mode:?} rejected: {err:?}");
        }
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        match shadow {
            Some(s) => {
                self.ctx.set_shadow_blur(s.blur);
                self.ctx.set_shadow_offset_x(s.offset_x);
                self.ctx.set_shadow_offset_y(s.offset_y);
                self.ctx.set_shadow_color(&s.color.to_hex());
            }
            None => {
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
                self.ctx.set_shadow_color("transparent");
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, radius: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.to_hex());
        if radius <= 0.0 {
            self.ctx.fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
            return;
        }
        rounded_rect_path(self.ctx, rect, radius);
        self.ctx.fill();
    }

    fn stroke_rect(&mut self, rect: Rect, radius: f64, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        if radius <= 0.0 {
            self.ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
            return;
        }
        rounded_rect_path(self.ctx, rect, radius);
        self.ctx.stroke();
    }

    fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ellipse_path(rect);
        self.ctx.fill();
    }

    fn stroke_ellipse(&mut self, rect: Rect, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ellipse_path(rect);
        self.ctx.stroke();
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.ctx.set_fill_style_str(&color.to_hex());
        if self.polygon_path(points) {
            self.ctx.fill();
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        if self.polygon_path(points) {
            self.ctx.stroke();
        }
    }

    fn line(&mut self, from: Point, to: Point, stroke: &StrokeStyle) {
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, run: &TextRun<'_>, at: Point) {
        self.ctx.set_font(&font_spec(run));
        self.ctx.set_fill_style_str(&run.color.to_hex());
        self.ctx.set_text_align(text_align(run.align));
        self.ctx.set_text_baseline("middle");
        let spacing = JsValue::from_str(&letter_spacing_css(run.letter_spacing));
        if let Err(err) = js_sys::Reflect::set(self.ctx, &JsValue::from_str("letterSpacing"), &spacing)
        {
            log::warn!("letterSpacing rejected: {err:?}");
        }
        let _ = self.ctx.fill_text(run.text, at.x, at.y);
    }

    fn draw_image(&mut self, image: &HtmlImageElement, dest: Rect) {
        if let Err(err) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            dest.x0,
            dest.y0,
            dest.width(),
            dest.height(),
        ) {
            log::warn!("draw_image failed: {err:?}");
        }
    }
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, rect: Rect, r: f64) {
    let (x, y, w, h) = (rect.x0, rect.y0, rect.width(), rect.height());
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}

/// `globalCompositeOperation` value for a blend mode.
pub(crate) fn composite_op(mode: BlendMode) -> &'static str {
    match mode {
        BlendMode::Normal => "source-over",
        BlendMode::Multiply => "multiply",
        BlendMode::Screen => "screen",
        BlendMode::Overlay => "overlay",
        BlendMode::Darken => "darken",
        BlendMode::Lighten => "lighten",
        BlendMode::ColorDodge => "color-dodge",
        BlendMode::ColorBurn => "color-burn",
        BlendMode::HardLight => "hard-light",
        BlendMode::SoftLight => "soft-light",
        BlendMode::Difference => "difference",
        BlendMode::Exclusion => "exclusion",
        BlendMode::Hue => "hue",
        BlendMode::Saturation => "saturation",
        BlendMode::Color => "color",
        BlendMode::Luminosity => "luminosity",
    }
}

/// CSS `font` shorthand for a text run.
pub(crate) fn font_spec(run: &TextRun<'_>) -> String {
    format!(
        "{} {}px {}",
        run.font_weight, run.font_size, run.font_family
    )
}

/// CSS length for the context's `letterSpacing` property.
pub(crate) fn letter_spacing_css(px: f64) -> String {
    format!("{px}px")
}

fn text_align(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "left",
        TextAlign::Center => "center",
        TextAlign::Right => "right",
    }
}
