//! Stateless per-frame drawing.
//!
//! One call paints the whole canvas from a snapshot of editor state. The
//! layer order is fixed:
//!
//! 1. background image (or a flat fill while loading / on failure)
//! 2. grid and canvas-center crosshair, when enabled
//! 3. visible fields in array order, each under its own rotation
//! 4. the staging ghost, at reduced opacity
//! 5. selection outline, resize handles, and the rotate handle
//! 6. alignment guides

use crate::hit::{Handle, HandleMetrics, field_transform, handle_positions};
use crate::surface::{StrokeStyle, Surface, TextRun};
use kurbo::{Point, Rect};
use tc_core::{
    AlignmentGuide, CanvasSize, Color, Field, FieldId, FieldKind, MediaStyle, Orientation,
    Placeable, ShapeKind, ShapeStyle, TextAlign, TextStyle,
};

/// Theme-dependent colors for editor chrome and placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTheme {
    pub background: Color,
    pub grid: Color,
    pub center_guide: Color,
    pub selection: Color,
    pub handle_fill: Color,
    pub guide: Color,
    pub placeholder_bg: Color,
    pub placeholder_border: Color,
    pub placeholder_text: Color,
    pub effect_tint: Color,
}

impl RenderTheme {
    pub fn light() -> Self {
        Self {
            background: Color::rgba(0.96, 0.96, 0.97, 1.0),
            grid: Color::rgba(0.0, 0.0, 0.0, 0.08),
            center_guide: Color::rgba(0.0, 0.48, 1.0, 0.35),
            selection: Color::rgba(0.0, 0.48, 1.0, 1.0),
            handle_fill: Color::WHITE,
            guide: Color::rgba(1.0, 0.18, 0.33, 1.0),
            placeholder_bg: Color::rgba(0.56, 0.56, 0.58, 0.12),
            placeholder_border: Color::rgba(0.53, 0.53, 0.55, 1.0),
            placeholder_text: Color::rgba(0.53, 0.53, 0.55, 1.0),
            effect_tint: Color::rgba(0.69, 0.32, 0.87, 1.0),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color::rgba(0.11, 0.11, 0.12, 1.0),
            grid: Color::rgba(1.0, 1.0, 1.0, 0.06),
            center_guide: Color::rgba(0.04, 0.52, 1.0, 0.4),
            selection: Color::rgba(0.04, 0.52, 1.0, 1.0),
            handle_fill: Color::rgba(0.11, 0.11, 0.12, 1.0),
            guide: Color::rgba(1.0, 0.22, 0.37, 1.0),
            placeholder_bg: Color::rgba(0.39, 0.39, 0.4, 0.16),
            placeholder_border: Color::rgba(0.39, 0.39, 0.4, 1.0),
            placeholder_text: Color::rgba(0.6, 0.6, 0.62, 1.0),
            effect_tint: Color::rgba(0.75, 0.35, 0.95, 1.0),
        }
    }
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Everything one frame needs. Built fresh by the host each redraw.
pub struct Frame<'a, I> {
    pub canvas: CanvasSize,
    pub fields: &'a [Field],
    pub staging: Option<&'a dyn Placeable>,
    pub selected: Option<FieldId>,
    pub guides: &'a [AlignmentGuide],
    /// `None` while the background is absent, loading, or failed.
    pub background: Option<&'a I>,
    pub show_grid: bool,
    pub grid_size: f64,
    pub show_center_guides: bool,
    pub staging_opacity: f64,
    /// Handle sizes in canvas pixels; see [`HandleMetrics::scaled`].
    pub handles: HandleMetrics,
    pub theme: &'a RenderTheme,
}

/// Paint one frame.
pub fn render_frame<S: Surface>(surface: &mut S, frame: &Frame<'_, S::Image>) {
    let canvas = frame.canvas.rect();
    let theme = frame.theme;

    surface.fill_rect(canvas, 0.0, theme.background);
    if let Some(image) = frame.background {
        surface.draw_image(image, canvas);
    }

    // Chrome lines stay one screen pixel wide whatever the zoom.
    let hairline = frame.handles.size / 10.0;

    if frame.show_grid && frame.grid_size > 0.0 {
        draw_grid(surface, frame.canvas, frame.grid_size, hairline, theme);
    }
    if frame.show_center_guides {
        let c = frame.canvas.center();
        let stroke = StrokeStyle::dashed(theme.center_guide, hairline, 6.0 * hairline, 4.0 * hairline);
        surface.line(Point::new(c.x, 0.0), Point::new(c.x, canvas.y1), &stroke);
        surface.line(Point::new(0.0, c.y), Point::new(canvas.x1, c.y), &stroke);
    }

    for field in frame.fields.iter().filter(|f| f.appearance.visible) {
        draw_placeable(surface, field, &field.label, 1.0, theme);
    }

    if let Some(staging) = frame.staging {
        draw_placeable(
            surface,
            staging,
            staging.field_type().as_str(),
            frame.staging_opacity,
            theme,
        );
    }

    if let Some(id) = frame.selected
        && let Some(field) = frame.fields.iter().find(|f| f.id == id)
    {
        draw_selection(surface, field, frame.handles, hairline, theme);
    }

    let guide_stroke = StrokeStyle::dashed(theme.guide, hairline, 4.0 * hairline, 4.0 * hairline);
    for guide in frame.guides {
        let (from, to) = match guide.orientation {
            Orientation::Vertical => (
                Point::new(guide.position, 0.0),
                Point::new(guide.position, canvas.y1),
            ),
            Orientation::Horizontal => (
                Point::new(0.0, guide.position),
                Point::new(canvas.x1, guide.position),
            ),
        };
        surface.line(from, to, &guide_stroke);
    }
}

// ─── Layers ──────────────────────────────────────────────────────────────

fn draw_grid<S: Surface>(
    surface: &mut S,
    canvas: CanvasSize,
    grid: f64,
    width: f64,
    theme: &RenderTheme,
) {
    let stroke = StrokeStyle::solid(theme.grid, width);
    let mut x = grid;
    while x < canvas.width {
        surface.line(Point::new(x, 0.0), Point::new(x, canvas.height), &stroke);
        x += grid;
    }
    let mut y = grid;
    while y < canvas.height {
        surface.line(Point::new(0.0, y), Point::new(canvas.width, y), &stroke);
        y += grid;
    }
}

/// Draw a field or the staging ghost under its own rotation, opacity,
/// blend mode, and shadow.
fn draw_placeable<S: Surface, P: Placeable + ?Sized>(
    surface: &mut S,
    item: &P,
    label: &str,
    alpha: f64,
    theme: &RenderTheme,
) {
    let g = item.geometry();
    let a = item.appearance();
    let bounds = g.bounds();

    surface.save();
    surface.transform(field_transform(g));
    surface.multiply_alpha(a.opacity * alpha);
    surface.set_blend_mode(a.blend_mode);
    surface.set_shadow(a.shadow.as_ref());

    match item.kind() {
        FieldKind::Text(style) => draw_text_placeholder(surface, bounds, label, style, theme),
        FieldKind::Number(style) => draw_text_placeholder(surface, bounds, label, style, theme),
        FieldKind::Image(media) => {
            draw_media_placeholder(surface, bounds, media, theme);
            draw_image_glyph(surface, bounds, theme);
        }
        FieldKind::Logo(media) => {
            draw_media_placeholder(surface, bounds, media, theme);
            let r = bounds.width().min(bounds.height()) * 0.2;
            let c = bounds.center();
            surface.stroke_ellipse(
                Rect::new(c.x - r, c.y - r, c.x + r, c.y + r),
                &StrokeStyle::solid(theme.placeholder_text, 2.0),
            );
        }
        FieldKind::Video(media) => {
            draw_media_placeholder(surface, bounds, media, theme);
            let r = bounds.width().min(bounds.height()) * 0.15;
            let c = bounds.center();
            surface.fill_polygon(
                &[
                    Point::new(c.x - r * 0.6, c.y - r),
                    Point::new(c.x + r, c.y),
                    Point::new(c.x - r * 0.6, c.y + r),
                ],
                theme.placeholder_text,
            );
        }
        FieldKind::Shape(style) => draw_shape(surface, bounds, style),
        FieldKind::PhotoEffect(effect)
        | FieldKind::Filter(effect)
        | FieldKind::Texture(effect)
        | FieldKind::PaintSplatter(effect) => {
            let tint = effect.tint.unwrap_or(theme.effect_tint);
            let strength = (effect.intensity.clamp(0.0, 1.0) * 0.5) as f32;
            surface.fill_rect(bounds, 0.0, tint.with_alpha_factor(strength));
            surface.stroke_rect(
                bounds,
                0.0,
                &StrokeStyle::dashed(theme.placeholder_border, 1.0, 6.0, 4.0),
            );
            draw_caption(surface, bounds, label, theme);
        }
    }

    surface.restore();
}

fn draw_text_placeholder<S: Surface>(
    surface: &mut S,
    bounds: Rect,
    label: &str,
    style: &TextStyle,
    theme: &RenderTheme,
) {
    surface.fill_rect(bounds, 0.0, theme.placeholder_bg);
    let pad = style.font_size * 0.25;
    let cy = bounds.center().y;
    let at = match style.text_align {
        TextAlign::Left => Point::new(bounds.x0 + pad, cy),
        TextAlign::Center => Point::new(bounds.center().x, cy),
        TextAlign::Right => Point::new(bounds.x1 - pad, cy),
    };
    let text = style.text_transform.apply(label);
    surface.fill_text(
        &TextRun {
            text: &text,
            font_family: &style.font_family,
            font_size: style.font_size,
            font_weight: style.font_weight,
            color: style.font_color,
            align: style.text_align,
            letter_spacing: style.letter_spacing,
        },
        at,
    );
}

fn draw_media_placeholder<S: Surface>(
    surface: &mut S,
    bounds: Rect,
    media: &MediaStyle,
    theme: &RenderTheme,
) {
    surface.fill_rect(bounds, media.corner_radius, theme.placeholder_bg);
    match &media.border {
        Some(border) => surface.stroke_rect(
            bounds,
            media.corner_radius,
            &StrokeStyle::solid(border.color, border.width),
        ),
        None => surface.stroke_rect(
            bounds,
            media.corner_radius,
            &StrokeStyle::dashed(theme.placeholder_border, 1.0, 6.0, 4.0),
        ),
    }
}

/// Mountain and sun, the usual "image goes here" mark.
fn draw_image_glyph<S: Surface>(surface: &mut S, bounds: Rect, theme: &RenderTheme) {
    let s = bounds.width().min(bounds.height()) * 0.3;
    let c = bounds.center();
    surface.fill_polygon(
        &[
            Point::new(c.x - s, c.y + s * 0.6),
            Point::new(c.x - s * 0.2, c.y - s * 0.3),
            Point::new(c.x + s * 0.3, c.y + s * 0.2),
            Point::new(c.x + s * 0.6, c.y - s * 0.1),
            Point::new(c.x + s, c.y + s * 0.6),
        ],
        theme.placeholder_text,
    );
    let r = s * 0.15;
    let sun = Point::new(c.x + s * 0.5, c.y - s * 0.5);
    surface.fill_ellipse(
        Rect::new(sun.x - r, sun.y - r, sun.x + r, sun.y + r),
        theme.placeholder_text,
    );
}

fn draw_shape<S: Surface>(surface: &mut S, bounds: Rect, style: &ShapeStyle) {
    let border = style
        .border
        .as_ref()
        .map(|b| StrokeStyle::solid(b.color, b.width));
    match style.shape {
        ShapeKind::Rectangle => {
            if let Some(fill) = style.fill {
                surface.fill_rect(bounds, style.corner_radius, fill);
            }
            if let Some(stroke) = &border {
                surface.stroke_rect(bounds, style.corner_radius, stroke);
            }
        }
        ShapeKind::Ellipse => {
            if let Some(fill) = style.fill {
                surface.fill_ellipse(bounds, fill);
            }
            if let Some(stroke) = &border {
                surface.stroke_ellipse(bounds, stroke);
            }
        }
        ShapeKind::Triangle => {
            let points = [
                Point::new(bounds.center().x, bounds.y0),
                Point::new(bounds.x1, bounds.y1),
                Point::new(bounds.x0, bounds.y1),
            ];
            if let Some(fill) = style.fill {
                surface.fill_polygon(&points, fill);
            }
            if let Some(stroke) = &border {
                surface.stroke_polygon(&points, stroke);
            }
        }
        ShapeKind::Line => {
            // The box height is the stroke weight.
            let color = style
                .fill
                .or(style.border.as_ref().map(|b| b.color))
                .unwrap_or(Color::WHITE);
            let cy = bounds.center().y;
            surface.line(
                Point::new(bounds.x0, cy),
                Point::new(bounds.x1, cy),
                &StrokeStyle::solid(color, bounds.height().max(1.0)),
            );
        }
    }
}

fn draw_caption<S: Surface>(surface: &mut S, bounds: Rect, label: &str, theme: &RenderTheme) {
    surface.fill_text(
        &TextRun {
            text: label,
            font_family: tc_core::defaults::DEFAULT_FONT_FAMILY,
            font_size: 14.0,
            font_weight: 500,
            color: theme.placeholder_text,
            align: TextAlign::Center,
            letter_spacing: 0.0,
        },
        bounds.center(),
    );
}

fn draw_selection<S: Surface>(
    surface: &mut S,
    field: &Field,
    metrics: HandleMetrics,
    hairline: f64,
    theme: &RenderTheme,
) {
    let g = &field.geometry;
    let outline = StrokeStyle::solid(theme.selection, 2.0 * hairline);

    surface.save();
    surface.transform(field_transform(g));
    surface.stroke_rect(g.bounds(), 0.0, &outline);

    // Locked fields show the outline only.
    if field.locked {
        surface.restore();
        return;
    }

    let half = metrics.size / 2.0;
    for (handle, at) in handle_positions(g, metrics) {
        let rect = Rect::new(at.x - half, at.y - half, at.x + half, at.y + half);
        match handle {
            Handle::Rotate => {
                surface.line(Point::new(at.x, g.y), Point::new(at.x, at.y + half), &outline);
                surface.fill_ellipse(rect, theme.handle_fill);
                surface.stroke_ellipse(rect, &outline);
            }
            Handle::Resize(_) => {
                surface.fill_rect(rect, 0.0, theme.handle_fill);
                surface.stroke_rect(rect, 0.0, &outline);
            }
        }
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Op, RecordingSurface};
    use pretty_assertions::assert_eq;
    use tc_core::{FieldType, Geometry, StagingElement, create_field};

    fn field(id: &str, x: f64, y: f64) -> Field {
        let mut staging = StagingElement::new(FieldType::Shape);
        staging.geometry = Geometry::new(x, y, 100.0, 50.0);
        create_field(&staging, FieldId::intern(id), id, id, 0, 1.0)
    }

    fn frame<'a>(fields: &'a [Field], theme: &'a RenderTheme) -> Frame<'a, u32> {
        Frame {
            canvas: CanvasSize::new(500.0, 400.0),
            fields,
            staging: None,
            selected: None,
            guides: &[],
            background: None,
            show_grid: false,
            grid_size: 10.0,
            show_center_guides: false,
            staging_opacity: 0.5,
            handles: HandleMetrics {
                size: 10.0,
                rotate_offset: 30.0,
            },
            theme,
        }
    }

    #[test]
    fn background_falls_back_to_flat_fill() {
        let theme = RenderTheme::light();
        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &frame(&[], &theme));
        assert_eq!(
            surface.ops.first(),
            Some(&Op::FillRect(CanvasSize::new(500.0, 400.0).rect()))
        );
        assert!(!surface.ops.contains(&Op::Image(7)));

        let mut surface = RecordingSurface::default();
        let image = 7;
        let mut f = frame(&[], &theme);
        f.background = Some(&image);
        render_frame(&mut surface, &f);
        assert_eq!(surface.ops.get(1), Some(&Op::Image(7)));
    }

    #[test]
    fn hidden_fields_are_skipped() {
        let theme = RenderTheme::light();
        let mut fields = vec![field("shown", 0.0, 0.0), field("hidden", 200.0, 0.0)];
        fields[1].appearance.visible = false;
        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &frame(&fields, &theme));
        let fills: Vec<&Op> = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::FillRect(_)))
            .collect();
        // Canvas background plus the one visible shape.
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[1], &Op::FillRect(Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn rotation_is_applied_per_field() {
        let theme = RenderTheme::light();
        let mut fields = vec![field("r", 0.0, 0.0)];
        fields[0].geometry.rotation = 45.0;
        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &frame(&fields, &theme));
        assert!(
            surface
                .ops
                .contains(&Op::Transform(field_transform(&fields[0].geometry)))
        );
        assert_eq!(surface.depth, 0, "save/restore must balance");
    }

    #[test]
    fn staging_is_drawn_translucent_after_fields() {
        let theme = RenderTheme::light();
        let fields = vec![field("f", 0.0, 0.0)];
        let staging = StagingElement::new(FieldType::Image);
        let mut surface = RecordingSurface::default();
        let mut f = frame(&fields, &theme);
        f.staging = Some(&staging);
        render_frame(&mut surface, &f);
        let alphas: Vec<f64> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Alpha(a) => Some(*a),
                _ => None,
            })
            .collect();
        assert_eq!(alphas, vec![1.0, 0.5]);
    }

    #[test]
    fn selection_draws_nine_handles_and_guides_come_last() {
        let theme = RenderTheme::light();
        let fields = vec![field("sel", 100.0, 100.0)];
        let guides = [AlignmentGuide::vertical(100.0)];
        let mut surface = RecordingSurface::default();
        let mut f = frame(&fields, &theme);
        f.selected = Some(fields[0].id);
        f.guides = &guides;
        render_frame(&mut surface, &f);

        let handle_fills = surface
            .ops
            .iter()
            .filter(|op| match op {
                Op::FillRect(r) | Op::FillEllipse(r) => r.width() == 10.0 && r.height() == 10.0,
                _ => false,
            })
            .count();
        assert_eq!(handle_fills, 9);
        assert_eq!(
            surface.ops.last(),
            Some(&Op::Line(Point::new(100.0, 0.0), Point::new(100.0, 400.0)))
        );
    }

    #[test]
    fn locked_selection_draws_outline_without_handles() {
        let theme = RenderTheme::light();
        let mut locked = field("locked", 100.0, 100.0);
        locked.locked = true;
        let fields = vec![locked];
        let mut surface = RecordingSurface::default();
        let mut f = frame(&fields, &theme);
        f.selected = Some(fields[0].id);
        render_frame(&mut surface, &f);

        let handles = surface
            .ops
            .iter()
            .filter(|op| match op {
                Op::FillRect(r) | Op::FillEllipse(r) => r.width() == 10.0 && r.height() == 10.0,
                _ => false,
            })
            .count();
        assert_eq!(handles, 0);
        assert!(!surface.ops.iter().any(|op| matches!(op, Op::Line(..))));
        assert!(surface.ops.contains(&Op::StrokeRect(fields[0].geometry.bounds())));
    }

    #[test]
    fn grid_lines_follow_pitch() {
        let theme = RenderTheme::dark();
        let mut surface = RecordingSurface::default();
        let mut f = frame(&[], &theme);
        f.show_grid = true;
        f.grid_size = 100.0;
        render_frame(&mut surface, &f);
        let lines = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Line(..)))
            .count();
        // 4 vertical (100..400) + 3 horizontal (100..300).
        assert_eq!(lines, 7);
    }
}
