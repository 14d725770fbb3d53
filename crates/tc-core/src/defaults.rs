//! Centralized defaults for every field creation path.
//!
//! Placement, duplication, programmatic creation, and JSON loading all go
//! through these values, so a text field created by clicking the canvas looks
//! exactly like one loaded from a template that omitted its styling.

use crate::id::FieldId;
use crate::model::*;

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_FONT_SIZE: f64 = 48.0;
pub const DEFAULT_FONT_WEIGHT: u16 = 700;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            font_color: Color::WHITE,
            font_weight: DEFAULT_FONT_WEIGHT,
            text_align: TextAlign::Center,
            letter_spacing: 0.0,
            line_height: DEFAULT_LINE_HEIGHT,
            text_transform: TextTransform::None,
        }
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Rectangle,
            fill: Some(Color::rgba(1.0, 1.0, 1.0, 0.8)),
            border: None,
            corner_radius: 0.0,
        }
    }
}

impl Default for EffectStyle {
    fn default() -> Self {
        Self {
            intensity: 0.5,
            tint: None,
            asset: None,
        }
    }
}

impl FieldKind {
    /// The default payload for a field type.
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text => FieldKind::Text(TextStyle::default()),
            FieldType::Number => FieldKind::Number(TextStyle::default()),
            FieldType::Image => FieldKind::Image(MediaStyle::default()),
            FieldType::Logo => FieldKind::Logo(MediaStyle {
                object_fit: ObjectFit::Contain,
                ..MediaStyle::default()
            }),
            FieldType::Video => FieldKind::Video(MediaStyle::default()),
            FieldType::Shape => FieldKind::Shape(ShapeStyle::default()),
            FieldType::PhotoEffect => FieldKind::PhotoEffect(EffectStyle::default()),
            FieldType::Filter => FieldKind::Filter(EffectStyle::default()),
            FieldType::Texture => FieldKind::Texture(EffectStyle::default()),
            FieldType::PaintSplatter => FieldKind::PaintSplatter(EffectStyle::default()),
        }
    }
}

/// Default box size `(width, height)` for a freshly placed field.
pub fn default_size(field_type: FieldType) -> (f64, f64) {
    match field_type {
        FieldType::Text => (400.0, 80.0),
        FieldType::Number => (200.0, 80.0),
        FieldType::Image => (300.0, 300.0),
        FieldType::Logo => (150.0, 150.0),
        FieldType::Video => (480.0, 270.0),
        FieldType::Shape => (200.0, 200.0),
        FieldType::PhotoEffect | FieldType::Filter | FieldType::Texture => (400.0, 400.0),
        FieldType::PaintSplatter => (250.0, 250.0),
    }
}

impl StagingElement {
    /// A staging element of the given type at the origin, with default size
    /// and styling.
    pub fn new(field_type: FieldType) -> Self {
        let (width, height) = default_size(field_type);
        Self {
            geometry: Geometry::new(0.0, 0.0, width, height),
            appearance: Appearance::default(),
            kind: FieldKind::default_for(field_type),
        }
    }

    /// A staging shape of a specific kind.
    pub fn shape(shape: ShapeKind) -> Self {
        let mut staging = Self::new(FieldType::Shape);
        if let FieldKind::Shape(style) = &mut staging.kind {
            style.shape = shape;
        }
        if shape == ShapeKind::Line {
            staging.geometry.height = 10.0;
        }
        staging
    }
}

/// Promote a staging element into a committed field.
///
/// Copies every geometry and style property from `staging`, takes the given
/// identity, and sets `order` (the caller passes the current field count so
/// the new field lands on top of the stack).
pub fn create_field(
    staging: &StagingElement,
    id: FieldId,
    name: impl Into<String>,
    label: impl Into<String>,
    order: usize,
    min_size: f64,
) -> Field {
    Field {
        id,
        name: name.into(),
        label: label.into(),
        order,
        geometry: staging.geometry.clamped(min_size),
        appearance: staging.appearance.clone(),
        kind: staging.kind.clone(),
        locked: false,
        required: false,
    }
}

/// Turn a human label into a field name: lowercase, runs of anything that
/// is not alphanumeric collapsed to a single `_`.
pub fn field_name_from_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Human label for the `n`th field of a type, e.g. `Text 3`.
pub fn default_label(field_type: FieldType, n: usize) -> String {
    let base = match field_type {
        FieldType::Text => "Text",
        FieldType::Number => "Number",
        FieldType::Image => "Image",
        FieldType::Logo => "Logo",
        FieldType::Video => "Video",
        FieldType::Shape => "Shape",
        FieldType::PhotoEffect => "Photo Effect",
        FieldType::Filter => "Filter",
        FieldType::Texture => "Texture",
        FieldType::PaintSplatter => "Paint Splatter",
    };
    format!("{base} {n}")
}
