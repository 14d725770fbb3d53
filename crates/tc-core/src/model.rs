//! Field data model for template documents.
//!
//! A template is a flat, ordered list of `Field`s painted over a background
//! image. Array position is the paint order: index 0 is drawn first (bottom).
//! Every field shares a common `Geometry` and `Appearance`; everything that
//! only makes sense for one family of field types lives in the `FieldKind`
//! payload, so renderers and property panels match on the variant instead of
//! probing optional properties.

use crate::id::FieldId;
use kurbo::{Point, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0], serialized as a hex string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, or one
    /// of the names `white`, `black`, `transparent`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "black" => Some(Self::BLACK),
            "transparent" => Some(Self::TRANSPARENT),
            other => Self::from_hex(other),
        }
    }

    /// Parse a hex color string. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn with_alpha_factor(self, factor: f32) -> Self {
        Self {
            a: (self.a * factor).clamp(0.0, 1.0),
            ..self
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color: {s}")))
    }
}

// ─── Field types ─────────────────────────────────────────────────────────

/// Payload-free classification of a field. Drives the rendering branch,
/// the default property set, and the placement modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Number,
    Image,
    Logo,
    Video,
    Shape,
    PhotoEffect,
    Filter,
    Texture,
    PaintSplatter,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Image,
        FieldType::Logo,
        FieldType::Video,
        FieldType::Shape,
        FieldType::PhotoEffect,
        FieldType::Filter,
        FieldType::Texture,
        FieldType::PaintSplatter,
    ];

    /// The kebab-case name used in persisted templates and mode names.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Image => "image",
            FieldType::Logo => "logo",
            FieldType::Video => "video",
            FieldType::Shape => "shape",
            FieldType::PhotoEffect => "photo-effect",
            FieldType::Filter => "filter",
            FieldType::Texture => "texture",
            FieldType::PaintSplatter => "paint-splatter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn is_text(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Number)
    }
}

/// Canvas compositing mode applied when a field is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub offset_x: f64,
    pub offset_y: f64,
    pub blur: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    pub width: f64,
    pub color: Color,
}

/// Horizontal text alignment inside the field box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    pub fn apply(self, text: &str) -> String {
        match self {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect(),
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Typography for text and number fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub font_color: Color,
    /// CSS weight, 100..900.
    pub font_weight: u16,
    pub text_align: TextAlign,
    pub letter_spacing: f64,
    /// Multiple of the font size.
    pub line_height: f64,
    pub text_transform: TextTransform,
}

/// How image-like content fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    #[default]
    Cover,
    Contain,
    Fill,
}

/// Image, logo, and video placeholders.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaStyle {
    pub object_fit: ObjectFit,
    pub corner_radius: f64,
    pub border: Option<Border>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    Triangle,
    Line,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Triangle,
        ShapeKind::Line,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    pub shape: ShapeKind,
    pub fill: Option<Color>,
    pub border: Option<Border>,
    pub corner_radius: f64,
}

/// Overlay fields (photo effects, filters, textures, paint splatters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EffectStyle {
    /// Strength of the effect, 0..1.
    pub intensity: f64,
    pub tint: Option<Color>,
    /// Identifier of the asset applied by the export pipeline.
    pub asset: Option<String>,
}

/// Type-specific payload of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fieldType", rename_all = "kebab-case")]
pub enum FieldKind {
    Text(TextStyle),
    Number(TextStyle),
    Image(MediaStyle),
    Logo(MediaStyle),
    Video(MediaStyle),
    Shape(ShapeStyle),
    PhotoEffect(EffectStyle),
    Filter(EffectStyle),
    Texture(EffectStyle),
    PaintSplatter(EffectStyle),
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Text(_) => FieldType::Text,
            FieldKind::Number(_) => FieldType::Number,
            FieldKind::Image(_) => FieldType::Image,
            FieldKind::Logo(_) => FieldType::Logo,
            FieldKind::Video(_) => FieldType::Video,
            FieldKind::Shape(_) => FieldType::Shape,
            FieldKind::PhotoEffect(_) => FieldType::PhotoEffect,
            FieldKind::Filter(_) => FieldType::Filter,
            FieldKind::Texture(_) => FieldType::Texture,
            FieldKind::PaintSplatter(_) => FieldType::PaintSplatter,
        }
    }

    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            FieldKind::Text(style) | FieldKind::Number(style) => Some(style),
            _ => None,
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Position and size in canvas pixel space. `(x, y)` is the top-left corner
/// of the unrotated box; `rotation` is in degrees about the box center and
/// is never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Axis-aligned box, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Rotation wrapped into `[0, 360)` for display.
    pub fn display_rotation(&self) -> f64 {
        self.rotation.rem_euclid(360.0)
    }

    /// Clamp width and height to at least `min`.
    pub fn clamped(self, min: f64) -> Self {
        Self {
            width: self.width.max(min),
            height: self.height.max(min),
            ..self
        }
    }
}

/// Presentation shared by every field type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Appearance {
    /// 0..1
    pub opacity: f64,
    pub visible: bool,
    pub blend_mode: BlendMode,
    pub shadow: Option<Shadow>,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            visible: true,
            blend_mode: BlendMode::Normal,
            shadow: None,
        }
    }
}

// ─── Fields ──────────────────────────────────────────────────────────────

/// Common geometry access for committed fields and the staging element.
pub trait Placeable {
    fn geometry(&self) -> &Geometry;
    fn appearance(&self) -> &Appearance;
    fn kind(&self) -> &FieldKind;

    fn field_type(&self) -> FieldType {
        self.kind().field_type()
    }

    fn bounds(&self) -> Rect {
        self.geometry().bounds()
    }

    fn center(&self) -> Point {
        self.geometry().center()
    }
}

/// A placed design element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    /// Machine key consumed by downstream form filling. Uniqueness is the
    /// caller's concern.
    #[serde(rename = "fieldName")]
    pub name: String,
    /// Human display name; also the placeholder text drawn on the canvas.
    #[serde(rename = "fieldLabel")]
    pub label: String,
    /// Mirrors the array index; rewritten on every reorder.
    #[serde(default)]
    pub order: usize,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Locked fields stay selectable but never move.
    #[serde(default)]
    pub locked: bool,
    /// Only read by downstream form validation.
    #[serde(default)]
    pub required: bool,
}

impl Placeable for Field {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

/// A field-shaped value without identity, name, or order: the ghost that
/// follows the pointer while a placement mode is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingElement {
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(flatten)]
    pub appearance: Appearance,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl StagingElement {
    /// Center the staging box under a canvas-space point.
    pub fn center_on(&mut self, p: Point) {
        self.geometry.x = p.x - self.geometry.width / 2.0;
        self.geometry.y = p.y - self.geometry.height / 2.0;
    }
}

impl Placeable for StagingElement {
    fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    fn kind(&self) -> &FieldKind {
        &self.kind
    }
}

// ─── Partial updates ─────────────────────────────────────────────────────

/// Partial changes shallow-merged into a field by `update`.
///
/// Every property is optional; `None` leaves the field's value untouched.
/// `shadow` distinguishes "absent" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(rename = "fieldName")]
    pub name: Option<String>,
    #[serde(rename = "fieldLabel")]
    pub label: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub blend_mode: Option<BlendMode>,
    #[serde(deserialize_with = "double_option")]
    pub shadow: Option<Option<Shadow>>,
    pub locked: Option<bool>,
    pub required: Option<bool>,
    /// Replaces the whole type-specific payload.
    #[serde(skip)]
    pub kind: Option<FieldKind>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl FieldPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn geometry(g: Geometry) -> Self {
        Self {
            x: Some(g.x),
            y: Some(g.y),
            width: Some(g.width),
            height: Some(g.height),
            rotation: Some(g.rotation),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: f64) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    /// A patch that rewrites every mutable property to match `field`.
    /// Identity and order are never part of a patch.
    pub fn replace_with(field: &Field) -> Self {
        Self {
            name: Some(field.name.clone()),
            label: Some(field.label.clone()),
            opacity: Some(field.appearance.opacity),
            visible: Some(field.appearance.visible),
            blend_mode: Some(field.appearance.blend_mode),
            shadow: Some(field.appearance.shadow),
            locked: Some(field.locked),
            required: Some(field.required),
            kind: Some(field.kind.clone()),
            ..Self::geometry(field.geometry)
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge into `field`. Sizes are clamped to `min_size`.
    pub fn apply(&self, field: &mut Field, min_size: f64) {
        if let Some(name) = &self.name {
            field.name.clone_from(name);
        }
        if let Some(label) = &self.label {
            field.label.clone_from(label);
        }
        let g = &mut field.geometry;
        if let Some(x) = self.x {
            g.x = x;
        }
        if let Some(y) = self.y {
            g.y = y;
        }
        if let Some(w) = self.width {
            g.width = w.max(min_size);
        }
        if let Some(h) = self.height {
            g.height = h.max(min_size);
        }
        if let Some(r) = self.rotation {
            g.rotation = r;
        }
        let a = &mut field.appearance;
        if let Some(o) = self.opacity {
            a.opacity = o.clamp(0.0, 1.0);
        }
        if let Some(v) = self.visible {
            a.visible = v;
        }
        if let Some(b) = self.blend_mode {
            a.blend_mode = b;
        }
        if let Some(s) = self.shadow {
            a.shadow = s;
        }
        if let Some(l) = self.locked {
            field.locked = l;
        }
        if let Some(r) = self.required {
            field.required = r;
        }
        if let Some(kind) = &self.kind {
            field.kind = kind.clone();
        }
    }
}

impl Field {
    /// Shallow-merge a flat JSON object (the persisted field shape) into a
    /// copy of this field. `id` and `order` keys are ignored. Used by property
    /// panels that edit type-specific keys like `fontSize` directly.
    pub fn merged_with_json(
        &self,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Field, String> {
        let mut value = serde_json::to_value(self).map_err(|e| e.to_string())?;
        if let serde_json::Value::Object(obj) = &mut value {
            for (key, v) in patch {
                if key == "id" || key == "order" {
                    continue;
                }
                obj.insert(key.clone(), v.clone());
            }
        }
        serde_json::from_value(value).map_err(|e| format!("invalid field patch: {e}"))
    }
}

// ─── Canvas & guides ─────────────────────────────────────────────────────

/// Intrinsic canvas resolution, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1080.0,
        }
    }
}

impl CanvasSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// A line of constant x.
    Vertical,
    /// A line of constant y.
    Horizontal,
}

/// An ephemeral snap line shown while dragging or resizing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignmentGuide {
    pub orientation: Orientation,
    pub position: f64,
}

impl AlignmentGuide {
    pub fn vertical(x: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            position: x,
        }
    }

    pub fn horizontal(y: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            position: y,
        }
    }
}

// ─── JSON interchange ────────────────────────────────────────────────────

/// Parse a persisted field list.
pub fn fields_from_json(json: &str) -> Result<Vec<Field>, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid field list: {e}"))
}

/// Serialize a field list for persistence by an external save action.
pub fn fields_to_json(fields: &[Field]) -> Result<String, String> {
    serde_json::to_string(fields).map_err(|e| e.to_string())
}
