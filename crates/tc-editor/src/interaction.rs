//! Pointer-driven interaction state machine.
//!
//! The session is either in `Select` mode or placing a field type. While
//! selecting, at most one gesture runs at a time (`Dragging`, `Resizing`,
//! or `Rotating`), held in a single `Interaction` slot. Every gesture is
//! bracketed in history, so a whole drag undoes as one step. Pointer-up and
//! pointer-leave always return the slot to `Idle`.
//!
//! ```text
//!           place-*  ──pointer-down──▶ add field ──▶ select/idle
//!              ▲                                        │
//!          set_mode                             pointer-down on
//!              │                      handle ─▶ resizing / rotating
//!           select/idle ◀── up/leave ─ body   ─▶ dragging
//!                                     nothing ─▶ clear selection
//! ```

use crate::input::{PointerInput, PointerResponse};
use crate::session::EditorSession;
use kurbo::{Affine, Point, Vec2};
use tc_core::geometry::{alignment_guides, snap_position, snap_to_canvas_center};
use tc_core::{FieldId, FieldPatch, FieldType, Geometry, ShapeKind, StagingElement};
use tc_render::{Handle, ResizeHandle, hit_test, hit_test_handle};

/// What a placement mode drops on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Field(FieldType),
    Shape(ShapeKind),
}

impl Placement {
    /// A fresh staging element with this placement's defaults.
    pub fn staging(self) -> StagingElement {
        match self {
            Placement::Field(FieldType::Shape) => StagingElement::shape(ShapeKind::Rectangle),
            Placement::Field(field_type) => StagingElement::new(field_type),
            Placement::Shape(shape) => StagingElement::shape(shape),
        }
    }
}

/// Top-level editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Select,
    Place(Placement),
}

impl Mode {
    /// Parse `select`, `place-<field type>` (e.g. `place-photo-effect`), or
    /// `place-<shape>` (e.g. `place-ellipse`).
    pub fn parse(s: &str) -> Option<Self> {
        if s == "select" {
            return Some(Mode::Select);
        }
        let rest = s.strip_prefix("place-")?;
        if let Some(shape) = ShapeKind::parse(rest) {
            return Some(Mode::Place(Placement::Shape(shape)));
        }
        FieldType::parse(rest).map(|t| Mode::Place(Placement::Field(t)))
    }

    pub fn name(&self) -> String {
        match self {
            Mode::Select => "select".to_string(),
            Mode::Place(Placement::Field(t)) => format!("place-{}", t.as_str()),
            Mode::Place(Placement::Shape(s)) => format!("place-{}", s.as_str()),
        }
    }
}

/// The active gesture, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    Dragging {
        id: FieldId,
        /// Pointer position relative to the field's top-left at grab time.
        offset: Vec2,
    },
    Resizing {
        id: FieldId,
        handle: ResizeHandle,
        start: Geometry,
        start_pointer: Point,
    },
    Rotating {
        id: FieldId,
        center: Point,
        /// Pointer angle about `center` at grab time, in degrees.
        start_angle: f64,
        start_rotation: f64,
    },
}

/// New geometry for a resize from `start` by pointer delta `delta`.
///
/// The handle's sides follow the pointer; the opposite sides stay anchored.
/// Width and height never drop below `min_size`: when the pointer crosses the
/// anchor the box stops shrinking instead of flipping. The delta is taken in
/// the field's own (unrotated) frame so outward drags grow a rotated field.
pub fn resize_geometry(start: Geometry, handle: ResizeHandle, delta: Vec2, min_size: f64) -> Geometry {
    let d = if start.rotation == 0.0 {
        delta
    } else {
        Affine::rotate(-start.rotation.to_radians()) * delta.to_point() - Point::ZERO
    };

    let mut g = start;
    if handle.moves_right() {
        g.width = (start.width + d.x).max(min_size);
    }
    if handle.moves_left() {
        g.width = (start.width - d.x).max(min_size);
        g.x = start.right() - g.width;
    }
    if handle.moves_bottom() {
        g.height = (start.height + d.y).max(min_size);
    }
    if handle.moves_top() {
        g.height = (start.height - d.y).max(min_size);
        g.y = start.bottom() - g.height;
    }
    g
}

/// Angle of `p` about `center`, in degrees.
fn pointer_angle(center: Point, p: Point) -> f64 {
    (p.y - center.y).atan2(p.x - center.x).to_degrees()
}

impl EditorSession {
    // ─── Client-space entry points ───────────────────────────────────────

    pub fn pointer_down(&mut self, input: PointerInput) -> PointerResponse {
        let p = self.view.to_canvas(input);
        self.pointer_down_at(p)
    }

    pub fn pointer_move(&mut self, input: PointerInput) -> PointerResponse {
        let p = self.view.to_canvas(input);
        self.pointer_move_at(p)
    }

    pub fn pointer_up(&mut self, input: PointerInput) -> PointerResponse {
        let p = self.view.to_canvas(input);
        self.pointer_up_at(p)
    }

    /// The pointer left the canvas. Ends any gesture exactly like pointer-up.
    pub fn pointer_leave(&mut self) -> PointerResponse {
        let redraw = self.end_interaction();
        PointerResponse {
            redraw,
            canvas_click: None,
        }
    }

    // ─── Canvas-space handlers ───────────────────────────────────────────

    pub fn pointer_down_at(&mut self, p: Point) -> PointerResponse {
        // A missed pointer-up must not leave a gesture dangling.
        self.end_interaction();

        if let Some(mut staging) = self.staging.take() {
            staging.center_on(p);
            let id = self.place(&staging);
            log::debug!("placed {} at ({:.0}, {:.0})", id, p.x, p.y);
            self.set_mode(Mode::Select);
            return PointerResponse::REDRAW;
        }

        let metrics = self.handle_metrics();
        if let Some(field) = self.selected_field()
            && !field.locked
            && let Some(handle) = hit_test_handle(&field.geometry, p, metrics)
        {
            let id = field.id;
            let g = field.geometry;
            self.interaction = match handle {
                Handle::Resize(handle) => Interaction::Resizing {
                    id,
                    handle,
                    start: g,
                    start_pointer: p,
                },
                Handle::Rotate => {
                    let center = g.center();
                    Interaction::Rotating {
                        id,
                        center,
                        start_angle: pointer_angle(center, p),
                        start_rotation: g.rotation,
                    }
                }
            };
            self.begin_gesture();
            return PointerResponse::REDRAW;
        }

        match hit_test(&self.fields, p) {
            Some(id) => {
                self.selected = Some(id);
                if let Some(field) = self.field(id)
                    && !field.locked
                {
                    self.interaction = Interaction::Dragging {
                        id,
                        offset: p - Point::new(field.geometry.x, field.geometry.y),
                    };
                    self.begin_gesture();
                }
                PointerResponse::REDRAW
            }
            None => {
                let redraw = self.selected.take().is_some();
                PointerResponse {
                    redraw,
                    canvas_click: Some(p),
                }
            }
        }
    }

    pub fn pointer_move_at(&mut self, p: Point) -> PointerResponse {
        match self.interaction {
            Interaction::Idle => match &mut self.staging {
                Some(staging) => {
                    staging.center_on(p);
                    PointerResponse::REDRAW
                }
                None => PointerResponse::NONE,
            },
            Interaction::Dragging { id, offset } => {
                let Some(current) = self.field(id).map(|f| f.geometry) else {
                    return self.abandon(id);
                };
                let raw = Geometry {
                    x: p.x - offset.x,
                    y: p.y - offset.y,
                    ..current
                };
                let g = self.snap_drag(raw);
                self.guides = alignment_guides(
                    &self.fields,
                    &g,
                    Some(id),
                    self.canvas,
                    self.config.snap_threshold,
                );
                self.gesture_update(id, FieldPatch::position(g.x, g.y))
            }
            Interaction::Resizing {
                id,
                handle,
                start,
                start_pointer,
            } => {
                if self.field(id).is_none() {
                    return self.abandon(id);
                }
                let g = resize_geometry(start, handle, p - start_pointer, self.config.min_field_size);
                self.guides = alignment_guides(
                    &self.fields,
                    &g,
                    Some(id),
                    self.canvas,
                    self.config.snap_threshold,
                );
                self.gesture_update(id, FieldPatch::geometry(g))
            }
            Interaction::Rotating {
                id,
                center,
                start_angle,
                start_rotation,
            } => {
                if self.field(id).is_none() {
                    return self.abandon(id);
                }
                let rotation = start_rotation + (pointer_angle(center, p) - start_angle);
                self.gesture_update(id, FieldPatch::rotation(rotation))
            }
        }
    }

    pub fn pointer_up_at(&mut self, _p: Point) -> PointerResponse {
        let redraw = self.end_interaction();
        PointerResponse {
            redraw,
            canvas_click: None,
        }
    }

    /// CSS cursor for the pointer at `p`.
    pub fn cursor_at(&self, p: Point) -> &'static str {
        match self.interaction {
            Interaction::Dragging { .. } => return "grabbing",
            Interaction::Resizing { handle, .. } => return handle.cursor(),
            Interaction::Rotating { .. } => return "grabbing",
            Interaction::Idle => {}
        }
        if self.staging.is_some() {
            return "crosshair";
        }
        if let Some(field) = self.selected_field()
            && !field.locked
        {
            match hit_test_handle(&field.geometry, p, self.handle_metrics()) {
                Some(Handle::Resize(h)) => return h.cursor(),
                Some(Handle::Rotate) => return "grab",
                None => {}
            }
        }
        match hit_test(&self.fields, p) {
            Some(_) => "move",
            None => "default",
        }
    }

    /// End the active gesture: clear guides, settle the last change into
    /// history, and return to idle. Returns whether anything was active.
    pub fn end_interaction(&mut self) -> bool {
        if self.interaction == Interaction::Idle {
            return false;
        }
        if self.gesture_dirty {
            // Settled snapshot; coalesces into the gesture's entry.
            self.snapshot();
        }
        self.guides.clear();
        self.interaction = Interaction::Idle;
        self.gesture_dirty = false;
        self.history.end_gesture();
        true
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn begin_gesture(&mut self) {
        self.gesture_dirty = false;
        self.history.begin_gesture();
        log::trace!("gesture start: {:?}", self.interaction);
    }

    fn gesture_update(&mut self, id: FieldId, patch: FieldPatch) -> PointerResponse {
        self.patch_field(id, &patch);
        self.gesture_dirty = true;
        PointerResponse::REDRAW
    }

    /// The gesture's field is gone from the document.
    fn abandon(&mut self, id: FieldId) -> PointerResponse {
        log::debug!("field {id} vanished mid-gesture");
        self.end_interaction();
        PointerResponse::REDRAW
    }

    /// Grid snap first, then pull the center onto the canvas center when
    /// close. Sibling-edge guides are advisory and never move the field.
    fn snap_drag(&self, raw: Geometry) -> Geometry {
        let threshold = self.config.snap_threshold;
        let g = if self.config.snap_to_grid {
            snap_position(raw, self.config.grid_size, threshold)
        } else {
            raw
        };
        snap_to_canvas_center(g, self.canvas, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;
    use tc_core::{CanvasSize, EditorConfig, Field, create_field};

    fn session_with(fields: &[(&str, f64, f64, f64, f64)]) -> EditorSession {
        let mut s = EditorSession::with_clock(
            EditorConfig::default(),
            CanvasSize::new(1000.0, 1000.0),
            ManualClock::new(),
        );
        let staging = StagingElement::new(FieldType::Shape);
        let fields: Vec<Field> = fields
            .iter()
            .enumerate()
            .map(|(i, &(id, x, y, w, h))| {
                let mut field = create_field(&staging, FieldId::intern(id), id, id, i, 1.0);
                field.geometry = Geometry::new(x, y, w, h);
                field
            })
            .collect();
        s.set_fields(fields).unwrap();
        s
    }

    #[test]
    fn mode_names_roundtrip() {
        for name in ["select", "place-text", "place-photo-effect", "place-ellipse", "place-line"] {
            assert_eq!(Mode::parse(name).map(|m| m.name()), Some(name.to_string()));
        }
        assert_eq!(
            Mode::parse("place-shape"),
            Some(Mode::Place(Placement::Field(FieldType::Shape)))
        );
        assert_eq!(Mode::parse("place-nothing"), None);
        assert_eq!(Mode::parse("drag"), None);
    }

    #[test]
    fn resize_se_keeps_origin() {
        let start = Geometry::new(100.0, 100.0, 200.0, 100.0);
        for (dx, dy) in [(50.0, 20.0), (-500.0, -500.0), (0.0, 0.0), (3.5, -99.0)] {
            let g = resize_geometry(start, ResizeHandle::SE, Vec2::new(dx, dy), 10.0);
            assert_eq!((g.x, g.y), (100.0, 100.0));
            assert!(g.width >= 10.0 && g.height >= 10.0);
        }
    }

    #[test]
    fn resize_nw_keeps_opposite_corner() {
        let start = Geometry::new(100.0, 100.0, 200.0, 100.0);
        for (dx, dy) in [(50.0, 20.0), (-30.0, -70.0), (400.0, 400.0), (0.25, 0.5)] {
            let g = resize_geometry(start, ResizeHandle::NW, Vec2::new(dx, dy), 10.0);
            assert!((g.right() - 300.0).abs() < 1e-9, "right moved: {g:?}");
            assert!((g.bottom() - 200.0).abs() < 1e-9, "bottom moved: {g:?}");
        }
        let g = resize_geometry(start, ResizeHandle::NW, Vec2::new(50.0, 20.0), 10.0);
        assert_eq!((g.x, g.y, g.width, g.height), (150.0, 120.0, 150.0, 80.0));
    }

    #[test]
    fn resize_edges_touch_one_axis() {
        let start = Geometry::new(0.0, 0.0, 100.0, 100.0);
        let g = resize_geometry(start, ResizeHandle::E, Vec2::new(25.0, 80.0), 10.0);
        assert_eq!((g.width, g.height), (125.0, 100.0));
        let g = resize_geometry(start, ResizeHandle::N, Vec2::new(25.0, 30.0), 10.0);
        assert_eq!((g.x, g.y, g.width, g.height), (0.0, 30.0, 100.0, 70.0));
    }

    #[test]
    fn resize_never_goes_below_minimum() {
        let start = Geometry::new(0.0, 0.0, 100.0, 100.0);
        let g = resize_geometry(start, ResizeHandle::W, Vec2::new(500.0, 0.0), 10.0);
        assert_eq!((g.x, g.width), (90.0, 10.0));
    }

    #[test]
    fn click_selects_topmost_and_clicking_empty_clears() {
        let mut s = session_with(&[("under", 0.0, 0.0, 100.0, 100.0), ("over", 50.0, 50.0, 100.0, 100.0)]);
        s.pointer_down_at(Point::new(75.0, 75.0));
        assert_eq!(s.selected(), Some(FieldId::intern("over")));
        s.pointer_up_at(Point::new(75.0, 75.0));
        // A click without movement records nothing.
        assert!(!s.can_undo());

        let response = s.pointer_down_at(Point::new(900.0, 900.0));
        assert_eq!(s.selected(), None);
        assert_eq!(response.canvas_click, Some(Point::new(900.0, 900.0)));
    }

    #[test]
    fn locked_field_selects_but_does_not_drag() {
        let mut s = session_with(&[("lock", 0.0, 0.0, 100.0, 100.0)]);
        let id = FieldId::intern("lock");
        s.update(id, &FieldPatch { locked: Some(true), ..FieldPatch::default() });
        s.pointer_down_at(Point::new(50.0, 50.0));
        assert_eq!(s.selected(), Some(id));
        assert!(!s.is_interacting());
        s.pointer_move_at(Point::new(300.0, 300.0));
        assert_eq!(s.field(id).map(|f| (f.geometry.x, f.geometry.y)), Some((0.0, 0.0)));
    }

    #[test]
    fn leave_ends_gesture() {
        let mut s = session_with(&[("leave", 0.0, 0.0, 100.0, 100.0)]);
        s.pointer_down_at(Point::new(50.0, 50.0));
        s.pointer_move_at(Point::new(300.0, 300.0));
        assert!(s.is_interacting());
        let response = s.pointer_leave();
        assert!(response.redraw);
        assert!(!s.is_interacting());
        assert!(s.guides().is_empty());
    }

    #[test]
    fn placement_commits_on_pointer_down() {
        let mut s = session_with(&[]);
        s.set_mode(Mode::Place(Placement::Field(FieldType::Logo)));
        s.pointer_move_at(Point::new(200.0, 300.0));
        assert_eq!(s.staging().map(|st| st.geometry.center()), Some(Point::new(200.0, 300.0)));
        assert!(s.fields().is_empty());

        s.pointer_down_at(Point::new(400.0, 400.0));
        assert_eq!(s.mode(), Mode::Select);
        assert!(s.staging().is_none());
        assert_eq!(s.fields().len(), 1);
        let placed = &s.fields()[0];
        assert_eq!(s.selected(), Some(placed.id));
        assert_eq!(placed.kind.field_type(), FieldType::Logo);
        assert_eq!(placed.geometry.center(), Point::new(400.0, 400.0));
        assert_eq!(placed.label, "Logo 1");
        assert_eq!(placed.name, "logo_1");
    }

    #[test]
    fn cursors() {
        let mut s = session_with(&[("cur", 100.0, 100.0, 100.0, 100.0)]);
        assert_eq!(s.cursor_at(Point::new(150.0, 150.0)), "move");
        assert_eq!(s.cursor_at(Point::new(10.0, 10.0)), "default");
        s.select(Some(FieldId::intern("cur")));
        assert_eq!(s.cursor_at(Point::new(200.0, 200.0)), "nwse-resize");
        assert_eq!(s.cursor_at(Point::new(150.0, 70.0)), "grab");
    }
}
