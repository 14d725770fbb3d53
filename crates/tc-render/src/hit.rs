//! Hit testing: point → field / handle lookup.
//!
//! Fields are tested topmost-first (reverse array order, last painted wins).
//! Rotated fields are tested in their own unrotated frame, so a hit on a
//! rotated box corner lands exactly where the box is drawn.

use kurbo::{Affine, Point};
use tc_core::{Field, FieldId, Geometry};

/// One of the eight resize handles, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NW,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::NW => "nw",
            ResizeHandle::N => "n",
            ResizeHandle::NE => "ne",
            ResizeHandle::E => "e",
            ResizeHandle::SE => "se",
            ResizeHandle::S => "s",
            ResizeHandle::SW => "sw",
            ResizeHandle::W => "w",
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            ResizeHandle::NW | ResizeHandle::NE | ResizeHandle::SE | ResizeHandle::SW
        )
    }

    /// The handle drags the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::NW | ResizeHandle::W | ResizeHandle::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::NE | ResizeHandle::E | ResizeHandle::SE)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::NW | ResizeHandle::N | ResizeHandle::NE)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::SW | ResizeHandle::S | ResizeHandle::SE)
    }

    /// CSS cursor for hovering this handle on an unrotated field.
    pub fn cursor(self) -> &'static str {
        match self {
            ResizeHandle::NW | ResizeHandle::SE => "nwse-resize",
            ResizeHandle::NE | ResizeHandle::SW => "nesw-resize",
            ResizeHandle::N | ResizeHandle::S => "ns-resize",
            ResizeHandle::E | ResizeHandle::W => "ew-resize",
        }
    }
}

/// A grab point on the selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    Resize(ResizeHandle),
    Rotate,
}

/// Handle dimensions in canvas pixels (already divided by display scale).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Edge length of a square handle; also the hit tolerance.
    pub size: f64,
    /// Distance of the rotate handle above the top edge.
    pub rotate_offset: f64,
}

impl HandleMetrics {
    /// Metrics for a canvas shown at `scale` screen pixels per canvas pixel.
    pub fn scaled(size: f64, rotate_offset: f64, scale: f64) -> Self {
        let inv = if scale > 0.0 { 1.0 / scale } else { 1.0 };
        Self {
            size: size * inv,
            rotate_offset: rotate_offset * inv,
        }
    }
}

/// Rotation about the field center, canvas ← local.
pub fn field_transform(g: &Geometry) -> Affine {
    Affine::rotate_about(g.rotation.to_radians(), g.center())
}

/// Map a canvas point into the field's unrotated frame.
pub fn to_local(g: &Geometry, p: Point) -> Point {
    if g.rotation == 0.0 {
        return p;
    }
    field_transform(g).inverse() * p
}

/// Handle centers in the field's unrotated frame. The rotate handle comes
/// first, then corners, then edges: the order hit testing checks them in.
pub fn handle_positions(g: &Geometry, metrics: HandleMetrics) -> [(Handle, Point); 9] {
    let (x0, y0, x1, y1) = (g.x, g.y, g.right(), g.bottom());
    let (cx, cy) = (g.center().x, g.center().y);
    [
        (Handle::Rotate, Point::new(cx, y0 - metrics.rotate_offset)),
        (Handle::Resize(ResizeHandle::NW), Point::new(x0, y0)),
        (Handle::Resize(ResizeHandle::NE), Point::new(x1, y0)),
        (Handle::Resize(ResizeHandle::SE), Point::new(x1, y1)),
        (Handle::Resize(ResizeHandle::SW), Point::new(x0, y1)),
        (Handle::Resize(ResizeHandle::N), Point::new(cx, y0)),
        (Handle::Resize(ResizeHandle::E), Point::new(x1, cy)),
        (Handle::Resize(ResizeHandle::S), Point::new(cx, y1)),
        (Handle::Resize(ResizeHandle::W), Point::new(x0, cy)),
    ]
}

/// Find the handle of a selected field under `p`, if any.
///
/// Outside the box a handle grabs within the full handle size. Toward the
/// interior the reach is capped at a quarter of the field's extent, so the
/// middle of a small or thin field always stays a drag target.
pub fn hit_test_handle(g: &Geometry, p: Point, metrics: HandleMetrics) -> Option<Handle> {
    let local = to_local(g, p);
    let size = metrics.size;
    let reach_x = size.min(g.width / 4.0);
    let reach_y = size.min(g.height / 4.0);
    handle_positions(g, metrics)
        .into_iter()
        .find(|(handle, at)| {
            let (dx, dy) = (local.x - at.x, local.y - at.y);
            match handle {
                Handle::Rotate => dx.abs() <= size && dy.abs() <= size,
                Handle::Resize(h) => {
                    let (out_left, out_right) = if h.moves_left() {
                        (size, reach_x)
                    } else if h.moves_right() {
                        (reach_x, size)
                    } else {
                        (reach_x, reach_x)
                    };
                    let (out_top, out_bottom) = if h.moves_top() {
                        (size, reach_y)
                    } else if h.moves_bottom() {
                        (reach_y, size)
                    } else {
                        (reach_y, reach_y)
                    };
                    (-out_left..=out_right).contains(&dx) && (-out_top..=out_bottom).contains(&dy)
                }
            }
        })
        .map(|(handle, _)| handle)
}

/// Whether `p` falls inside the (possibly rotated) field box.
pub fn contains(g: &Geometry, p: Point) -> bool {
    let local = to_local(g, p);
    local.x >= g.x && local.x <= g.right() && local.y >= g.y && local.y <= g.bottom()
}

/// Find the topmost visible field at `p`. Returns `None` on background.
pub fn hit_test(fields: &[Field], p: Point) -> Option<FieldId> {
    fields
        .iter()
        .rev()
        .find(|f| f.appearance.visible && contains(&f.geometry, p))
        .map(|f| f.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tc_core::{FieldType, StagingElement, create_field};

    fn field(id: &str, x: f64, y: f64, w: f64, h: f64) -> Field {
        let mut staging = StagingElement::new(FieldType::Shape);
        staging.geometry = Geometry::new(x, y, w, h);
        create_field(&staging, FieldId::intern(id), id, id, 0, 1.0)
    }

    const METRICS: HandleMetrics = HandleMetrics {
        size: 10.0,
        rotate_offset: 30.0,
    };

    #[test]
    fn topmost_field_wins() {
        let fields = vec![
            field("bottom", 0.0, 0.0, 100.0, 100.0),
            field("top", 50.0, 50.0, 100.0, 100.0),
        ];
        assert_eq!(hit_test(&fields, Point::new(75.0, 75.0)), Some(FieldId::intern("top")));
        assert_eq!(hit_test(&fields, Point::new(10.0, 10.0)), Some(FieldId::intern("bottom")));
        assert_eq!(hit_test(&fields, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn hidden_fields_are_not_hit() {
        let mut fields = vec![
            field("under", 0.0, 0.0, 100.0, 100.0),
            field("ghost", 0.0, 0.0, 100.0, 100.0),
        ];
        fields[1].appearance.visible = false;
        assert_eq!(hit_test(&fields, Point::new(5.0, 5.0)), Some(FieldId::intern("under")));
    }

    #[test]
    fn rotated_box_is_tested_in_local_frame() {
        let mut f = field("rot", 0.0, 0.0, 200.0, 20.0);
        f.geometry.rotation = 90.0;
        // Center is (100, 10); rotated 90° the box spans x 90..110, y -90..110.
        assert!(contains(&f.geometry, Point::new(100.0, 100.0)));
        assert!(!contains(&f.geometry, Point::new(180.0, 10.0)));
    }

    #[test]
    fn handles_hit_with_tolerance() {
        let g = Geometry::new(100.0, 100.0, 200.0, 100.0);
        assert_eq!(
            hit_test_handle(&g, Point::new(303.0, 198.0), METRICS),
            Some(Handle::Resize(ResizeHandle::SE))
        );
        assert_eq!(
            hit_test_handle(&g, Point::new(200.0, 100.0), METRICS),
            Some(Handle::Resize(ResizeHandle::N))
        );
        assert_eq!(
            hit_test_handle(&g, Point::new(200.0, 72.0), METRICS),
            Some(Handle::Rotate)
        );
        assert_eq!(hit_test_handle(&g, Point::new(200.0, 150.0), METRICS), None);
    }

    #[test]
    fn thin_field_interior_is_not_a_handle() {
        // 400×80 text box seen at quarter scale: handles are 40 canvas px.
        let g = Geometry::new(0.0, 0.0, 400.0, 80.0);
        let m = HandleMetrics::scaled(10.0, 30.0, 0.25);
        assert_eq!(hit_test_handle(&g, Point::new(200.0, 40.0), m), None);
        assert_eq!(hit_test_handle(&g, Point::new(200.0, 21.0), m), None);
        // Full reach outside the box, capped reach inside it.
        assert_eq!(
            hit_test_handle(&g, Point::new(200.0, -35.0), m),
            Some(Handle::Resize(ResizeHandle::N))
        );
        assert_eq!(
            hit_test_handle(&g, Point::new(200.0, 15.0), m),
            Some(Handle::Resize(ResizeHandle::N))
        );
        assert_eq!(
            hit_test_handle(&g, Point::new(430.0, 95.0), m),
            Some(Handle::Resize(ResizeHandle::SE))
        );
    }

    #[test]
    fn scaled_metrics_grow_when_zoomed_out() {
        let m = HandleMetrics::scaled(10.0, 30.0, 0.5);
        assert_eq!(m.size, 20.0);
        assert_eq!(m.rotate_offset, 60.0);
    }

    #[test]
    fn handle_sides() {
        assert!(ResizeHandle::NW.moves_left() && ResizeHandle::NW.moves_top());
        assert!(!ResizeHandle::SE.moves_left() && !ResizeHandle::SE.moves_top());
        assert!(!ResizeHandle::N.is_corner());
    }
}
