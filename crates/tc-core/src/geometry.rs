//! Snapping and alignment guides.
//!
//! Pure functions over the field list: no editor state, no side effects.
//! The interaction controller calls them on every pointer move while a
//! field is being dragged or resized.

use crate::id::FieldId;
use crate::model::{AlignmentGuide, CanvasSize, Field, Geometry, Orientation};
use smallvec::SmallVec;

pub type Guides = SmallVec<[AlignmentGuide; 4]>;

/// Round `value` to the nearest multiple of `grid` when it lies within
/// `threshold` of it; otherwise return it unchanged. A non-positive grid
/// disables snapping.
pub fn snap_to_grid(value: f64, grid: f64, threshold: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    let nearest = (value / grid).round() * grid;
    if (nearest - value).abs() < threshold {
        nearest
    } else {
        value
    }
}

/// Grid-snap the top-left corner of a box, each axis independently.
pub fn snap_position(g: Geometry, grid: f64, threshold: f64) -> Geometry {
    Geometry {
        x: snap_to_grid(g.x, grid, threshold),
        y: snap_to_grid(g.y, grid, threshold),
        ..g
    }
}

/// Move a box so its center sits exactly on the canvas center along any
/// axis where it is already within `threshold` of it.
pub fn snap_to_canvas_center(g: Geometry, canvas: CanvasSize, threshold: f64) -> Geometry {
    let c = g.center();
    let cc = canvas.center();
    let mut out = g;
    if (c.x - cc.x).abs() < threshold {
        out.x = cc.x - g.width / 2.0;
    }
    if (c.y - cc.y).abs() < threshold {
        out.y = cc.y - g.height / 2.0;
    }
    out
}

/// Compute the guide lines for a box at `candidate`.
///
/// - Canvas center: a vertical (horizontal) guide at the canvas center when
///   the box center is within `threshold` of it.
/// - Siblings: for every other visible field, a guide along the candidate's
///   left, right, top, or bottom edge when that edge is within `threshold`
///   of the sibling's matching edge.
///
/// Sibling guides are placed on the candidate's own edge: that is the line
/// the dragged field actually sits on after grid snapping. Duplicates are
/// removed; order is canvas-center first, then sibling order.
pub fn alignment_guides(
    fields: &[Field],
    candidate: &Geometry,
    exclude: Option<FieldId>,
    canvas: CanvasSize,
    threshold: f64,
) -> Guides {
    let mut guides = Guides::new();
    let mut push = |guide: AlignmentGuide| {
        if !guides.contains(&guide) {
            guides.push(guide);
        }
    };

    let c = candidate.center();
    let cc = canvas.center();
    if (c.x - cc.x).abs() < threshold {
        push(AlignmentGuide::vertical(cc.x));
    }
    if (c.y - cc.y).abs() < threshold {
        push(AlignmentGuide::horizontal(cc.y));
    }

    for other in fields {
        if Some(other.id) == exclude || !other.appearance.visible {
            continue;
        }
        let o = &other.geometry;
        if (candidate.x - o.x).abs() < threshold {
            push(AlignmentGuide::vertical(candidate.x));
        }
        if (candidate.right() - o.right()).abs() < threshold {
            push(AlignmentGuide::vertical(candidate.right()));
        }
        if (candidate.y - o.y).abs() < threshold {
            push(AlignmentGuide::horizontal(candidate.y));
        }
        if (candidate.bottom() - o.bottom()).abs() < threshold {
            push(AlignmentGuide::horizontal(candidate.bottom()));
        }
    }

    log::trace!("{} guide(s) for {:?}", guides.len(), exclude);
    guides
}

/// Whether any guide of the given orientation is present.
pub fn has_guide(guides: &[AlignmentGuide], orientation: Orientation) -> bool {
    guides.iter().any(|g| g.orientation == orientation)
}
