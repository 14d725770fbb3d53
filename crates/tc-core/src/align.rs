//! Bulk alignment and distribution over a selection.
//!
//! These return the new top-left position of every field that moves instead
//! of mutating anything; the session applies the whole batch as one edit.
//! Locked fields, unknown ids, and repeated ids in the selection are
//! ignored, so a locked field never moves even when it is selected.

use crate::id::FieldId;
use crate::model::{CanvasSize, Field};
use kurbo::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignMode {
    Left,
    Right,
    Top,
    Bottom,
    /// Share a common horizontal center (same center x).
    CenterH,
    /// Share a common vertical center (same center y).
    CenterV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl AlignMode {
    /// Toolbar names: `left`, `right`, `top`, `bottom`, `center-h`, `center-v`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(AlignMode::Left),
            "right" => Some(AlignMode::Right),
            "top" => Some(AlignMode::Top),
            "bottom" => Some(AlignMode::Bottom),
            "center-h" | "centerH" => Some(AlignMode::CenterH),
            "center-v" | "centerV" => Some(AlignMode::CenterV),
            _ => None,
        }
    }
}

impl Axis {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "horizontal" | "h" => Some(Axis::Horizontal),
            "vertical" | "v" => Some(Axis::Vertical),
            _ => None,
        }
    }
}

/// A field's new top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub id: FieldId,
    pub x: f64,
    pub y: f64,
}

/// The unlocked fields named by `selection`, in selection order, each once.
fn eligible<'a>(fields: &'a [Field], selection: &[FieldId]) -> Vec<&'a Field> {
    let mut out: Vec<&Field> = Vec::with_capacity(selection.len());
    for id in selection {
        if out.iter().any(|f| f.id == *id) {
            continue;
        }
        if let Some(f) = fields.iter().find(|f| f.id == *id)
            && !f.locked
        {
            out.push(f);
        }
    }
    out
}

/// Union of the unrotated bounds of `fields`.
pub fn selection_bounds<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Option<Rect> {
    fields
        .into_iter()
        .map(|f| f.geometry.bounds())
        .reduce(|a, b| a.union(b))
}

/// Align the eligible selected fields.
///
/// Edge modes move every field to the extreme edge among the eligible set.
/// Center modes center a single field on the canvas, or several fields on
/// the center of their combined bounding box. An empty eligible set yields
/// no moves.
pub fn align(
    fields: &[Field],
    selection: &[FieldId],
    mode: AlignMode,
    canvas: CanvasSize,
) -> Vec<Move> {
    let items = eligible(fields, selection);
    let Some(bounds) = selection_bounds(items.iter().copied()) else {
        log::debug!("align {mode:?}: nothing eligible");
        return Vec::new();
    };
    let center = if items.len() == 1 {
        canvas.center()
    } else {
        bounds.center()
    };

    items
        .iter()
        .map(|f| {
            let g = &f.geometry;
            let (x, y) = match mode {
                AlignMode::Left => (bounds.x0, g.y),
                AlignMode::Right => (bounds.x1 - g.width, g.y),
                AlignMode::Top => (g.x, bounds.y0),
                AlignMode::Bottom => (g.x, bounds.y1 - g.height),
                AlignMode::CenterH => (center.x - g.width / 2.0, g.y),
                AlignMode::CenterV => (g.x, center.y - g.height / 2.0),
            };
            Move { id: f.id, x, y }
        })
        .collect()
}

/// Space the eligible selected fields evenly along `axis`.
///
/// Fields are ordered by their leading edge; the first and last stay put and
/// the interior ones are placed so every gap between neighbors is equal.
/// Fewer than three eligible fields is a no-op.
pub fn distribute(fields: &[Field], selection: &[FieldId], axis: Axis) -> Vec<Move> {
    let mut items = eligible(fields, selection);
    if items.len() < 3 {
        log::debug!("distribute {axis:?}: needs 3 fields, have {}", items.len());
        return Vec::new();
    }

    let lead = |f: &Field| match axis {
        Axis::Horizontal => f.geometry.x,
        Axis::Vertical => f.geometry.y,
    };
    let extent = |f: &Field| match axis {
        Axis::Horizontal => f.geometry.width,
        Axis::Vertical => f.geometry.height,
    };
    items.sort_by(|a, b| lead(a).total_cmp(&lead(b)));

    let first = items[0];
    let last = items[items.len() - 1];
    let span = lead(last) + extent(last) - lead(first);
    let total: f64 = items.iter().map(|f| extent(f)).sum();
    let gap = (span - total) / (items.len() - 1) as f64;

    let mut cursor = lead(first) + extent(first) + gap;
    let mut moves = Vec::with_capacity(items.len() - 2);
    for f in &items[1..items.len() - 1] {
        let (x, y) = match axis {
            Axis::Horizontal => (cursor, f.geometry.y),
            Axis::Vertical => (f.geometry.x, cursor),
        };
        moves.push(Move { id: f.id, x, y });
        cursor += extent(f) + gap;
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::create_field;
    use crate::model::*;

    fn field(id: &str, x: f64, y: f64, w: f64, h: f64) -> Field {
        let mut staging = StagingElement::new(FieldType::Image);
        staging.geometry = Geometry::new(x, y, w, h);
        create_field(&staging, FieldId::intern(id), id, id, 0, 1.0)
    }

    fn apply(fields: &mut [Field], moves: &[Move]) {
        for m in moves {
            if let Some(f) = fields.iter_mut().find(|f| f.id == m.id) {
                f.geometry.x = m.x;
                f.geometry.y = m.y;
            }
        }
    }

    fn ids(fields: &[Field]) -> Vec<FieldId> {
        fields.iter().map(|f| f.id).collect()
    }

    #[test]
    fn align_left_uses_min_x() {
        let mut fields = vec![
            field("l1", 120.0, 10.0, 50.0, 50.0),
            field("l2", 40.0, 200.0, 80.0, 20.0),
            field("l3", 300.0, 90.0, 10.0, 10.0),
        ];
        let moves = align(&fields, &ids(&fields), AlignMode::Left, CanvasSize::default());
        apply(&mut fields, &moves);
        assert!(fields.iter().all(|f| f.geometry.x == 40.0));
        assert_eq!(fields[1].geometry.y, 200.0);
    }

    #[test]
    fn align_right_and_bottom_use_max_edge() {
        let mut fields = vec![
            field("r1", 0.0, 0.0, 50.0, 30.0),
            field("r2", 100.0, 100.0, 20.0, 60.0),
        ];
        let sel = ids(&fields);
        let moves = align(&fields, &sel, AlignMode::Right, CanvasSize::default());
        apply(&mut fields, &moves);
        assert!(fields.iter().all(|f| f.geometry.right() == 120.0));
        let moves = align(&fields, &sel, AlignMode::Bottom, CanvasSize::default());
        apply(&mut fields, &moves);
        assert!(fields.iter().all(|f| f.geometry.bottom() == 160.0));
    }

    #[test]
    fn center_two_fields_on_their_bounds() {
        let mut fields = vec![
            field("c1", 0.0, 0.0, 100.0, 10.0),
            field("c2", 300.0, 50.0, 50.0, 10.0),
        ];
        let moves = align(&fields, &ids(&fields), AlignMode::CenterH, CanvasSize::default());
        apply(&mut fields, &moves);
        // Combined bounds span 0..350, midpoint 175.
        assert_eq!(fields[0].geometry.center().x, 175.0);
        assert_eq!(fields[1].geometry.center().x, 175.0);
    }

    #[test]
    fn center_single_field_on_canvas() {
        let mut fields = vec![field("c3", 10.0, 10.0, 100.0, 40.0)];
        let canvas = CanvasSize::new(1000.0, 600.0);
        let moves = align(&fields, &ids(&fields), AlignMode::CenterV, canvas);
        apply(&mut fields, &moves);
        assert_eq!(fields[0].geometry.center().y, 300.0);
        assert_eq!(fields[0].geometry.x, 10.0);
    }

    #[test]
    fn locked_fields_never_move() {
        let mut fields = vec![
            field("k1", 10.0, 0.0, 10.0, 10.0),
            field("k2", 50.0, 0.0, 10.0, 10.0),
            field("k3", 90.0, 0.0, 10.0, 10.0),
        ];
        fields[0].locked = true;
        let moves = align(&fields, &ids(&fields), AlignMode::Left, CanvasSize::default());
        assert!(moves.iter().all(|m| m.id != fields[0].id));
        apply(&mut fields, &moves);
        assert_eq!(fields[0].geometry.x, 10.0);
        assert_eq!(fields[1].geometry.x, 50.0);
        assert_eq!(fields[2].geometry.x, 50.0);

        // Two eligible fields are not enough to distribute.
        assert!(distribute(&fields, &ids(&fields), Axis::Horizontal).is_empty());
    }

    #[test]
    fn distribute_equal_gaps() {
        let mut fields = vec![
            field("w1", 0.0, 0.0, 50.0, 10.0),
            field("w3", 150.0, 0.0, 70.0, 10.0),
            field("w2", 100.0, 0.0, 30.0, 10.0),
            field("w4", 400.0, 0.0, 40.0, 10.0),
        ];
        let moves = distribute(&fields, &ids(&fields), Axis::Horizontal);
        assert_eq!(moves.len(), 2);
        apply(&mut fields, &moves);

        let mut sorted = fields.clone();
        sorted.sort_by(|a, b| a.geometry.x.total_cmp(&b.geometry.x));
        let gaps: Vec<f64> = sorted
            .windows(2)
            .map(|w| w[1].geometry.x - w[0].geometry.right())
            .collect();
        for gap in &gaps {
            assert!((gap - gaps[0]).abs() < 1e-9, "gaps differ: {gaps:?}");
        }
        assert_eq!(sorted[0].geometry.x, 0.0);
        assert_eq!(sorted[3].geometry.x, 400.0);
    }

    #[test]
    fn distribute_vertical_keeps_x() {
        let mut fields = vec![
            field("v1", 5.0, 0.0, 10.0, 10.0),
            field("v2", 7.0, 15.0, 10.0, 10.0),
            field("v3", 9.0, 100.0, 10.0, 20.0),
        ];
        let moves = distribute(&fields, &ids(&fields), Axis::Vertical);
        apply(&mut fields, &moves);
        assert_eq!(fields[1].geometry.x, 7.0);
        assert!((fields[1].geometry.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_selection_is_noop() {
        let fields = vec![field("e1", 0.0, 0.0, 10.0, 10.0)];
        assert!(align(&fields, &[], AlignMode::Top, CanvasSize::default()).is_empty());
        assert!(align(&fields, &[FieldId::intern("nope")], AlignMode::Top, CanvasSize::default()).is_empty());
    }

    #[test]
    fn parse_toolbar_names() {
        assert_eq!(AlignMode::parse("center-h"), Some(AlignMode::CenterH));
        assert_eq!(AlignMode::parse("bottom"), Some(AlignMode::Bottom));
        assert_eq!(AlignMode::parse("middle"), None);
        assert_eq!(Axis::parse("vertical"), Some(Axis::Vertical));
        assert_eq!(Axis::parse("diagonal"), None);
    }
}
