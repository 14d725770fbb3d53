//! Field management: every structural change to the field list.
//!
//! Each operation copies the current list, edits the copy, and commits it as
//! a single history snapshot. Operations on an unknown id change nothing and
//! return `false`; `update` is the exception and snapshots regardless, so a
//! stale id from a UI callback still leaves a consistent history.

use crate::session::EditorSession;
use std::collections::HashSet;
use tc_core::defaults::{default_label, field_name_from_label};
use tc_core::{
    AlignMode, Axis, Field, FieldId, FieldPatch, Move, StagingElement, align, create_field,
    distribute,
};

/// Where `move_layer` sends a field in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    /// One step toward the top (later in paint order).
    Up,
    Down,
    Top,
    Bottom,
}

impl LayerMove {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" | "forward" => Some(LayerMove::Up),
            "down" | "backward" => Some(LayerMove::Down),
            "top" | "front" => Some(LayerMove::Top),
            "bottom" | "back" => Some(LayerMove::Bottom),
            _ => None,
        }
    }
}

/// Rewrite `order` to match array position.
fn reindex(fields: &mut [Field]) {
    for (i, field) in fields.iter_mut().enumerate() {
        field.order = i;
    }
}

impl EditorSession {
    /// Copy the field list, let `edit` change it, and commit when `edit`
    /// reports a change. Any active gesture is settled first so the edit
    /// gets its own history entry.
    fn edit_fields(&mut self, edit: impl FnOnce(&mut Vec<Field>) -> bool) -> bool {
        self.end_interaction();
        let mut fields = self.fields.as_ref().clone();
        if !edit(&mut fields) {
            return false;
        }
        self.commit(fields);
        true
    }

    /// Promote `staging` into a new field on top of the stack and select it.
    pub fn add(
        &mut self,
        staging: &StagingElement,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> FieldId {
        self.end_interaction();
        let id = self.fresh_id();
        let field = create_field(
            staging,
            id,
            name,
            label,
            self.fields.len(),
            self.config.min_field_size,
        );
        log::debug!("add {} ({})", id, field.kind.field_type().as_str());
        let mut fields = self.fields.as_ref().clone();
        fields.push(field);
        self.selected = Some(id);
        self.commit(fields);
        id
    }

    /// `add` with a generated label (`Text 3`) and matching name (`text_3`).
    pub fn place(&mut self, staging: &StagingElement) -> FieldId {
        let field_type = staging.kind.field_type();
        let existing = self
            .fields
            .iter()
            .filter(|f| f.kind.field_type() == field_type)
            .count();
        let label = default_label(field_type, existing + 1);
        let name = field_name_from_label(&label);
        self.add(staging, name, label)
    }

    /// Shallow-merge `patch` into the field. Always snapshots; returns
    /// whether the field exists. Ends any active gesture first.
    pub fn update(&mut self, id: FieldId, patch: &FieldPatch) -> bool {
        self.end_interaction();
        self.patch_field(id, patch)
    }

    /// `update` without touching the gesture; pointer moves land here.
    pub(crate) fn patch_field(&mut self, id: FieldId, patch: &FieldPatch) -> bool {
        let min_size = self.config.min_field_size;
        let mut fields = self.fields.as_ref().clone();
        let found = match fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                patch.apply(field, min_size);
                true
            }
            None => {
                log::debug!("update: no field {id}");
                false
            }
        };
        self.commit(fields);
        found
    }

    /// Remove the field. Clears the selection if it pointed at it.
    pub fn delete(&mut self, id: FieldId) -> bool {
        if self.field(id).is_none() {
            return false;
        }
        self.end_interaction();
        let mut fields = self.fields.as_ref().clone();
        fields.retain(|f| f.id != id);
        reindex(&mut fields);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit(fields);
        log::debug!("delete {id}");
        true
    }

    /// Clone the field with a fresh id, offset by the duplicate offset,
    /// renamed `<name>_copy` / `<label> (Copy)`, on top of the stack, and
    /// selected.
    pub fn duplicate(&mut self, id: FieldId) -> Option<FieldId> {
        let source = self.field(id)?.clone();
        self.end_interaction();
        let new_id = self.fresh_id();
        let offset = self.config.duplicate_offset;

        let mut copy = source;
        copy.id = new_id;
        copy.name = format!("{}_copy", copy.name);
        copy.label = format!("{} (Copy)", copy.label);
        copy.geometry.x += offset;
        copy.geometry.y += offset;
        copy.order = self.fields.len();

        let mut fields = self.fields.as_ref().clone();
        fields.push(copy);
        self.selected = Some(new_id);
        self.commit(fields);
        log::debug!("duplicate {id} → {new_id}");
        Some(new_id)
    }

    /// Move a field within the stack. `order` stays equal to array index for
    /// every field. Returns `false` when the field is unknown or already at
    /// the requested end.
    pub fn move_layer(&mut self, id: FieldId, to: LayerMove) -> bool {
        self.edit_fields(|fields| {
            let Some(from) = fields.iter().position(|f| f.id == id) else {
                return false;
            };
            let last = fields.len() - 1;
            let target = match to {
                LayerMove::Up => (from + 1).min(last),
                LayerMove::Down => from.saturating_sub(1),
                LayerMove::Top => last,
                LayerMove::Bottom => 0,
            };
            if target == from {
                return false;
            }
            let field = fields.remove(from);
            fields.insert(target, field);
            reindex(fields);
            true
        })
    }

    /// Flip the visible flag. Geometry and selection are untouched.
    pub fn toggle_visibility(&mut self, id: FieldId) -> bool {
        self.edit_fields(|fields| match fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                field.appearance.visible = !field.appearance.visible;
                true
            }
            None => false,
        })
    }

    /// Align the given fields; locked fields are left where they are. The
    /// whole batch is one history entry.
    pub fn align(&mut self, selection: &[FieldId], mode: AlignMode) -> bool {
        let moves = align(&self.fields, selection, mode, self.canvas);
        self.apply_moves(&moves)
    }

    /// Space the given fields evenly; needs three or more unlocked fields.
    pub fn distribute(&mut self, selection: &[FieldId], axis: Axis) -> bool {
        let moves = distribute(&self.fields, selection, axis);
        self.apply_moves(&moves)
    }

    fn apply_moves(&mut self, moves: &[Move]) -> bool {
        if moves.is_empty() {
            return false;
        }
        self.edit_fields(|fields| {
            for m in moves {
                if let Some(field) = fields.iter_mut().find(|f| f.id == m.id) {
                    field.geometry.x = m.x;
                    field.geometry.y = m.y;
                }
            }
            true
        })
    }

    /// Move the selected field by `(dx, dy)`. Locked fields stay put.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> bool {
        let Some(field) = self.selected_field() else {
            return false;
        };
        if field.locked {
            return false;
        }
        let (id, x, y) = (field.id, field.geometry.x, field.geometry.y);
        self.update(id, &FieldPatch::position(x + dx, y + dy))
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    pub fn duplicate_selected(&mut self) -> Option<FieldId> {
        match self.selected {
            Some(id) => self.duplicate(id),
            None => None,
        }
    }

    /// Select a field by id, or clear the selection. Selecting an unknown id
    /// changes nothing and returns `false`. Selection alone is not recorded
    /// in history.
    pub fn select(&mut self, id: Option<FieldId>) -> bool {
        match id {
            Some(id) if self.field(id).is_none() => false,
            _ => {
                self.selected = id;
                true
            }
        }
    }

    /// Replace the whole document, e.g. after loading a template. Rejects
    /// duplicate ids; clamps sizes, rewrites `order` densely, clears the
    /// selection, and starts a fresh history.
    pub fn set_fields(&mut self, mut fields: Vec<Field>) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.id) {
                return Err(format!("duplicate field id {}", field.id));
            }
        }
        let min_size = self.config.min_field_size;
        for field in &mut fields {
            field.geometry = field.geometry.clamped(min_size);
            field.appearance.opacity = field.appearance.opacity.clamp(0.0, 1.0);
        }
        reindex(&mut fields);

        self.end_interaction();
        self.fields = std::sync::Arc::new(fields);
        self.selected = None;
        self.guides.clear();
        self.reset_history();
        log::info!("loaded {} field(s)", self.fields.len());
        Ok(())
    }

    /// A generated id not used by any current field.
    fn fresh_id(&self) -> FieldId {
        loop {
            let id = FieldId::generate();
            if self.field(id).is_none() {
                return id;
            }
        }
    }
}
