//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s, and dispatches
//! them through the session so every structural change goes through field
//! management and history like a pointer edit would.
//!
//! The map lives in Rust so the browser bridge and native hosts share it.

use crate::fields::LayerMove;
use crate::interaction::{Mode, Placement};
use crate::session::EditorSession;
use tc_core::{FieldType, ShapeKind};

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Modes ──
    ModeSelect,
    PlaceText,
    PlaceImage,
    PlaceLogo,
    PlaceShape,

    // ── Edit ──
    Undo,
    Redo,
    Delete,
    Duplicate,
    /// Escape: cancel placement, or clear the selection.
    Deselect,
    /// Arrow keys; `large` when Shift is held.
    Nudge { dx: i8, dy: i8, large: bool },

    // ── Z-order ──
    SendBackward,
    BringForward,
    SendToBack,
    BringToFront,

    // ── View ──
    ToggleGrid,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"ArrowLeft"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if let Some((dx, dy)) = arrow(key)
            && !cmd
        {
            return Some(ShortcutAction::Nudge {
                dx,
                dy,
                large: shift,
            });
        }

        // ── Modifier combos first (most specific) ──
        if cmd && shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                "[" | "{" => Some(ShortcutAction::SendToBack),
                "]" | "}" => Some(ShortcutAction::BringToFront),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "[" => Some(ShortcutAction::SendBackward),
                "]" => Some(ShortcutAction::BringForward),
                "'" => Some(ShortcutAction::ToggleGrid),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ModeSelect),
            "t" | "T" => Some(ShortcutAction::PlaceText),
            "i" | "I" => Some(ShortcutAction::PlaceImage),
            "l" | "L" => Some(ShortcutAction::PlaceLogo),
            "s" | "S" => Some(ShortcutAction::PlaceShape),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

fn arrow(key: &str) -> Option<(i8, i8)> {
    match key {
        "ArrowLeft" => Some((-1, 0)),
        "ArrowRight" => Some((1, 0)),
        "ArrowUp" => Some((0, -1)),
        "ArrowDown" => Some((0, 1)),
        _ => None,
    }
}

impl EditorSession {
    /// Perform a shortcut action. Returns whether anything changed.
    pub fn apply_shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::ModeSelect => self.switch_mode(Mode::Select),
            ShortcutAction::PlaceText => {
                self.switch_mode(Mode::Place(Placement::Field(FieldType::Text)))
            }
            ShortcutAction::PlaceImage => {
                self.switch_mode(Mode::Place(Placement::Field(FieldType::Image)))
            }
            ShortcutAction::PlaceLogo => {
                self.switch_mode(Mode::Place(Placement::Field(FieldType::Logo)))
            }
            ShortcutAction::PlaceShape => {
                self.switch_mode(Mode::Place(Placement::Shape(ShapeKind::Rectangle)))
            }
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Duplicate => self.duplicate_selected().is_some(),
            ShortcutAction::Deselect => {
                if self.mode != Mode::Select {
                    self.set_mode(Mode::Select);
                    true
                } else {
                    self.selected.take().is_some()
                }
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    self.config.nudge_step_large
                } else {
                    self.config.nudge_step
                };
                self.nudge_selected(f64::from(dx) * step, f64::from(dy) * step)
            }
            ShortcutAction::SendBackward => self.move_selected_layer(LayerMove::Down),
            ShortcutAction::BringForward => self.move_selected_layer(LayerMove::Up),
            ShortcutAction::SendToBack => self.move_selected_layer(LayerMove::Bottom),
            ShortcutAction::BringToFront => self.move_selected_layer(LayerMove::Top),
            ShortcutAction::ToggleGrid => {
                self.config.show_grid = !self.config.show_grid;
                true
            }
        }
    }

    fn switch_mode(&mut self, mode: Mode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.set_mode(mode);
        true
    }

    fn move_selected_layer(&mut self, to: LayerMove) -> bool {
        match self.selected {
            Some(id) => self.move_layer(id, to),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use tc_core::{CanvasSize, EditorConfig, Geometry, StagingElement};

    #[test]
    fn resolve_mode_shortcuts() {
        assert_eq!(
            ShortcutMap::resolve("v", false, false, false, false),
            Some(ShortcutAction::ModeSelect)
        );
        assert_eq!(
            ShortcutMap::resolve("t", false, false, false, false),
            Some(ShortcutAction::PlaceText)
        );
        assert_eq!(
            ShortcutMap::resolve("I", false, false, false, false),
            Some(ShortcutAction::PlaceImage)
        );
        assert_eq!(
            ShortcutMap::resolve("l", false, false, false, false),
            Some(ShortcutAction::PlaceLogo)
        );
        assert_eq!(
            ShortcutMap::resolve("s", false, false, false, false),
            Some(ShortcutAction::PlaceShape)
        );
    }

    #[test]
    fn resolve_undo_redo() {
        // Cmd+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", false, false, false, true),
            Some(ShortcutAction::Undo)
        );
        // Ctrl+Z → Undo
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        // Cmd+Shift+Z → Redo
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, false, true),
            Some(ShortcutAction::Redo)
        );
        // Ctrl+Y → Redo
        assert_eq!(
            ShortcutMap::resolve("y", true, false, false, false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn resolve_delete_and_escape() {
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }

    #[test]
    fn resolve_arrows() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, false, false, false),
            Some(ShortcutAction::Nudge {
                dx: -1,
                dy: 0,
                large: false
            })
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", false, true, false, false),
            Some(ShortcutAction::Nudge {
                dx: 0,
                dy: 1,
                large: true
            })
        );
        assert_eq!(ShortcutMap::resolve("ArrowUp", true, false, false, false), None);
    }

    #[test]
    fn resolve_z_order_and_grid() {
        assert_eq!(
            ShortcutMap::resolve("[", false, false, false, true),
            Some(ShortcutAction::SendBackward)
        );
        assert_eq!(
            ShortcutMap::resolve("]", false, false, false, true),
            Some(ShortcutAction::BringForward)
        );
        assert_eq!(
            ShortcutMap::resolve("{", false, true, false, true),
            Some(ShortcutAction::SendToBack)
        );
        assert_eq!(
            ShortcutMap::resolve("]", false, true, false, true),
            Some(ShortcutAction::BringToFront)
        );
        assert_eq!(
            ShortcutMap::resolve("'", true, false, false, false),
            Some(ShortcutAction::ToggleGrid)
        );
    }

    #[test]
    fn resolve_unknown_key() {
        assert_eq!(ShortcutMap::resolve("q", false, false, false, false), None);
        assert_eq!(ShortcutMap::resolve("t", false, true, false, false), None);
        assert_eq!(ShortcutMap::resolve("z", false, false, false, false), None);
    }

    #[test]
    fn dispatch_goes_through_history() {
        let clock = ManualClock::new();
        let mut s = EditorSession::with_clock(
            EditorConfig::default(),
            CanvasSize::new(500.0, 500.0),
            clock.clone(),
        );
        let mut staging = StagingElement::new(FieldType::Text);
        staging.geometry = Geometry::new(100.0, 100.0, 50.0, 50.0);
        let id = s.add(&staging, "k", "K");
        clock.advance(1_000.0);

        let nudge = ShortcutMap::resolve("ArrowRight", false, true, false, false);
        assert_eq!(nudge.map(|a| s.apply_shortcut(a)), Some(true));
        assert_eq!(s.field(id).map(|f| f.geometry.x), Some(110.0));

        assert!(s.apply_shortcut(ShortcutAction::Undo));
        assert_eq!(s.field(id).map(|f| f.geometry.x), Some(100.0));

        assert!(s.apply_shortcut(ShortcutAction::Deselect));
        assert_eq!(s.selected(), None);
        assert!(!s.apply_shortcut(ShortcutAction::Deselect));

        assert!(s.apply_shortcut(ShortcutAction::PlaceLogo));
        assert!(s.staging().is_some());
        assert!(s.apply_shortcut(ShortcutAction::Deselect));
        assert_eq!(s.mode(), Mode::Select);
        assert!(s.staging().is_none());

        assert!(s.apply_shortcut(ShortcutAction::ToggleGrid));
        assert!(s.config().show_grid);
    }
}
