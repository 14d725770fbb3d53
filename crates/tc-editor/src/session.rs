//! The editor session: one open template and everything needed to edit it.
//!
//! All editor state lives here and is passed by reference; there is no
//! global "current editor", so any number of sessions can coexist.
//!
//! The field list is held as `Arc<Vec<Field>>` and replaced wholesale on
//! every write. A reader holding the previous `Arc` (a frame in progress, a
//! history entry) never observes a half-applied edit.

use crate::clock::{Clock, SystemClock};
use crate::history::{History, HistoryEntry};
use crate::input::ViewTransform;
use crate::interaction::{Interaction, Mode};
use std::sync::Arc;
use tc_core::{
    AlignmentGuide, CanvasSize, EditorConfig, Field, FieldId, Guides, Placeable, StagingElement,
};
use tc_render::{Frame, HandleMetrics, RenderTheme};

/// Load state of the background image. Only `Ready` draws the image; every
/// other state draws the solid fallback and editing carries on as normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    None,
    Loading,
    Ready,
    Failed,
}

pub struct EditorSession {
    pub(crate) config: EditorConfig,
    pub(crate) canvas: CanvasSize,
    pub(crate) fields: Arc<Vec<Field>>,
    pub(crate) selected: Option<FieldId>,
    pub(crate) staging: Option<StagingElement>,
    pub(crate) guides: Guides,
    pub(crate) mode: Mode,
    /// The single active gesture slot.
    pub(crate) interaction: Interaction,
    /// The active gesture has changed a field.
    pub(crate) gesture_dirty: bool,
    pub(crate) view: ViewTransform,
    pub(crate) history: History,
    background: Background,
    clock: Box<dyn Clock>,
}

impl EditorSession {
    /// An empty session using the native clock.
    pub fn new(config: EditorConfig, canvas: CanvasSize) -> Self {
        Self::with_clock(config, canvas, SystemClock::new())
    }

    /// An empty session with an explicit time source.
    pub fn with_clock(config: EditorConfig, canvas: CanvasSize, clock: impl Clock + 'static) -> Self {
        let fields = Arc::new(Vec::new());
        let history = History::new(
            HistoryEntry {
                fields: Arc::clone(&fields),
                selected: None,
            },
            config.history_depth,
            config.history_debounce_ms,
        );
        Self {
            config,
            canvas,
            fields,
            selected: None,
            staging: None,
            guides: Guides::new(),
            mode: Mode::Select,
            interaction: Interaction::Idle,
            gesture_dirty: false,
            view: ViewTransform::default(),
            history,
            background: Background::None,
            clock: Box::new(clock),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.history
            .set_limits(config.history_depth, config.history_debounce_ms);
        self.config = config;
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Change the intrinsic canvas resolution. Fields keep their positions.
    pub fn resize_canvas(&mut self, canvas: CanvasSize) {
        log::debug!("canvas resized to {}×{}", canvas.width, canvas.height);
        self.canvas = canvas;
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = view;
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// The current field list as a shared snapshot.
    pub fn fields_arc(&self) -> Arc<Vec<Field>> {
        Arc::clone(&self.fields)
    }

    pub fn field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn selected(&self) -> Option<FieldId> {
        self.selected
    }

    pub fn selected_field(&self) -> Option<&Field> {
        self.selected.and_then(|id| self.field(id))
    }

    pub fn staging(&self) -> Option<&StagingElement> {
        self.staging.as_ref()
    }

    pub fn guides(&self) -> &[AlignmentGuide] {
        &self.guides
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_interacting(&self) -> bool {
        self.interaction != Interaction::Idle
    }

    pub fn background(&self) -> Background {
        self.background
    }

    pub fn set_background(&mut self, background: Background) {
        if background == Background::Failed {
            log::warn!("background image failed to load; drawing fallback fill");
        }
        self.background = background;
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    /// Switch between select and placement modes. Entering a placement
    /// mode creates the staging element at the canvas center; leaving one
    /// discards it. Any active gesture ends first.
    pub fn set_mode(&mut self, mode: Mode) {
        self.end_interaction();
        self.staging = match mode {
            Mode::Select => None,
            Mode::Place(placement) => {
                let mut staging = placement.staging();
                staging.center_on(self.canvas.center());
                Some(staging)
            }
        };
        if self.mode != mode {
            log::debug!("mode {:?} → {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Restore the previous history entry. No-op at the oldest entry.
    pub fn undo(&mut self) -> bool {
        self.end_interaction();
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(entry);
        true
    }

    /// Restore the next history entry. No-op at the newest entry.
    pub fn redo(&mut self) -> bool {
        self.end_interaction();
        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(entry);
        true
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.fields = entry.fields;
        self.selected = entry
            .selected
            .filter(|id| self.fields.iter().any(|f| f.id == *id));
        self.guides.clear();
    }

    /// Record the current state in history.
    pub(crate) fn snapshot(&mut self) {
        let entry = HistoryEntry {
            fields: Arc::clone(&self.fields),
            selected: self.selected,
        };
        let now = self.clock.now_ms();
        self.history.snapshot(entry, now);
    }

    /// Replace the field list wholesale and snapshot it.
    pub(crate) fn commit(&mut self, fields: Vec<Field>) {
        self.fields = Arc::new(fields);
        self.snapshot();
    }

    /// Drop history and start over from the current state.
    pub(crate) fn reset_history(&mut self) {
        self.history.reset(HistoryEntry {
            fields: Arc::clone(&self.fields),
            selected: self.selected,
        });
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Everything `render_frame` needs for the current state. `image` is
    /// drawn only while the background is `Ready`.
    pub fn frame<'a, I>(&'a self, theme: &'a RenderTheme, image: Option<&'a I>) -> Frame<'a, I> {
        Frame {
            canvas: self.canvas,
            fields: &self.fields,
            staging: self.staging.as_ref().map(|s| s as &dyn Placeable),
            selected: self.selected,
            guides: &self.guides,
            background: image.filter(|_| self.background == Background::Ready),
            show_grid: self.config.show_grid,
            grid_size: self.config.grid_size,
            show_center_guides: self.config.show_center_guides,
            staging_opacity: self.config.staging_opacity,
            handles: self.handle_metrics(),
            theme,
        }
    }

    /// Handle sizes in canvas pixels at the current display scale.
    pub fn handle_metrics(&self) -> HandleMetrics {
        HandleMetrics::scaled(
            self.config.handle_size,
            self.config.rotate_handle_offset,
            self.view.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::interaction::Placement;
    use tc_core::{FieldType, ShapeKind};
    use tc_render::render_frame;
    use tc_render::testing::{Op, RecordingSurface};

    fn session() -> EditorSession {
        EditorSession::with_clock(
            EditorConfig::default(),
            CanvasSize::new(1000.0, 1000.0),
            ManualClock::new(),
        )
    }

    #[test]
    fn starts_empty() {
        let s = session();
        assert!(s.fields().is_empty());
        assert_eq!(s.selected(), None);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
        assert!(!s.is_interacting());
        assert_eq!(s.mode(), Mode::Select);
    }

    #[test]
    fn placement_mode_owns_staging() {
        let mut s = session();
        s.set_mode(Mode::Place(Placement::Shape(ShapeKind::Ellipse)));
        let staging = s.staging().cloned();
        assert!(staging.is_some());
        assert_eq!(
            staging.map(|st| st.geometry.center()),
            Some(s.canvas().center())
        );
        s.set_mode(Mode::Select);
        assert!(s.staging().is_none());
    }

    #[test]
    fn background_image_only_when_ready() {
        let mut s = session();
        let theme = RenderTheme::light();
        let image = 3u32;
        for state in [Background::None, Background::Loading, Background::Failed] {
            s.set_background(state);
            assert!(s.frame(&theme, Some(&image)).background.is_none());
        }
        s.set_background(Background::Ready);
        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &s.frame(&theme, Some(&image)));
        assert!(surface.ops.contains(&Op::Image(3)));
    }

    #[test]
    fn handle_metrics_follow_view_scale() {
        let mut s = session();
        s.set_view(ViewTransform::new(0.0, 0.0, 0.25));
        assert_eq!(s.handle_metrics().size, 40.0);
        s.set_mode(Mode::Place(Placement::Field(FieldType::Text)));
        assert!(s.frame::<u32>(&RenderTheme::dark(), None).staging.is_some());
    }
}
