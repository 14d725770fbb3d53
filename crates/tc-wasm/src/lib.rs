//! WASM bridge for TC: exposes the template editor to the dashboard.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the `<canvas>`
//! element, the background `<img>`, and persistence; this crate owns every
//! editing decision and draws each frame through `Canvas2dSurface`.

mod canvas2d;

use canvas2d::Canvas2dSurface;
use tc_core::model::{CanvasSize, FieldPatch, fields_from_json, fields_to_json};
use tc_core::{AlignMode, Axis, EditorConfig, FieldId};
use tc_editor::clock::Clock;
use tc_editor::{
    Background, EditorSession, LayerMove, Mode, PointerInput, PointerResponse, ShortcutAction,
    ShortcutMap, ViewTransform,
};
use tc_render::{RenderTheme, render_frame};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// The main WASM-facing editor controller.
///
/// One instance per open template. All interaction from the page goes
/// through this struct; fields travel in and out as JSON.
#[wasm_bindgen]
pub struct TemplateCanvas {
    session: EditorSession,
    /// Decoded background, held until the session reports `Ready`.
    background: Option<HtmlImageElement>,
    /// `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl TemplateCanvas {
    /// Create an editor for a `width` × `height` canvas. `config_json` may be
    /// empty; unknown or missing keys take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: &str) -> Self {
        console_setup();

        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            EditorConfig::from_json(config_json).unwrap_or_else(|err| {
                log::warn!("{err}; using default editor config");
                EditorConfig::default()
            })
        };
        let session = EditorSession::with_clock(config, CanvasSize::new(width, height), JsClock);

        Self {
            session,
            background: None,
            dark_mode: false,
        }
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the document with a JSON field list. Returns `false` (and
    /// keeps the current document) when the list is invalid.
    pub fn load_fields_json(&mut self, json: &str) -> bool {
        let loaded = fields_from_json(json).and_then(|fields| self.session.set_fields(fields));
        match loaded {
            Ok(()) => true,
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// The current field list, for persistence.
    pub fn get_fields_json(&self) -> String {
        fields_to_json(self.session.fields()).unwrap_or_else(|_| "[]".to_string())
    }

    /// The selected field as JSON, or `null`.
    pub fn get_selected_json(&self) -> String {
        self.session
            .selected_field()
            .and_then(|f| serde_json::to_string(f).ok())
            .unwrap_or_else(|| "null".to_string())
    }

    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Select a field by id; an empty id clears the selection.
    pub fn select_by_id(&mut self, id: &str) -> bool {
        if id.is_empty() {
            return self.session.select(None);
        }
        match FieldId::lookup(id) {
            Some(id) => self.session.select(Some(id)),
            None => false,
        }
    }

    pub fn set_config_json(&mut self, json: &str) -> bool {
        match EditorConfig::from_json(json) {
            Ok(config) => {
                self.session.set_config(config);
                true
            }
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// Change the intrinsic canvas resolution.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize_canvas(CanvasSize::new(width, height));
    }

    /// Where the canvas sits on the page and how much it is scaled down.
    pub fn set_view(&mut self, origin_x: f64, origin_y: f64, scale: f64) {
        self.session
            .set_view(ViewTransform::new(origin_x, origin_y, scale));
    }

    // ─── Pointer ─────────────────────────────────────────────────────────

    /// Returns `{"redraw":bool,"canvasClick":null|{"x":..,"y":..}}`.
    pub fn handle_pointer_down(&mut self, client_x: f64, client_y: f64) -> String {
        let response = self
            .session
            .pointer_down(PointerInput::new(client_x, client_y));
        response_json(response)
    }

    /// Returns true if the page should redraw.
    pub fn handle_pointer_move(&mut self, client_x: f64, client_y: f64) -> bool {
        self.session
            .pointer_move(PointerInput::new(client_x, client_y))
            .redraw
    }

    pub fn handle_pointer_up(&mut self, client_x: f64, client_y: f64) -> bool {
        self.session
            .pointer_up(PointerInput::new(client_x, client_y))
            .redraw
    }

    pub fn handle_pointer_leave(&mut self) -> bool {
        self.session.pointer_leave().redraw
    }

    /// CSS cursor for the pointer at a client position.
    pub fn cursor_at(&self, client_x: f64, client_y: f64) -> String {
        let p = self
            .session
            .view()
            .to_canvas(PointerInput::new(client_x, client_y));
        self.session.cursor_at(p).to_string()
    }

    // ─── Modes ───────────────────────────────────────────────────────────

    /// Switch mode by name: `select`, `place-text`, `place-ellipse`, …
    pub fn set_mode(&mut self, name: &str) -> bool {
        match Mode::parse(name) {
            Some(mode) => {
                self.session.set_mode(mode);
                true
            }
            None => {
                log::warn!("unknown mode {name:?}");
                false
            }
        }
    }

    pub fn get_mode(&self) -> String {
        self.session.mode().name()
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    // ─── Field management ────────────────────────────────────────────────

    /// Merge a partial JSON object (property-panel keys) into a field.
    pub fn update_field_json(&mut self, id: &str, json: &str) -> bool {
        let Some(field) = FieldId::lookup(id).and_then(|id| self.session.field(id)) else {
            log::debug!("update_field_json: no field {id}");
            return false;
        };
        let target = field.id;
        let merged = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json)
            .map_err(|e| format!("invalid field patch: {e}"))
            .and_then(|patch| field.merged_with_json(&patch));
        match merged {
            Ok(updated) => self.session.update(target, &FieldPatch::replace_with(&updated)),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    pub fn delete_field(&mut self, id: &str) -> bool {
        FieldId::lookup(id).is_some_and(|id| self.session.delete(id))
    }

    /// Returns the new field's id, or an empty string.
    pub fn duplicate_field(&mut self, id: &str) -> String {
        FieldId::lookup(id)
            .and_then(|id| self.session.duplicate(id))
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// `direction`: `up`, `down`, `top`, `bottom`.
    pub fn move_layer(&mut self, id: &str, direction: &str) -> bool {
        match LayerMove::parse(direction) {
            Some(to) => FieldId::lookup(id).is_some_and(|id| self.session.move_layer(id, to)),
            None => {
                log::warn!("unknown layer move {direction:?}");
                false
            }
        }
    }

    pub fn toggle_visibility(&mut self, id: &str) -> bool {
        FieldId::lookup(id).is_some_and(|id| self.session.toggle_visibility(id))
    }

    /// `ids_json` is a JSON array of field ids; `mode` is `left`, `center-h`, …
    pub fn align(&mut self, ids_json: &str, mode: &str) -> bool {
        let Some(mode) = AlignMode::parse(mode) else {
            log::warn!("unknown align mode {mode:?}");
            return false;
        };
        match parse_ids(ids_json) {
            Ok(ids) => self.session.align(&ids, mode),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    /// `axis` is `horizontal` or `vertical`.
    pub fn distribute(&mut self, ids_json: &str, axis: &str) -> bool {
        let Some(axis) = Axis::parse(axis) else {
            log::warn!("unknown axis {axis:?}");
            return false;
        };
        match parse_ids(ids_json) {
            Ok(ids) => self.session.distribute(&ids, axis),
            Err(err) => {
                log::warn!("{err}");
                false
            }
        }
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool,"action":"<action_name>","mode":"<mode_name>"}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return serde_json::json!({
                "changed": false,
                "action": "none",
                "mode": self.session.mode().name(),
            })
            .to_string();
        };
        let changed = self.session.apply_shortcut(action);
        serde_json::json!({
            "changed": changed,
            "action": action_to_name(action),
            "mode": self.session.mode().name(),
        })
        .to_string()
    }

    // ─── Background ──────────────────────────────────────────────────────

    pub fn set_background_loading(&mut self) {
        self.background = None;
        self.session.set_background(Background::Loading);
    }

    /// Hand over the decoded background image.
    pub fn set_background_ready(&mut self, image: HtmlImageElement) {
        self.background = Some(image);
        self.session.set_background(Background::Ready);
    }

    pub fn set_background_failed(&mut self) {
        self.background = None;
        self.session.set_background(Background::Failed);
    }

    pub fn clear_background(&mut self) {
        self.background = None;
        self.session.set_background(Background::None);
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Set the canvas theme.
    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Draw the current frame.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            RenderTheme::dark()
        } else {
            RenderTheme::light()
        };
        let frame = self.session.frame(&theme, self.background.as_ref());
        let mut surface = Canvas2dSurface::new(ctx);
        render_frame(&mut surface, &frame);
    }

    /// The canvas contents as a PNG data URL, or an empty string.
    pub fn export_png(&self, canvas: &HtmlCanvasElement) -> String {
        canvas
            .to_data_url_with_type("image/png")
            .unwrap_or_else(|err| {
                log::warn!("export failed: {err:?}");
                String::new()
            })
    }
}

/// Wall-clock time from the browser.
struct JsClock;

impl Clock for JsClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Ids never seen by this process cannot name a field and are dropped.
fn parse_ids(json: &str) -> Result<Vec<FieldId>, String> {
    let ids: Vec<String> =
        serde_json::from_str(json).map_err(|e| format!("invalid id list: {e}"))?;
    Ok(ids.iter().filter_map(|id| FieldId::lookup(id)).collect())
}

fn response_json(response: PointerResponse) -> String {
    let click = match response.canvas_click {
        Some(p) => serde_json::json!({ "x": p.x, "y": p.y }),
        None => serde_json::Value::Null,
    };
    serde_json::json!({ "redraw": response.redraw, "canvasClick": click }).to_string()
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ModeSelect => "modeSelect",
        ShortcutAction::PlaceText => "placeText",
        ShortcutAction::PlaceImage => "placeImage",
        ShortcutAction::PlaceLogo => "placeLogo",
        ShortcutAction::PlaceShape => "placeShape",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Deselect => "deselect",
        ShortcutAction::Nudge { .. } => "nudge",
        ShortcutAction::SendBackward => "sendBackward",
        ShortcutAction::BringForward => "bringForward",
        ShortcutAction::SendToBack => "sendToBack",
        ShortcutAction::BringToFront => "bringToFront",
        ShortcutAction::ToggleGrid => "toggleGrid",
    }
}

// ─── Console ─────────────────────────────────────────────────────────────

/// Routes `log` records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from(format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            log::Level::Info => web_sys::console::info_1(&msg),
            log::Level::Debug | log::Level::Trace => web_sys::console::debug_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static LOGGER: ConsoleLogger = ConsoleLogger;
        static SETUP: Once = Once::new();
        SETUP.call_once(|| {
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("TC WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
