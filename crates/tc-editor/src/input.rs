//! Pointer input and client → canvas coordinate mapping.
//!
//! The canvas is usually shown smaller than its intrinsic resolution. Hosts
//! report raw client coordinates plus where the canvas sits on screen and
//! at what scale; everything past this module works in canvas pixels.

use kurbo::Point;

/// A pointer event position in client (page/viewport) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerInput {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Placement of the canvas on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Client position of the canvas's top-left corner.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Screen pixels per canvas pixel.
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn new(origin_x: f64, origin_y: f64, scale: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            scale,
        }
    }

    /// Map a client position into canvas space.
    pub fn to_canvas(&self, input: PointerInput) -> Point {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Point::new(
            (input.client_x - self.origin_x) / scale,
            (input.client_y - self.origin_y) / scale,
        )
    }

    /// Map a canvas position back to client space.
    pub fn to_client(&self, p: Point) -> PointerInput {
        PointerInput::new(
            p.x * self.scale + self.origin_x,
            p.y * self.scale + self.origin_y,
        )
    }
}

/// What a pointer handler did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerResponse {
    /// Editor state changed and the host should redraw.
    pub redraw: bool,
    /// A plain click on empty canvas, in canvas pixels. Hosts forward this
    /// to whatever wants canvas clicks.
    pub canvas_click: Option<Point>,
}

impl PointerResponse {
    pub const NONE: Self = Self {
        redraw: false,
        canvas_click: None,
    };

    pub const REDRAW: Self = Self {
        redraw: true,
        canvas_click: None,
    };
}
