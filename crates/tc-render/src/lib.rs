pub mod frame;
pub mod hit;
pub mod surface;
pub mod testing;
pub mod vello_surface;

pub use frame::{Frame, RenderTheme, render_frame};
pub use hit::{Handle, HandleMetrics, ResizeHandle, hit_test, hit_test_handle};
pub use surface::{StrokeStyle, Surface, TextRun};
pub use vello_surface::VelloSurface;
