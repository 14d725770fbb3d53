pub mod align;
pub mod config;
pub mod defaults;
pub mod geometry;
pub mod id;
pub mod model;

pub use align::{AlignMode, Axis, Move, align, distribute};
pub use config::EditorConfig;
pub use defaults::{create_field, default_size};
pub use geometry::{Guides, alignment_guides, snap_to_grid};
pub use id::FieldId;
pub use model::*;

// Re-export kurbo geometry so downstream crates agree on one version.
pub use kurbo::{Point, Rect, Vec2};
