pub mod clock;
pub mod fields;
pub mod history;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fields::LayerMove;
pub use history::{History, HistoryEntry};
pub use input::{PointerInput, PointerResponse, ViewTransform};
pub use interaction::{Interaction, Mode, Placement, resize_geometry};
pub use session::{Background, EditorSession};
pub use shortcuts::{ShortcutAction, ShortcutMap};
