pub mod engine;
pub mod gaps;
pub(crate) mod graph;
pub mod parts;
pub mod resize;
pub mod systems;
pub mod utils;
mod workspaces;

pub use engine::{LayoutCommand, TilingEngine};
pub use gaps::{Gaps, GapsStore};
pub use graph::{Direction, Orientation, WindRose};
pub use resize::{RectDelta, ResizeEdge};
pub use systems::{LayoutContext, LayoutKind, LayoutRequest, LayoutSystem, LayoutSystemKind};
pub use workspaces::{LayoutStore, LayoutStoreEntry};
