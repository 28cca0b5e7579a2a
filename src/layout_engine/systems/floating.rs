use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

/// Leaves every window where the user put it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatingLayoutSystem;

impl LayoutSystem for FloatingLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Floating }

    fn apply(&mut self, _: &mut LayoutContext, tiles: &mut [&mut Window], _: Rect, _: i32) {
        for tile in tiles.iter_mut() {
            tile.set_state(WindowState::TiledAfloat);
        }
    }
}
