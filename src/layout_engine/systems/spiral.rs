use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::layout_engine::utils::split_area_half_weighted;
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

/// Each tile takes half of what is left, turning clockwise: left, top,
/// right, bottom. The last tile keeps the remainder.
#[derive(Debug, Clone, Default)]
pub struct SpiralLayoutSystem;

impl LayoutSystem for SpiralLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Spiral }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        let n = tiles.len();
        let mut rest = area;
        for (i, tile) in tiles.iter_mut().enumerate() {
            tile.set_state(WindowState::Tiled);
            if i + 1 == n {
                tile.geometry = rest;
                break;
            }
            let (first, second) = split_area_half_weighted(rest, 0.5, gap, i % 2 == 0);
            let (own, next) = if i % 4 < 2 { (first, second) } else { (second, first) };
            tile.geometry = own;
            rest = next;
        }
    }
}
