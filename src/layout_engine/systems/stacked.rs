use crate::layout_engine::parts::{FillPart, HalfSplitPart, LayoutPart, RotatePart};
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::layout_engine::{LayoutCommand, RectDelta, WindRose};
use crate::model::{Window, WindowId, WindowState};
use crate::sys::geometry::Rect;

/// The area is halved and each half holds an overlapping pile of windows.
#[derive(Debug, Clone)]
pub struct StackedLayoutSystem {
    parts: RotatePart<HalfSplitPart<FillPart, FillPart>>,
}

impl Default for StackedLayoutSystem {
    fn default() -> Self {
        let mut halves = HalfSplitPart::new(FillPart, FillPart);
        halves.angle = WindRose::East;
        Self { parts: RotatePart::new(halves) }
    }
}

impl StackedLayoutSystem {
    fn resize_piles(&mut self, count: usize) {
        self.parts.inner.primary_size = count.div_ceil(2).max(1);
    }
}

impl LayoutSystem for StackedLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Stacked }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        self.resize_piles(tiles.len());
        let rects = self.parts.apply(area, &vec![1.0; tiles.len()], gap);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.set_state(WindowState::Tiled);
            tile.geometry = rect;
        }
    }

    fn supports_adjust(&self) -> bool { true }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [&mut Window],
        basis: WindowId,
        delta: RectDelta,
        gap: i32,
    ) {
        let Some(idx) = tiles.iter().position(|t| t.id == basis) else { return };
        self.resize_piles(tiles.len());
        let mut weights = vec![1.0; tiles.len()];
        self.parts.adjust(area, &mut weights, idx, delta, gap);
    }

    fn handle_shortcut(&mut self, _ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::Rotate => {
                self.parts.rotate_cw();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    const AREA: Rect = Rect::new(0, 0, 1000, 800);

    #[test]
    fn halves_hold_overlapping_piles() {
        let mut layout = StackedLayoutSystem::default();
        let mut ws = windows(5);
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(&mut ws), AREA, 0);
        let top = Rect::new(0, 0, 1000, 400);
        let bottom = Rect::new(0, 400, 1000, 400);
        assert_eq!(geometries(&ws), vec![top, top, top, bottom, bottom]);
    }

    #[test]
    fn single_window_fills_the_area() {
        let mut layout = StackedLayoutSystem::default();
        let mut ws = windows(1);
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(&mut ws), AREA, 0);
        assert_eq!(ws[0].geometry, AREA);
    }

    #[test]
    fn rotate_turns_the_split() {
        let mut layout = StackedLayoutSystem::default();
        let mut ctx = LayoutContext::default();
        assert!(layout.handle_shortcut(&mut ctx, &LayoutCommand::Rotate));
        let mut ws = windows(2);
        layout.apply(&mut ctx, &mut refs(&mut ws), AREA, 0);
        assert_eq!(
            geometries(&ws),
            vec![Rect::new(0, 0, 500, 800), Rect::new(500, 0, 500, 800)]
        );
    }
}
