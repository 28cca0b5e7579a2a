use std::ops::Range;

use crate::layout_engine::systems::{
    LayoutContext, LayoutKind, LayoutRequest, LayoutSystem, store_weights, weights_of,
};
use crate::layout_engine::utils::{adjust_area_weights, clip, slide, split_area_weighted};
use crate::layout_engine::{LayoutCommand, RectDelta};
use crate::model::{Window, WindowId, WindowState};
use crate::sys::geometry::Rect;

const MIN_MASTER_RATIO: f64 = 0.2;
const MAX_MASTER_RATIO: f64 = 0.8;
const MAX_MASTERS: usize = 10;
const RATIO_STEP: f64 = 0.05;

/// Masters in a centre column with a stack on either side. Two windows
/// split master/stack, a single one fills the area.
#[derive(Debug, Clone)]
pub struct ThreeColumnLayoutSystem {
    master_ratio: f64,
    master_size: usize,
}

impl Default for ThreeColumnLayoutSystem {
    fn default() -> Self { Self { master_ratio: 0.6, master_size: 1 } }
}

impl ThreeColumnLayoutSystem {
    pub fn master_ratio(&self) -> f64 { self.master_ratio }

    pub fn master_size(&self) -> usize { self.master_size }

    /// Tile ranges and the column each range fills. Tiles are ordered
    /// masters first, then the right stack, then the left stack.
    fn columns(&self, area: Rect, n: usize, gap: i32) -> Vec<(Range<usize>, Rect)> {
        let masters = self.master_size.min(n);
        if n <= self.master_size {
            return vec![(0..n, area)];
        }
        if n == self.master_size + 1 {
            let ratio = self.master_ratio;
            let halves = split_area_weighted(area, &[ratio, 1.0 - ratio], gap, true);
            return vec![(0..masters, halves[0]), (masters..n, halves[1])];
        }
        let side = (1.0 - self.master_ratio) / 2.0;
        let thirds = split_area_weighted(area, &[side, self.master_ratio, side], gap, true);
        let right = (n - masters) / 2;
        vec![
            (0..masters, thirds[1]),
            (masters..masters + right, thirds[2]),
            (masters + right..n, thirds[0]),
        ]
    }

    fn step_ratio(&mut self, step: f64) {
        self.master_ratio = clip(slide(self.master_ratio, step), MIN_MASTER_RATIO, MAX_MASTER_RATIO);
    }
}

impl LayoutSystem for ThreeColumnLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::ThreeColumn }

    fn description(&self) -> String { format!("Three [{}]", self.master_size) }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        let weights = weights_of(tiles);
        for (range, column) in self.columns(area, tiles.len(), gap) {
            let rects = split_area_weighted(column, &weights[range.clone()], gap, false);
            for (tile, rect) in tiles[range].iter_mut().zip(rects) {
                tile.set_state(WindowState::Tiled);
                tile.geometry = rect;
            }
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
        let n = tiles.len();
        let columns = self.columns(area, n, gap);
        let Some((range, column)) = columns.iter().find(|(range, _)| range.contains(&idx)) else {
            return;
        };

        let mut weights = weights_of(tiles);
        let len = range.len();
        let adjusted =
            adjust_area_weights(*column, &weights[range.clone()], gap, idx - range.start, delta, false);
        for (weight, new) in weights[range.clone()].iter_mut().zip(adjusted) {
            *weight = new * len as f64;
        }
        store_weights(tiles, &weights);

        if columns.len() == 1 || area.width <= 0 {
            return;
        }
        let width = f64::from(area.width);
        let grow = if range.start == 0 {
            // The centre column grows on both sides, a lone master only east.
            if columns.len() == 3 { delta.east + delta.west } else { delta.east }
        } else if columns.len() == 3 {
            -(delta.east + delta.west)
        } else {
            -delta.west
        };
        self.master_ratio =
            clip(self.master_ratio + f64::from(grow) / width, MIN_MASTER_RATIO, MAX_MASTER_RATIO);
    }

    fn handle_shortcut(&mut self, ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::DwmLeft => self.step_ratio(-RATIO_STEP),
            LayoutCommand::DwmRight => self.step_ratio(RATIO_STEP),
            LayoutCommand::Increase => {
                if self.master_size < MAX_MASTERS {
                    self.master_size += 1;
                }
                ctx.requests.push(LayoutRequest::Notify(self.description()));
            }
            LayoutCommand::Decrease => {
                if self.master_size > 1 {
                    self.master_size -= 1;
                }
                ctx.requests.push(LayoutRequest::Notify(self.description()));
            }
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    const AREA: Rect = Rect::new(0, 0, 1000, 600);

    fn run(layout: &mut ThreeColumnLayoutSystem, windows: &mut [Window]) {
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(windows), AREA, 0);
    }

    #[test]
    fn column_count_follows_window_count() {
        let mut layout = ThreeColumnLayoutSystem::default();

        let mut ws = windows(1);
        run(&mut layout, &mut ws);
        assert_eq!(geometries(&ws), vec![AREA]);

        let mut ws = windows(2);
        run(&mut layout, &mut ws);
        assert_eq!(geometries(&ws), vec![Rect::new(0, 0, 600, 600), Rect::new(600, 0, 400, 600)]);

        let mut ws = windows(4);
        run(&mut layout, &mut ws);
        assert_eq!(
            geometries(&ws),
            vec![
                Rect::new(200, 0, 600, 600),
                Rect::new(800, 0, 200, 600),
                Rect::new(0, 0, 200, 300),
                Rect::new(0, 300, 200, 300),
            ]
        );
    }

    #[test]
    fn master_count_and_ratio_shortcuts() {
        let mut layout = ThreeColumnLayoutSystem::default();
        let mut ctx = LayoutContext::default();
        assert!(layout.handle_shortcut(&mut ctx, &LayoutCommand::Decrease));
        assert_eq!(layout.master_size(), 1);
        layout.handle_shortcut(&mut ctx, &LayoutCommand::Increase);
        assert_eq!(layout.master_size(), 2);
        assert_eq!(ctx.requests.last(), Some(&LayoutRequest::Notify("Three [2]".into())));

        for _ in 0..10 {
            layout.handle_shortcut(&mut ctx, &LayoutCommand::DwmRight);
        }
        assert!((layout.master_ratio() - MAX_MASTER_RATIO).abs() < 1e-9);
        assert!(!layout.handle_shortcut(&mut ctx, &LayoutCommand::Rotate));
    }

    #[test]
    fn dragging_the_centre_column_widens_it() {
        let mut layout = ThreeColumnLayoutSystem::default();
        let mut ws = windows(3);
        run(&mut layout, &mut ws);
        let mut tiles = refs(&mut ws);
        layout.adjust(AREA, &mut tiles, id(1), RectDelta::new(50, 50, 0, 0), 0);
        assert!((layout.master_ratio() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn stack_tiles_reweight_inside_their_column() {
        let mut layout = ThreeColumnLayoutSystem::default();
        let mut ws = windows(5);
        run(&mut layout, &mut ws);
        let mut tiles = refs(&mut ws);
        layout.adjust(AREA, &mut tiles, id(2), RectDelta::new(0, 0, 60, 0), 0);
        assert!((ws[1].weight - 1.2).abs() < 1e-9);
        assert!((ws[2].weight - 0.8).abs() < 1e-9);
        assert!((layout.master_ratio() - 0.6).abs() < 1e-9);
    }
}
