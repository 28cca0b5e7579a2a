use crate::common::config::LayoutSettings;
use crate::layout_engine::RectDelta;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::layout_engine::utils::clip;
use crate::model::{Window, WindowId, WindowState};
use crate::sys::geometry::Rect;

const MIN_PROPORTION: f64 = 0.2;
const MAX_PROPORTION: f64 = 0.8;
const CAPACITY: usize = 4;

/// Up to four windows in quadrants. Slots go top-left, top-right,
/// bottom-right, bottom-left.
#[derive(Debug, Clone)]
pub struct QuarterLayoutSystem {
    /// Width share of the left column.
    vsplit: f64,
    /// Height share of the top-left quadrant.
    lhsplit: f64,
    /// Height share of the top-right quadrant.
    rhsplit: f64,
    prev_tile_count: usize,
    reset_on_shrink: bool,
}

impl QuarterLayoutSystem {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            vsplit: 0.5,
            lhsplit: 0.5,
            rhsplit: 0.5,
            prev_tile_count: 0,
            reset_on_shrink: settings.quarter_layout_reset,
        }
    }

    pub fn splits(&self) -> (f64, f64, f64) { (self.vsplit, self.lhsplit, self.rhsplit) }

    fn reset_splits(&mut self) {
        self.vsplit = 0.5;
        self.lhsplit = 0.5;
        self.rhsplit = 0.5;
    }

    fn clamp_splits(&mut self) {
        self.vsplit = clip(self.vsplit, MIN_PROPORTION, MAX_PROPORTION);
        self.lhsplit = clip(self.lhsplit, MIN_PROPORTION, MAX_PROPORTION);
        self.rhsplit = clip(self.rhsplit, MIN_PROPORTION, MAX_PROPORTION);
    }

    fn quadrants(&self, area: Rect, count: usize, gap: i32) -> Vec<Rect> {
        if count <= 1 {
            return vec![area; count];
        }
        let gap1 = gap / 2;
        let gap2 = gap - gap1;

        let left_width = (f64::from(area.width) * self.vsplit).floor() as i32;
        let right_width = area.width - left_width;
        let right_x = area.x + left_width;
        if count == 2 {
            return vec![
                Rect::new(area.x, area.y, left_width, area.height).gap(0, gap1, 0, 0),
                Rect::new(right_x, area.y, right_width, area.height).gap(gap2, 0, 0, 0),
            ];
        }

        let right_top_height = (f64::from(area.height) * self.rhsplit).floor() as i32;
        let right_bottom_height = area.height - right_top_height;
        let right_bottom_y = area.y + right_top_height;
        let top_right = Rect::new(right_x, area.y, right_width, right_top_height)
            .gap(gap2, 0, 0, gap1);
        let bottom_right = Rect::new(right_x, right_bottom_y, right_width, right_bottom_height)
            .gap(gap2, 0, gap2, 0);
        if count == 3 {
            return vec![
                Rect::new(area.x, area.y, left_width, area.height).gap(0, gap1, 0, 0),
                top_right,
                bottom_right,
            ];
        }

        let left_top_height = (f64::from(area.height) * self.lhsplit).floor() as i32;
        let left_bottom_height = area.height - left_top_height;
        let left_bottom_y = area.y + left_top_height;
        vec![
            Rect::new(area.x, area.y, left_width, left_top_height).gap(0, gap1, 0, gap1),
            top_right,
            bottom_right,
            Rect::new(area.x, left_bottom_y, left_width, left_bottom_height).gap(0, gap2, gap2, 0),
        ]
    }
}

impl LayoutSystem for QuarterLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Quarter }

    fn capacity(&self) -> Option<usize> { Some(CAPACITY) }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        let count = tiles.len();
        if self.reset_on_shrink && count < self.prev_tile_count {
            self.reset_splits();
        }
        self.prev_tile_count = count;

        let placed = count.min(CAPACITY);
        let rects = self.quadrants(area, placed, gap);
        for (i, tile) in tiles.iter_mut().enumerate() {
            match rects.get(i) {
                Some(&rect) => {
                    tile.set_state(WindowState::Tiled);
                    tile.geometry = rect;
                }
                None => tile.set_state(WindowState::TiledAfloat),
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
        _gap: i32,
    ) {
        let count = tiles.len();
        if !(2..=CAPACITY).contains(&count) {
            return;
        }
        let Some(idx) = tiles.iter().position(|t| t.id == basis) else { return };
        let width = f64::from(area.width.max(1));
        let height = f64::from(area.height.max(1));

        if (idx == 0 || idx == 3) && delta.east != 0 {
            self.vsplit += f64::from(delta.east) / width;
        } else if (idx == 1 || idx == 2) && delta.west != 0 {
            self.vsplit -= f64::from(delta.west) / width;
        }

        if count == 4 {
            if idx == 0 && delta.south != 0 {
                self.lhsplit += f64::from(delta.south) / height;
            }
            if idx == 3 && delta.north != 0 {
                self.lhsplit -= f64::from(delta.north) / height;
            }
        }

        if count >= 3 {
            if idx == 1 && delta.south != 0 {
                self.rhsplit += f64::from(delta.south) / height;
            }
            if idx == 2 && delta.north != 0 {
                self.rhsplit -= f64::from(delta.north) / height;
            }
        }

        self.clamp_splits();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    const AREA: Rect = Rect::new(0, 0, 1000, 800);

    fn layout() -> QuarterLayoutSystem { QuarterLayoutSystem::new(&LayoutSettings::default()) }

    fn run(layout: &mut QuarterLayoutSystem, windows: &mut [Window]) {
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(windows), AREA, 0);
    }

    #[test]
    fn four_quadrants_in_slot_order() {
        let mut layout = layout();
        let mut ws = windows(4);
        run(&mut layout, &mut ws);
        assert_eq!(
            geometries(&ws),
            vec![
                Rect::new(0, 0, 500, 400),
                Rect::new(500, 0, 500, 400),
                Rect::new(500, 400, 500, 400),
                Rect::new(0, 400, 500, 400),
            ]
        );
    }

    #[test]
    fn gap_is_split_between_neighbours() {
        let mut layout = layout();
        let mut ws = windows(2);
        let mut ctx = LayoutContext::default();
        layout.apply(&mut ctx, &mut refs(&mut ws), AREA, 11);
        assert_eq!(ws[0].geometry, Rect::new(0, 0, 495, 800));
        assert_eq!(ws[1].geometry, Rect::new(506, 0, 494, 800));
    }

    #[test]
    fn fifth_window_overflows() {
        let mut layout = layout();
        let mut ws = windows(5);
        run(&mut layout, &mut ws);
        assert_eq!(ws[4].state(), WindowState::TiledAfloat);
        assert!(ws[..4].iter().all(|w| w.state() == WindowState::Tiled));
    }

    #[test]
    fn closing_a_window_resets_splits() {
        let mut layout = layout();
        let mut ws = windows(4);
        run(&mut layout, &mut ws);
        {
            let mut tiles = refs(&mut ws);
            layout.adjust(AREA, &mut tiles, id(1), RectDelta::new(100, 0, 80, 0), 0);
            layout.adjust(AREA, &mut tiles, id(2), RectDelta::new(0, 0, 160, 0), 0);
        }
        assert_eq!(layout.splits(), (0.6, 0.6, 0.7));

        // Growing keeps the ratios.
        run(&mut layout, &mut ws);
        assert_eq!(layout.splits(), (0.6, 0.6, 0.7));

        run(&mut layout, &mut ws[..3]);
        assert_eq!(layout.splits(), (0.5, 0.5, 0.5));
        run(&mut layout, &mut ws);
        assert_eq!(ws[0].geometry, Rect::new(0, 0, 500, 400));
    }

    #[test]
    fn splits_are_clamped() {
        let mut layout = layout();
        let mut ws = windows(2);
        let mut tiles = refs(&mut ws);
        layout.adjust(AREA, &mut tiles, id(2), RectDelta::new(0, 5000, 0, 0), 0);
        assert_eq!(layout.splits().0, MIN_PROPORTION);
    }
}
