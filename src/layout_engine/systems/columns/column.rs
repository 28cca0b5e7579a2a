use crate::common::collections::HashSet;
use crate::layout_engine::parts::{LayoutPart, RotatePart, StackPart};
use crate::layout_engine::systems::{store_weights, weights_of};
use crate::layout_engine::{RectDelta, WindRose};
use crate::model::{Window, WindowId};
use crate::sys::geometry::Rect;

/// One column of the columns layout: a weighted stack of windows.
#[derive(Debug, Clone)]
pub(super) struct Column {
    /// Members, including windows that are currently floating or minimized.
    pub window_ids: HashSet<WindowId>,
    pub rendered_ids: Vec<WindowId>,
    pub rendered_rects: Vec<Rect>,
    pub weight: f64,
    parts: RotatePart<StackPart>,
}

impl Column {
    pub fn new(horizontal: bool) -> Self {
        let mut column = Self {
            window_ids: HashSet::default(),
            rendered_ids: Vec::new(),
            rendered_rects: Vec::new(),
            weight: 1.0,
            parts: RotatePart::new(StackPart),
        };
        column.set_horizontal(horizontal);
        column
    }

    /// Horizontal columns lay their windows out left to right.
    pub fn set_horizontal(&mut self, horizontal: bool) {
        self.parts.angle = if horizontal { WindRose::West } else { WindRose::North };
    }

    pub fn len(&self) -> usize { self.window_ids.len() }

    pub fn contains(&self, id: WindowId) -> bool { self.window_ids.contains(&id) }

    pub fn is_alone(&self, id: WindowId) -> bool { self.len() == 1 && self.contains(id) }

    pub fn clear_render(&mut self) {
        self.rendered_ids.clear();
        self.rendered_rects.clear();
    }

    /// Places the given column members, which must be in window order.
    pub fn apply(&mut self, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        self.clear_render();
        let rects = self.parts.apply(area, &weights_of(tiles), gap);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.geometry = rect;
            self.rendered_ids.push(tile.id);
            self.rendered_rects.push(rect);
        }
    }

    pub fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [&mut Window],
        basis: WindowId,
        delta: RectDelta,
        gap: i32,
    ) {
        let Some(idx) = tiles.iter().position(|t| t.id == basis) else { return };
        let mut weights = weights_of(tiles);
        self.parts.adjust(area, &mut weights, idx, delta, gap);
        store_weights(tiles, &weights);
    }

    pub fn upper_window(&self, id: WindowId) -> Option<WindowId> {
        let idx = self.rendered_ids.iter().position(|&w| w == id)?;
        idx.checked_sub(1).map(|i| self.rendered_ids[i])
    }

    pub fn lower_window(&self, id: WindowId) -> Option<WindowId> {
        let idx = self.rendered_ids.iter().position(|&w| w == id)?;
        self.rendered_ids.get(idx + 1).copied()
    }

    /// Keeps members that are still tileable or merely parked.
    pub fn actualize(&mut self, tileable: &HashSet<WindowId>, parked: &HashSet<WindowId>) {
        self.window_ids.retain(|id| tileable.contains(id) || parked.contains(id));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    #[test]
    fn neighbours_follow_render_order() {
        let mut column = Column::new(false);
        let mut ws = windows(3);
        column.window_ids.extend([id(1), id(2), id(3)]);
        column.apply(&mut refs(&mut ws), Rect::new(0, 0, 100, 300), 0);
        assert_eq!(column.upper_window(id(1)), None);
        assert_eq!(column.upper_window(id(3)), Some(id(2)));
        assert_eq!(column.lower_window(id(1)), Some(id(2)));
        assert_eq!(column.lower_window(id(3)), None);
        assert_eq!(column.rendered_rects[1], Rect::new(0, 100, 100, 100));
    }

    #[test]
    fn actualize_keeps_parked_members() {
        let mut column = Column::new(false);
        column.window_ids.extend([id(1), id(2), id(3)]);
        let tileable: HashSet<_> = [id(1)].into_iter().collect();
        let parked: HashSet<_> = [id(3)].into_iter().collect();
        column.actualize(&tileable, &parked);
        assert!(column.contains(id(1)) && column.contains(id(3)));
        assert!(!column.contains(id(2)));
    }
}
