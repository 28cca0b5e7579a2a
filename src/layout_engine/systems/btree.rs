use crate::layout_engine::parts::{FillPart, HalfSplitPart, LayoutPart};
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::layout_engine::{RectDelta, WindRose};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

#[derive(Debug, Clone)]
enum BTreeNode {
    Leaf(FillPart),
    Split(Box<HalfSplitPart<BTreeNode, BTreeNode>>),
}

impl BTreeNode {
    /// Balanced tree with exactly `count` leaves.
    fn build(count: usize) -> Self {
        if count <= 2 {
            return Self::child(count, 1);
        }
        let level = usize::BITS - (count - 1).leading_zeros();
        let level_capacity = 1usize << (level - 1);
        let half_level_capacity = 1usize << (level - 2);
        let primary_size = if count > level_capacity + half_level_capacity {
            count - level_capacity
        } else {
            half_level_capacity
        };
        Self::split(count, primary_size, 1)
    }

    fn child(count: usize, level: u32) -> Self {
        if count > 1 {
            Self::split(count, count / 2, level)
        } else {
            BTreeNode::Leaf(FillPart)
        }
    }

    fn split(count: usize, primary_size: usize, level: u32) -> Self {
        let mut part = HalfSplitPart::new(
            Self::child(primary_size, level + 1),
            Self::child(count - primary_size, level + 1),
        );
        part.primary_size = primary_size;
        part.angle = if level % 2 == 1 { WindRose::North } else { WindRose::East };
        BTreeNode::Split(Box::new(part))
    }

    #[cfg(test)]
    fn leaves(&self) -> usize {
        match self {
            BTreeNode::Leaf(_) => 1,
            BTreeNode::Split(part) => part.primary.leaves() + part.secondary.leaves(),
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        match self {
            BTreeNode::Leaf(_) => 0,
            BTreeNode::Split(part) => 1 + part.primary.depth().max(part.secondary.depth()),
        }
    }
}

impl LayoutPart for BTreeNode {
    fn apply(&self, area: Rect, weights: &[f64], gap: i32) -> Vec<Rect> {
        match self {
            BTreeNode::Leaf(fill) => fill.apply(area, weights, gap),
            BTreeNode::Split(part) => part.apply(area, weights, gap),
        }
    }

    fn adjust(
        &mut self,
        area: Rect,
        weights: &mut [f64],
        basis: usize,
        delta: RectDelta,
        gap: i32,
    ) -> RectDelta {
        match self {
            BTreeNode::Leaf(fill) => fill.adjust(area, weights, basis, delta, gap),
            BTreeNode::Split(part) => part.adjust(area, weights, basis, delta, gap),
        }
    }
}

/// Recursive bisection with alternating split axes. The tree is rebuilt on
/// every pass, so it keeps no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BTreeLayoutSystem;

impl LayoutSystem for BTreeLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::BTree }

    fn description(&self) -> String { "BTree".into() }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        let tree = BTreeNode::build(tiles.len());
        let rects = tree.apply(area, &vec![1.0; tiles.len()], gap);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.set_state(WindowState::Tiled);
            tile.geometry = rect;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::layout_engine::systems::test_support::*;

    #[test]
    fn leaf_count_matches_and_depth_is_balanced() {
        for n in 1..=16usize {
            let tree = BTreeNode::build(n);
            assert_eq!(tree.leaves(), n, "n={n}");
            let ideal = (n as f64).log2().ceil() as usize;
            let depth = tree.depth();
            assert!(depth + 1 >= ideal && depth <= ideal + 1, "n={n} depth={depth}");
        }
    }

    #[test]
    fn three_windows() {
        let area = Rect::new(0, 0, 1000, 800);
        let mut ws = windows(3);
        let mut ctx = LayoutContext::default();
        BTreeLayoutSystem.apply(&mut ctx, &mut refs(&mut ws), area, 0);
        assert_eq!(
            geometries(&ws),
            vec![
                Rect::new(0, 0, 500, 800),
                Rect::new(500, 0, 500, 400),
                Rect::new(500, 400, 500, 400),
            ]
        );
    }

    #[test]
    fn four_windows_make_quadrants() {
        let area = Rect::new(0, 0, 1000, 800);
        let mut ws = windows(4);
        let mut ctx = LayoutContext::default();
        BTreeLayoutSystem.apply(&mut ctx, &mut refs(&mut ws), area, 0);
        assert_eq!(
            geometries(&ws),
            vec![
                Rect::new(0, 0, 500, 400),
                Rect::new(0, 400, 500, 400),
                Rect::new(500, 0, 500, 400),
                Rect::new(500, 400, 500, 400),
            ]
        );
    }
}
