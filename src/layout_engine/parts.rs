//! Composable partition building blocks. Parts work on per-tile weights
//! rather than windows, so layouts can nest them freely and write the
//! adjusted weights back afterwards.

use crate::layout_engine::utils::{
    adjust_area_half_weights, adjust_area_weights, split_area_half_weighted, split_area_weighted,
};
use crate::layout_engine::{RectDelta, WindRose};
use crate::sys::geometry::Rect;

pub trait LayoutPart {
    /// One rectangle per weight, in order.
    fn apply(&self, area: Rect, weights: &[f64], gap: i32) -> Vec<Rect>;

    /// Absorbs the part of `delta` this part can act on for tile `basis` and
    /// returns what is left for the enclosing part.
    fn adjust(
        &mut self,
        area: Rect,
        weights: &mut [f64],
        basis: usize,
        delta: RectDelta,
        gap: i32,
    ) -> RectDelta;
}

/// Every tile gets the whole area.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillPart;

impl LayoutPart for FillPart {
    fn apply(&self, area: Rect, weights: &[f64], _gap: i32) -> Vec<Rect> {
        vec![area; weights.len()]
    }

    fn adjust(&mut self, _: Rect, _: &mut [f64], _: usize, delta: RectDelta, _: i32) -> RectDelta {
        delta
    }
}

/// Tiles stacked top to bottom, sized by weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackPart;

impl LayoutPart for StackPart {
    fn apply(&self, area: Rect, weights: &[f64], gap: i32) -> Vec<Rect> {
        split_area_weighted(area, weights, gap, false)
    }

    fn adjust(
        &mut self,
        area: Rect,
        weights: &mut [f64],
        basis: usize,
        delta: RectDelta,
        gap: i32,
    ) -> RectDelta {
        let n = weights.len();
        if basis >= n {
            return delta;
        }
        let adjusted = adjust_area_weights(area, weights, gap, basis, delta, false);
        for (weight, new) in weights.iter_mut().zip(adjusted) {
            *weight = new * n as f64;
        }
        RectDelta::new(
            delta.east,
            delta.west,
            if basis == n - 1 { delta.south } else { 0 },
            if basis == 0 { delta.north } else { 0 },
        )
    }
}

/// Runs `inner` in a rotated frame. East transposes the axes, south mirrors
/// horizontally and west does both.
#[derive(Debug, Clone, Default)]
pub struct RotatePart<T> {
    pub inner: T,
    pub angle: WindRose,
}

impl<T> RotatePart<T> {
    pub fn new(inner: T) -> Self { Self { inner, angle: WindRose::North } }

    pub fn rotate_cw(&mut self) { self.angle = self.angle.cw(); }

    pub fn rotate_ccw(&mut self) { self.angle = self.angle.ccw(); }
}

impl<T: LayoutPart> LayoutPart for RotatePart<T> {
    fn apply(&self, area: Rect, weights: &[f64], gap: i32) -> Vec<Rect> {
        match self.angle {
            WindRose::North => self.inner.apply(area, weights, gap),
            WindRose::East => self
                .inner
                .apply(area.transpose(), weights, gap)
                .into_iter()
                .map(|g| g.transpose())
                .collect(),
            WindRose::South => self
                .inner
                .apply(area, weights, gap)
                .into_iter()
                .map(|g| g.mirror_x(&area))
                .collect(),
            WindRose::West => {
                let frame = area.transpose();
                self.inner
                    .apply(frame, weights, gap)
                    .into_iter()
                    .map(|g| g.mirror_x(&frame).transpose())
                    .collect()
            }
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
        match self.angle {
            WindRose::North => self.inner.adjust(area, weights, basis, delta, gap),
            WindRose::East => self
                .inner
                .adjust(area.transpose(), weights, basis, delta.transpose(), gap)
                .transpose(),
            WindRose::South => self
                .inner
                .adjust(area, weights, basis, delta.mirror_x(), gap)
                .mirror_x(),
            WindRose::West => self
                .inner
                .adjust(area.transpose(), weights, basis, delta.mirror_transpose(), gap)
                .unmirror_transpose(),
        }
    }
}

/// Two sub-parts side by side. The first `primary_size` tiles go to
/// `primary`; `ratio` is the primary's share of the area.
#[derive(Debug, Clone)]
pub struct HalfSplitPart<P, S> {
    pub primary: P,
    pub secondary: S,
    pub angle: WindRose,
    pub primary_size: usize,
    pub ratio: f64,
}

impl<P, S> HalfSplitPart<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary,
            angle: WindRose::North,
            primary_size: 1,
            ratio: 0.5,
        }
    }

    /// Primary and secondary sit left and right of each other.
    pub fn horizontal(&self) -> bool { matches!(self.angle, WindRose::North | WindRose::South) }

    /// Primary takes the right or bottom half.
    pub fn reversed(&self) -> bool { matches!(self.angle, WindRose::South | WindRose::West) }
}

impl<P: LayoutPart, S: LayoutPart> LayoutPart for HalfSplitPart<P, S> {
    fn apply(&self, area: Rect, weights: &[f64], gap: i32) -> Vec<Rect> {
        if weights.len() <= self.primary_size {
            return self.primary.apply(area, weights, gap);
        }
        if self.primary_size == 0 {
            return self.secondary.apply(area, weights, gap);
        }
        let reversed = self.reversed();
        let ratio = if reversed { 1.0 - self.ratio } else { self.ratio };
        let (first, second) = split_area_half_weighted(area, ratio, gap, self.horizontal());
        let (primary_area, secondary_area) = if reversed {
            (second, first)
        } else {
            (first, second)
        };
        let (primary_weights, secondary_weights) = weights.split_at(self.primary_size);
        let mut rects = self.primary.apply(primary_area, primary_weights, gap);
        rects.extend(self.secondary.apply(secondary_area, secondary_weights, gap));
        rects
    }

    fn adjust(
        &mut self,
        area: Rect,
        weights: &mut [f64],
        basis: usize,
        delta: RectDelta,
        gap: i32,
    ) -> RectDelta {
        if basis >= weights.len() {
            return delta;
        }
        if weights.len() <= self.primary_size {
            return self.primary.adjust(area, weights, basis, delta, gap);
        }
        if self.primary_size == 0 {
            return self.secondary.adjust(area, weights, basis, delta, gap);
        }

        let target = usize::from(basis >= self.primary_size);
        let (primary_weights, secondary_weights) = weights.split_at_mut(self.primary_size);
        let delta = if target == 0 {
            self.primary.adjust(area, primary_weights, basis, delta, gap)
        } else {
            self.secondary
                .adjust(area, secondary_weights, basis - self.primary_size, delta, gap)
        };

        let reversed = self.reversed();
        let ratio = if reversed { 1.0 - self.ratio } else { self.ratio };
        let side = if reversed { 1 - target } else { target };
        let ratio = adjust_area_half_weights(area, ratio, gap, side, delta, self.horizontal());
        self.ratio = if reversed { 1.0 - ratio } else { ratio };

        // The shared edge has been consumed; pass the outer edges on.
        match (target, self.angle) {
            (0, WindRose::North) | (1, WindRose::South) => {
                RectDelta::new(0, delta.west, delta.south, delta.north)
            }
            (0, WindRose::East) | (1, WindRose::West) => {
                RectDelta::new(delta.east, delta.west, 0, delta.north)
            }
            (0, WindRose::South) | (1, WindRose::North) => {
                RectDelta::new(delta.east, 0, delta.south, delta.north)
            }
            _ => RectDelta::new(delta.east, delta.west, delta.south, 0),
        }
    }
}
