use tracing::trace;

use crate::common::collections::HashSet;
use crate::common::config::LayoutSettings;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::layout_engine::utils::{adjust_area_weights, split_area_weighted};
use crate::layout_engine::{LayoutCommand, RectDelta, WindRose};
use crate::model::{Window, WindowId, WindowState};
use crate::sys::geometry::{Point, Rect, RectPart};

mod column;
use column::Column;

/// Width of the edge zones, in percent of the working area, that open a new
/// column when a window is dropped there.
const EDGE_ZONE_PERCENT: i32 = 10;

/// Windows sorted into weighted columns. The orientation says where the
/// first column sits: north puts it on the left, and each clockwise step
/// turns the whole arrangement by a quarter.
#[derive(Debug, Clone)]
pub struct ColumnsLayoutSystem {
    columns: Vec<Column>,
    orientation: WindRose,
    balanced: bool,
}

impl ColumnsLayoutSystem {
    pub fn new(settings: &LayoutSettings) -> Self {
        let orientation = settings.columns_initial_angle;
        Self {
            columns: vec![Column::new(Self::stacks_horizontal(orientation))],
            orientation,
            balanced: settings.columns_balanced,
        }
    }

    pub fn orientation(&self) -> WindRose { self.orientation }

    /// Member count per column, first column first.
    pub fn column_sizes(&self) -> Vec<usize> { self.columns.iter().map(Column::len).collect() }

    pub fn column_weights(&self) -> Vec<f64> { self.columns.iter().map(|c| c.weight).collect() }

    fn stacks_horizontal(orientation: WindRose) -> bool {
        matches!(orientation, WindRose::East | WindRose::West)
    }

    /// Columns sit side by side rather than on top of each other.
    fn columns_horizontal(&self) -> bool {
        matches!(self.orientation, WindRose::North | WindRose::South)
    }

    /// The first column is on the right or at the bottom.
    fn reversed(&self) -> bool { matches!(self.orientation, WindRose::South | WindRose::West) }

    fn column_of(&self, id: WindowId) -> Option<usize> {
        self.columns.iter().position(|c| c.contains(id))
    }

    fn insert_column(&mut self, index: usize) {
        let column = Column::new(Self::stacks_horizontal(self.orientation));
        self.columns.insert(index.min(self.columns.len()), column);
        if self.balanced {
            self.balance();
        }
    }

    fn balance(&mut self) {
        for column in &mut self.columns {
            column.weight = 1.0;
        }
    }

    /// Sorts new tiles into the most recently focused column and forgets
    /// windows that went away.
    fn arrange_tileables(&mut self, ctx: &LayoutContext, tiles: &mut [&mut Window]) {
        let mut latest = 0;
        let mut current_column = 0;
        let mut new_windows = Vec::new();
        let mut tileable = HashSet::default();

        for tile in tiles.iter_mut() {
            tile.set_state(WindowState::Tiled);
            match self.column_of(tile.id) {
                Some(idx) => {
                    if tile.timestamp > latest {
                        latest = tile.timestamp;
                        current_column = idx;
                    }
                }
                None => new_windows.push(tile.id),
            }
            tileable.insert(tile.id);
        }

        self.columns[current_column].window_ids.extend(new_windows);
        for column in &mut self.columns {
            column.actualize(&tileable, &ctx.parked);
        }

        let before = self.columns.len();
        self.columns.retain(|c| c.len() != 0);
        if self.columns.is_empty() {
            self.columns.push(Column::new(Self::stacks_horizontal(self.orientation)));
        }
        if self.balanced && self.columns.len() != before {
            self.balance();
        }
    }

    /// Columns that hold at least one of `tiles`, in column order.
    fn visible_columns(&self, tiles: &[&mut Window]) -> Vec<usize> {
        (0..self.columns.len())
            .filter(|&idx| tiles.iter().any(|t| self.columns[idx].contains(t.id)))
            .collect()
    }

    fn column_rects(&self, area: Rect, visible: &[usize], gap: i32) -> Vec<Rect> {
        let mut weights: Vec<f64> = visible.iter().map(|&c| self.columns[c].weight).collect();
        if self.reversed() {
            weights.reverse();
        }
        let mut rects = split_area_weighted(area, &weights, gap, self.columns_horizontal());
        if self.reversed() {
            rects.reverse();
        }
        rects
    }

    /// Zones of the working area that open a new first or last column.
    fn in_leading_zone(&self, area: &Rect, point: Point) -> bool {
        match self.orientation {
            WindRose::North => area.is_left_zone(point, EDGE_ZONE_PERCENT),
            WindRose::East => area.is_top_zone(point, EDGE_ZONE_PERCENT),
            WindRose::South => area.is_right_zone(point, EDGE_ZONE_PERCENT),
            WindRose::West => area.is_bottom_zone(point, EDGE_ZONE_PERCENT),
        }
    }

    fn in_trailing_zone(&self, area: &Rect, point: Point) -> bool {
        match self.orientation {
            WindRose::North => area.is_right_zone(point, EDGE_ZONE_PERCENT),
            WindRose::East => area.is_bottom_zone(point, EDGE_ZONE_PERCENT),
            WindRose::South => area.is_left_zone(point, EDGE_ZONE_PERCENT),
            WindRose::West => area.is_top_zone(point, EDGE_ZONE_PERCENT),
        }
    }

    /// Halves of a rendered window that mean "before" and "after" it.
    fn window_bands(&self) -> (RectPart, RectPart) {
        if Self::stacks_horizontal(self.orientation) {
            (RectPart::Left, RectPart::Right)
        } else {
            (RectPart::Top, RectPart::Bottom)
        }
    }

    /// The rendered window under `point`: column, slot, and whether the
    /// point is in its "after" half.
    fn drop_target(&self, point: Point) -> Option<(usize, usize, bool)> {
        let (before_band, after_band) = self.window_bands();
        self.columns.iter().enumerate().find_map(|(col_idx, column)| {
            column.rendered_rects.iter().enumerate().find_map(|(i, rect)| {
                if rect.includes_point(point, before_band) {
                    Some((col_idx, i, false))
                } else if rect.includes_point(point, after_band) {
                    Some((col_idx, i, true))
                } else {
                    None
                }
            })
        })
    }

    fn move_to_column(&mut self, window: WindowId, from: Option<usize>, to: usize) {
        if let Some(from) = from {
            self.columns[from].window_ids.remove(&window);
        }
        self.columns[to].window_ids.insert(window);
    }

    fn to_next_column(&mut self, window: WindowId) {
        let Some(idx) = self.column_of(window) else { return };
        let last = idx + 1 == self.columns.len();
        if last && self.columns[idx].len() < 2 {
            return;
        }
        if last {
            self.insert_column(self.columns.len());
        }
        self.move_to_column(window, Some(idx), idx + 1);
    }

    fn to_previous_column(&mut self, window: WindowId) {
        let Some(idx) = self.column_of(window) else { return };
        if idx == 0 && self.columns[idx].len() < 2 {
            return;
        }
        if idx == 0 {
            self.insert_column(0);
            self.move_to_column(window, Some(1), 0);
        } else {
            self.move_to_column(window, Some(idx), idx - 1);
        }
    }

    fn to_neighbour(&mut self, ctx: &mut LayoutContext, window: WindowId, after: bool) {
        let Some(idx) = self.column_of(window) else { return };
        let column = &self.columns[idx];
        if column.len() < 2 {
            return;
        }
        let neighbour = if after {
            column.lower_window(window)
        } else {
            column.upper_window(window)
        };
        if let Some(target) = neighbour {
            ctx.move_window(window, target, after);
        }
    }
}

/// Which way a swap shortcut moves a window: across columns or inside one,
/// and towards the end or the start.
enum SwapMove {
    Across(bool),
    Along(bool),
}

impl ColumnsLayoutSystem {
    fn swap_move(&self, command: &LayoutCommand) -> Option<SwapMove> {
        use LayoutCommand::*;
        let forward = match (self.orientation, command) {
            (WindRose::North, SwapRight) | (WindRose::South, SwapLeft) => SwapMove::Across(true),
            (WindRose::North, SwapLeft) | (WindRose::South, SwapRight) => SwapMove::Across(false),
            (WindRose::East, SwapDown) | (WindRose::West, SwapUp) => SwapMove::Across(true),
            (WindRose::East, SwapUp) | (WindRose::West, SwapDown) => SwapMove::Across(false),
            (WindRose::North | WindRose::South, SwapDown) => SwapMove::Along(true),
            (WindRose::North | WindRose::South, SwapUp) => SwapMove::Along(false),
            (WindRose::East | WindRose::West, SwapRight) => SwapMove::Along(true),
            (WindRose::East | WindRose::West, SwapLeft) => SwapMove::Along(false),
            _ => return None,
        };
        Some(forward)
    }
}

impl LayoutSystem for ColumnsLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Columns }

    fn apply(&mut self, ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        self.arrange_tileables(ctx, tiles);
        for column in &mut self.columns {
            column.clear_render();
        }

        let visible = self.visible_columns(tiles);
        let rects = self.column_rects(area, &visible, gap);
        for (&idx, rect) in visible.iter().zip(rects) {
            let column = &mut self.columns[idx];
            let mut members: Vec<&mut Window> = tiles
                .iter_mut()
                .filter(|t| column.contains(t.id))
                .map(|t| &mut **t)
                .collect();
            column.apply(&mut members, rect, gap);
        }
        trace!(columns = ?self.column_sizes(), "columns arranged");
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
        let Some(column_idx) = self.column_of(basis) else { return };
        let visible = self.visible_columns(tiles);
        let Some(pos) = visible.iter().position(|&c| c == column_idx) else { return };
        let horizontal = self.columns_horizontal();

        let across = if horizontal { delta.has_horizontal() } else { delta.has_vertical() };
        if across {
            let count = visible.len();
            let mut weights: Vec<f64> = visible.iter().map(|&c| self.columns[c].weight).collect();
            let (target, delta) = if self.reversed() {
                weights.reverse();
                let flipped = if horizontal {
                    delta.mirror_x()
                } else {
                    RectDelta::new(delta.east, delta.west, delta.north, delta.south)
                };
                (count - 1 - pos, flipped)
            } else {
                (pos, delta)
            };
            let adjusted = adjust_area_weights(area, &weights, gap, target, delta, horizontal);
            for (k, weight) in adjusted.into_iter().enumerate() {
                let idx = if self.reversed() { visible[count - 1 - k] } else { visible[k] };
                self.columns[idx].weight = weight * count as f64;
            }
        }

        let along = if horizontal { delta.has_vertical() } else { delta.has_horizontal() };
        if along {
            let rects = self.column_rects(area, &visible, gap);
            let column = &mut self.columns[column_idx];
            let mut members: Vec<&mut Window> = tiles
                .iter_mut()
                .filter(|t| column.contains(t.id))
                .map(|t| &mut **t)
                .collect();
            column.adjust(rects[pos], &mut members, basis, delta, gap);
        }
    }

    fn handle_shortcut(&mut self, ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        if *command == LayoutCommand::Rotate {
            self.orientation = self.orientation.cw();
            let horizontal = Self::stacks_horizontal(self.orientation);
            for column in &mut self.columns {
                column.set_horizontal(horizontal);
            }
            return true;
        }

        let Some(swap) = self.swap_move(command) else { return false };
        let Some(window) = ctx.current_window else { return true };
        match swap {
            SwapMove::Across(true) => self.to_next_column(window),
            SwapMove::Across(false) => self.to_previous_column(window),
            SwapMove::Along(after) => self.to_neighbour(ctx, window, after),
        }
        true
    }

    fn supports_drag(&self) -> bool { true }

    fn drag(
        &mut self,
        ctx: &mut LayoutContext,
        point: Point,
        window: WindowId,
        working_area: Rect,
    ) -> bool {
        if self.columns.len() == 1 && self.columns[0].len() == 1 {
            return false;
        }
        let from = self.column_of(window);

        if self.in_leading_zone(&working_area, point) && !self.columns[0].is_alone(window) {
            if let Some(from) = from {
                self.columns[from].window_ids.remove(&window);
            }
            self.insert_column(0);
            self.columns[0].window_ids.insert(window);
            return true;
        }
        let last = self.columns.len() - 1;
        if self.in_trailing_zone(&working_area, point) && !self.columns[last].is_alone(window) {
            if let Some(from) = from {
                self.columns[from].window_ids.remove(&window);
            }
            self.insert_column(self.columns.len());
            let last = self.columns.len() - 1;
            self.columns[last].window_ids.insert(window);
            return true;
        }

        let Some((col_idx, i, after)) = self.drop_target(point) else { return false };
        let column = &self.columns[col_idx];
        let rendered = column.rendered_ids[i];
        if rendered == window {
            return false;
        }
        let neighbour = if after {
            column.rendered_ids.get(i + 1)
        } else {
            i.checked_sub(1).and_then(|j| column.rendered_ids.get(j))
        };
        if neighbour == Some(&window) {
            return false;
        }

        if from.is_some_and(|f| f != col_idx) {
            self.move_to_column(window, from, col_idx);
        } else {
            self.columns[col_idx].window_ids.insert(window);
        }
        ctx.move_window(window, rendered, after);
        true
    }
}
