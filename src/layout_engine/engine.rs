//! The tiling engine owns every window and per-surface store and turns
//! operations into target geometries. It never talks to the host directly;
//! everything goes through the [`DriverContext`] passed to each call.

use std::cmp::Reverse;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::common::collections::HashSet;
use crate::common::config::{BehaviorSettings, Config, LayoutSettings, NewWindowPosition};
use crate::dock::{DockPosition, DockStore};
use crate::layout_engine::gaps::GapsStore;
use crate::layout_engine::resize::ResizeEdge;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutRequest, LayoutSystem};
use crate::layout_engine::utils::{compute_tiling_area, shrink_centered};
use crate::layout_engine::workspaces::LayoutStore;
use crate::layout_engine::Direction;
use crate::model::{Window, WindowId, WindowState, WindowStore};
use crate::sys::driver::{DriverContext, ScheduledTask, Surface};
use crate::sys::geometry::Rect;

/// Delay before a drifted tile is put back.
pub const ENFORCE_SIZE_DELAY: Duration = Duration::from_millis(10);
/// Margin taken off every window floated by [`TilingEngine::float_all`].
pub const FLOAT_ALL_INSET: i32 = 4;
/// Floating windows move and resize by this share of the working area.
const FLOAT_STEP: f64 = 0.05;
/// Tiles resize by this share of the working area.
const TILE_STEP: f64 = 0.03;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LayoutCommand {
    FocusNext,
    FocusPrev,
    FocusUp,
    FocusDown,
    FocusLeft,
    FocusRight,

    ShiftUp,
    ShiftDown,
    ShiftLeft,
    ShiftRight,

    SwapUp,
    SwapDown,
    SwapLeft,
    SwapRight,

    GrowWidth,
    ShrinkWidth,
    GrowHeight,
    ShrinkHeight,

    Increase,
    Decrease,
    DwmLeft,
    DwmRight,

    SetMaster,
    ToggleFloat,
    ToggleFloatAll,
    ToggleDock,

    NextLayout,
    PreviousLayout,
    SetLayout(LayoutKind),

    Rotate,
    RotatePart,
}

/// Sole window size in percent, if it actually shrinks the window.
fn sole_percent(percent: f64) -> Option<f64> { (percent > 0.0 && percent < 100.0).then_some(percent) }

pub struct TilingEngine {
    pub windows: WindowStore,
    pub layouts: LayoutStore,
    pub docks: DockStore,
    gaps: GapsStore,
    settings: LayoutSettings,
    behavior: BehaviorSettings,
}

impl TilingEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            windows: WindowStore::new(),
            layouts: LayoutStore::new(&config.layout),
            docks: DockStore::new(&config.dock),
            gaps: GapsStore::new(&config.gaps),
            settings: config.layout.clone(),
            behavior: config.behavior.clone(),
        }
    }

    pub fn behavior(&self) -> &BehaviorSettings { &self.behavior }

    /// Windows a layout should remember even though they are not tiled right
    /// now.
    fn parked(&self, srf: &Surface) -> HashSet<WindowId> {
        self.windows
            .iter()
            .filter(|w| w.surface().is_some_and(|s| s.id == srf.id))
            .filter(|w| {
                w.minimized()
                    || matches!(w.state(), WindowState::Floating | WindowState::Dragging)
            })
            .map(|w| w.id)
            .collect()
    }

    fn layout_context(&self, ctx: &dyn DriverContext, srf: &Surface) -> LayoutContext {
        let mut lctx = LayoutContext::new(ctx.current_window());
        lctx.parked = self.parked(srf);
        lctx
    }

    pub fn arrange(&mut self, ctx: &mut dyn DriverContext) {
        for srf in ctx.screens() {
            self.arrange_screen(ctx, &srf);
        }
    }

    pub fn arrange_screen(&mut self, ctx: &mut dyn DriverContext, srf: &Surface) {
        let now = ctx.now();
        let gaps = self.gaps.gaps_for(srf);
        let kind = self.layouts.current_kind(srf);
        let mut lctx = self.layout_context(ctx, srf);
        let settings = &self.settings;
        let float_default = self.behavior.float_default;

        let mut visibles: Vec<&mut Window> = self.windows.visible_windows_mut(srf).collect();
        debug!(surface = %srf.id, layout = %kind, visibles = visibles.len(), "arrange");

        let working_area = self.docks.render(srf, &mut visibles, now);

        for window in visibles.iter_mut() {
            if window.state() == WindowState::Undecided {
                if window.should_float() || float_default {
                    window.set_state(WindowState::Floating);
                } else {
                    window.set_state(WindowState::Tiled);
                }
            }
        }

        let mut tiles: Vec<&mut Window> =
            visibles.iter_mut().filter(|w| w.is_tileable()).map(|w| &mut **w).collect();

        let sole = tiles.len() == 1;
        let sole_width = sole_percent(settings.sole_window_width);
        let sole_height = sole_percent(settings.sole_window_height);
        let tiling_area = if (settings.monocle_maximize && kind.is_monocle())
            || (sole && settings.sole_window_no_gaps)
        {
            working_area
        } else if sole && (sole_width.is_some() || sole_height.is_some()) {
            shrink_centered(working_area, sole_width.unwrap_or(100.0), sole_height.unwrap_or(100.0))
        } else {
            compute_tiling_area(working_area, &gaps)
        };

        let layout = self.layouts.current_layout(srf);
        if !tiles.is_empty() {
            layout.apply(&mut lctx, &mut tiles, tiling_area, gaps.between);

            if settings.unfit_greater || settings.unfit_less {
                let before = tiles.len();
                let parked = &mut lctx.parked;
                tiles.retain_mut(|tile| {
                    let size = tile.geometry.size();
                    let min = tile.min_size();
                    let max = tile.max_size();
                    let unfit = (settings.unfit_greater
                        && (min.height > size.height || min.width > size.width))
                        || (settings.unfit_less
                            && (max.height < size.height || max.width < size.width));
                    if unfit {
                        debug!(window = %tile.id, "does not fit its tile, floating");
                        tile.set_state(WindowState::Floating);
                        parked.insert(tile.id);
                    }
                    !unfit
                });
                if tiles.len() != before {
                    layout.apply(&mut lctx, &mut tiles, tiling_area, gaps.between);
                }
            }
        }

        if settings.limit_tile_width_ratio > 0.0 && !kind.is_monocle() {
            let max_width =
                (f64::from(working_area.height) * settings.limit_tile_width_ratio).floor() as i32;
            for tile in tiles.iter_mut().filter(|t| t.is_tiled() && t.geometry.width > max_width) {
                let g = tile.geometry;
                tile.geometry = Rect::new(g.x + (g.width - max_width) / 2, g.y, max_width, g.height);
            }
        }

        for window in visibles.iter_mut() {
            window.commit();
        }
        trace!(surface = %srf.id, "arrange finished");

        self.run_requests(ctx, lctx.requests);
    }

    /// Carries out what a layout asked for while it ran.
    fn run_requests(&mut self, ctx: &mut dyn DriverContext, requests: Vec<LayoutRequest>) {
        for request in requests {
            match request {
                LayoutRequest::MoveWindow { window, target, after } => {
                    self.windows.move_window(window, target, after)
                }
                LayoutRequest::CycleFocus(step) => self.focus_order(ctx, step),
                LayoutRequest::Notify(text) => ctx.show_notification(&text),
            }
        }
    }

    /// Feeds the difference between the target and the host geometry of
    /// `basis` back into the layout.
    pub fn adjust_layout(&mut self, basis: WindowId) {
        let Some(window) = self.windows.get(basis) else { return };
        let delta = window.geometry_delta();
        if delta.is_zero() {
            return;
        }
        let Some(srf) = window.surface() else { return };
        let gaps = self.gaps.gaps_for(&srf);
        let layout = self.layouts.current_layout(&srf);
        if !layout.supports_adjust() {
            return;
        }
        let area = compute_tiling_area(srf.working_area, &gaps);
        let mut tiles: Vec<&mut Window> = self.windows.visible_tiles_mut(&srf).collect();
        layout.adjust(area, &mut tiles, basis, delta, gaps.between);
    }

    /// Turns a resize of a docked window into new percentages on its dock.
    pub fn adjust_dock(&mut self, basis: WindowId) {
        let Some(window) = self.windows.get_mut(basis) else { return };
        let actual = window.actual_geometry();
        if actual == window.geometry {
            return;
        }
        let Some(srf) = window.surface() else { return };
        let area = srf.working_area;
        let wide = 100.0 * f64::from(actual.width - window.geometry.width) / f64::from(area.width.max(1));
        let height =
            100.0 * f64::from(actual.height - window.geometry.height) / f64::from(area.height.max(1));
        let Some(dock) = window.dock.as_mut() else { return };
        match dock.position {
            Some(DockPosition::Left | DockPosition::Right) => {
                dock.cfg.v_height += height;
                dock.cfg.v_wide += wide;
            }
            Some(DockPosition::Top | DockPosition::Bottom) => {
                dock.cfg.h_height += height;
                dock.cfg.h_wide += wide;
            }
            None => {}
        }
    }

    /// Grow/shrink shortcuts on a docked window change its own dock by one
    /// percent. Returns false for any other command.
    pub fn step_dock(&mut self, id: WindowId, command: &LayoutCommand) -> bool {
        let Some(dock) = self.windows.get_mut(id).and_then(|w| w.dock.as_mut()) else {
            return false;
        };
        let Some(position) = dock.position else { return false };
        let cfg = &mut dock.cfg;
        let (value, step) = match (command, position.is_vertical()) {
            (LayoutCommand::GrowWidth, true) => (&mut cfg.v_wide, 1.0),
            (LayoutCommand::ShrinkWidth, true) => (&mut cfg.v_wide, -1.0),
            (LayoutCommand::GrowHeight, true) => (&mut cfg.v_height, 1.0),
            (LayoutCommand::ShrinkHeight, true) => (&mut cfg.v_height, -1.0),
            (LayoutCommand::GrowWidth, false) => (&mut cfg.h_wide, 1.0),
            (LayoutCommand::ShrinkWidth, false) => (&mut cfg.h_wide, -1.0),
            (LayoutCommand::GrowHeight, false) => (&mut cfg.h_height, 1.0),
            (LayoutCommand::ShrinkHeight, false) => (&mut cfg.h_height, -1.0),
            _ => return false,
        };
        *value += step;
        true
    }

    /// Moves one border of `id` outwards (`step` 1) or inwards (`step` -1).
    pub fn resize_window(&mut self, id: WindowId, edge: ResizeEdge, step: i32) {
        let Some(window) = self.windows.get(id) else { return };
        if window.is_floating() {
            self.resize_float(id, edge, step);
        } else if window.is_tiled() {
            self.resize_tile(id, edge, step);
        }
    }

    fn resize_float(&mut self, id: WindowId, edge: ResizeEdge, step: i32) {
        let Some(window) = self.windows.get_mut(id) else { return };
        let Some(srf) = window.surface() else { return };
        let h_step = f64::from(srf.working_area.width) * FLOAT_STEP;
        let v_step = f64::from(srf.working_area.height) * FLOAT_STEP;
        let (dx, dy) = match edge {
            ResizeEdge::East => (step, 0),
            ResizeEdge::West => (-step, 0),
            ResizeEdge::South => (0, step),
            ResizeEdge::North => (0, -step),
        };
        let g = window.actual_geometry();
        let width = (f64::from(g.width) + h_step * f64::from(dx)).round() as i32;
        let height = (f64::from(g.height) + v_step * f64::from(dy)).round() as i32;
        window.force_set_geometry(Rect::new(g.x, g.y, width, height));
    }

    /// Resizes a tile through the layout. Growing the east (south) border of
    /// a tile with nothing east (south) of it shrinks its west (north) border
    /// instead, and the other way round.
    fn resize_tile(&mut self, id: WindowId, edge: ResizeEdge, step: i32) {
        let Some(window) = self.windows.get(id) else { return };
        let Some(srf) = window.surface() else { return };
        let geometry = window.geometry;

        let (edge, step) = match edge {
            ResizeEdge::East
                if !self.windows.visible_tiles(&srf).any(|t| t.geometry.x >= geometry.max_x()) =>
            {
                (ResizeEdge::West, -step)
            }
            ResizeEdge::South
                if !self.windows.visible_tiles(&srf).any(|t| t.geometry.y >= geometry.max_y()) =>
            {
                (ResizeEdge::North, -step)
            }
            edge => (edge, step),
        };
        let length = match edge {
            ResizeEdge::East | ResizeEdge::West => srf.working_area.width,
            ResizeEdge::South | ResizeEdge::North => srf.working_area.height,
        };
        let delta = edge.delta((f64::from(length) * TILE_STEP * f64::from(step)) as i32);

        let gaps = self.gaps.gaps_for(&srf);
        let layout = self.layouts.current_layout(&srf);
        if !layout.supports_adjust() {
            return;
        }
        let area = compute_tiling_area(srf.working_area, &gaps);
        let mut tiles: Vec<&mut Window> = self.windows.visible_tileables_mut(&srf).collect();
        layout.adjust(area, &mut tiles, id, delta, gaps.between);
    }

    /// Schedules a re-commit of a tile the host moved away from its slot.
    pub fn enforce_size(&self, ctx: &mut dyn DriverContext, id: WindowId) {
        let Some(window) = self.windows.get(id) else { return };
        if window.is_tiled() && window.actual_geometry() != window.geometry {
            trace!(window = %id, "geometry drifted, scheduling enforce");
            ctx.set_timeout(ENFORCE_SIZE_DELAY, ScheduledTask::EnforceSize(id));
        }
    }

    pub fn run_task(&mut self, task: ScheduledTask) {
        match task {
            ScheduledTask::EnforceSize(id) => {
                if let Some(window) = self.windows.get_mut(id).filter(|w| w.is_tiled()) {
                    window.commit();
                }
            }
        }
    }

    /// Takes ownership of a new window. Returns false if the window asked to
    /// be left alone.
    pub fn manage(&mut self, mut window: Window) -> bool {
        if window.should_ignore() {
            debug!(window = %window.id, "ignored");
            return false;
        }
        if self.docks.has_template(window.class()) {
            window.set_state(WindowState::Docked);
        } else {
            window.set_state(WindowState::Undecided);
        }
        match self.behavior.new_window_position {
            NewWindowPosition::Append => self.windows.push(window),
            NewWindowPosition::Prepend => self.windows.unshift(window),
            NewWindowPosition::BesideFirst => self.windows.beside_first(window),
        }
        true
    }

    pub fn unmanage(&mut self, id: WindowId) -> Option<Window> {
        self.docks.remove(id);
        self.windows.remove(id)
    }

    /// Sends a new tileable window to the next surface when the layout of the
    /// current one has no room left for it.
    pub fn relocate_overflow(&mut self, ctx: &mut dyn DriverContext, id: WindowId) {
        let Some(srf) = ctx.current_surface() else { return };
        let Some(window) = self.windows.get(id) else { return };
        if window.is_docked() || window.should_float() || self.behavior.float_default {
            return;
        }
        let Some(capacity) = self.layouts.current_layout(&srf).capacity() else { return };
        let count = self.windows.visible_tileables(&srf).filter(|w| w.id != id).count() + 1;
        if count <= capacity {
            return;
        }
        let Some(next) = ctx.next_surface(&srf) else { return };
        debug!(window = %id, from = %srf.id, to = %next.id, "layout full, moving window");
        if let Some(window) = self.windows.get_mut(id) {
            window.set_surface(&next);
        }
        ctx.set_current_surface(&next);
    }

    fn focus_first_tile(&self, ctx: &mut dyn DriverContext, srf: &Surface) {
        if let Some(first) = self.windows.visible_tiles(srf).next() {
            ctx.set_current_window(first.id);
        }
    }

    /// Moves focus `step` windows through the visible windows, wrapping.
    pub fn focus_order(&self, ctx: &mut dyn DriverContext, step: i32) {
        let Some(srf) = ctx.current_surface() else { return };
        let Some(current) = ctx.current_window() else {
            self.focus_first_tile(ctx, &srf);
            return;
        };
        let visibles: Vec<WindowId> = self.windows.visible_windows(&srf).map(|w| w.id).collect();
        let Some(&first) = visibles.first() else { return };
        let Some(idx) = visibles.iter().position(|&id| id == current) else {
            ctx.set_current_window(first);
            return;
        };
        let next = (idx as i32 + step).rem_euclid(visibles.len() as i32) as usize;
        ctx.set_current_window(visibles[next]);
    }

    pub fn focus_dir(&self, ctx: &mut dyn DriverContext, dir: Direction) {
        let Some(srf) = ctx.current_surface() else { return };
        let Some(current) = ctx.current_window() else {
            self.focus_first_tile(ctx, &srf);
            return;
        };
        if let Some(neighbor) = self.neighbor_by_direction(&srf, current, dir) {
            ctx.set_current_window(neighbor);
        }
    }

    /// Nearest tile beyond `basis` in `dir` whose span across `dir` overlaps
    /// the one of `basis`. Ties go to the most recently focused tile.
    pub fn neighbor_by_direction(
        &self,
        srf: &Surface,
        basis: WindowId,
        dir: Direction,
    ) -> Option<WindowId> {
        let basis_rect = self.windows.get(basis)?.geometry;
        let (vertical, sign) = match dir {
            Direction::Up => (true, -1),
            Direction::Down => (true, 1),
            Direction::Left => (false, -1),
            Direction::Right => (false, 1),
        };
        let along = |r: &Rect| if vertical { r.y * sign } else { r.x * sign };
        let across = |r: &Rect| {
            if vertical {
                (r.x, r.max_x())
            } else {
                (r.y, r.max_y())
            }
        };
        let (lo, hi) = across(&basis_rect);

        self.windows
            .visible_tiles(srf)
            .filter(|t| t.id != basis && along(&t.geometry) > along(&basis_rect))
            .filter(|t| {
                let (tlo, thi) = across(&t.geometry);
                lo < thi && tlo < hi
            })
            .min_by_key(|t| (along(&t.geometry), Reverse(t.timestamp)))
            .map(|t| t.id)
    }

    /// Moves `id` one place through the visible windows of its surface.
    pub fn swap_order(&mut self, id: WindowId, step: i32) {
        let Some(srf) = self.windows.get(id).and_then(|w| w.surface()) else { return };
        let visibles: Vec<WindowId> = self.windows.visible_windows(&srf).map(|w| w.id).collect();
        if visibles.len() < 2 {
            return;
        }
        let Some(src) = visibles.iter().position(|&w| w == id) else { return };
        let dst = (src as i32 + step).rem_euclid(visibles.len() as i32) as usize;
        self.windows.move_window(id, visibles[dst], false);
    }

    pub fn swap_direction(&mut self, ctx: &mut dyn DriverContext, dir: Direction) {
        let Some(srf) = ctx.current_surface() else { return };
        let Some(current) = ctx.current_window() else {
            self.focus_first_tile(ctx, &srf);
            return;
        };
        match self.neighbor_by_direction(&srf, current, dir) {
            Some(neighbor) => self.windows.swap(current, neighbor),
            None => self.move_to_screen(ctx, current, &srf, dir),
        }
    }

    /// Sends `id` to the screen next to `srf` in `dir`, taking the current
    /// surface along.
    fn move_to_screen(
        &mut self,
        ctx: &mut dyn DriverContext,
        id: WindowId,
        srf: &Surface,
        dir: Direction,
    ) {
        let Some(target) = ctx.surface_towards(srf, dir) else {
            debug!(window = %id, %dir, "no neighbour or screen to swap with");
            return;
        };
        let Some(window) = self.windows.get_mut(id) else { return };
        debug!(window = %id, from = %srf.id, to = %target.id, "moving window to screen");
        window.set_surface(&target);
        ctx.set_current_surface(&target);
    }

    /// Moves a floating window one step in `dir`.
    pub fn move_float(&mut self, id: WindowId, dir: Direction) {
        let Some(window) = self.windows.get_mut(id) else { return };
        let Some(srf) = window.surface() else { return };
        let h_step = f64::from(srf.working_area.width) * FLOAT_STEP;
        let v_step = f64::from(srf.working_area.height) * FLOAT_STEP;
        let (dx, dy) = match dir {
            Direction::Up => (0.0, -v_step),
            Direction::Down => (0.0, v_step),
            Direction::Left => (-h_step, 0.0),
            Direction::Right => (h_step, 0.0),
        };
        let g = window.actual_geometry();
        let x = (f64::from(g.x) + dx).round() as i32;
        let y = (f64::from(g.y) + dy).round() as i32;
        window.force_set_geometry(Rect::new(x, y, g.width, g.height));
    }

    pub fn swap_dir_or_move_float(&mut self, ctx: &mut dyn DriverContext, dir: Direction) {
        let Some(current) = ctx.current_window() else { return };
        let Some(window) = self.windows.get(current) else { return };
        if window.is_floating() {
            self.move_float(current, dir);
        } else if window.is_tiled() {
            self.swap_direction(ctx, dir);
        }
    }

    pub fn toggle_dock(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else { return };
        if window.is_docked() {
            window.set_state(WindowState::Tiled);
        } else {
            window.set_state(WindowState::Docked);
        }
    }

    pub fn toggle_float(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else { return };
        if window.is_tileable() {
            window.set_state(WindowState::Floating);
        } else {
            window.set_state(WindowState::Tiled);
        }
    }

    /// Floats every visible window of `srf`, or tiles them all again when at
    /// least half of them already float.
    pub fn float_all(&mut self, ctx: &mut dyn DriverContext, srf: &Surface) {
        let mut windows: Vec<&mut Window> = self.windows.visible_windows_mut(srf).collect();
        let floats = windows.iter().filter(|w| w.state() == WindowState::Floating).count();

        if (floats as f64) < windows.len() as f64 / 2.0 {
            for window in windows.iter_mut() {
                window.float_geometry = window.actual_geometry().inset(FLOAT_ALL_INSET);
                window.set_state(WindowState::Floating);
            }
            ctx.show_notification("Float All");
        } else {
            for window in windows.iter_mut() {
                window.set_state(WindowState::Tiled);
            }
            ctx.show_notification("Tile All");
        }
    }

    pub fn set_master(&mut self, id: WindowId) { self.windows.set_master(id) }

    pub fn cycle_layout(&mut self, ctx: &mut dyn DriverContext, step: i32) {
        let Some(srf) = ctx.current_surface() else { return };
        if let Some(layout) = self.layouts.cycle_layout(&srf, step) {
            ctx.show_notification(&layout.description());
        }
    }

    pub fn set_layout(&mut self, ctx: &mut dyn DriverContext, kind: LayoutKind) {
        let Some(srf) = ctx.current_surface() else { return };
        if let Some(layout) = self.layouts.set_layout(&srf, kind) {
            ctx.show_notification(&layout.description());
        }
    }

    /// Offers `command` to the layout of the current surface. Returns true if
    /// the layout consumed it.
    pub fn handle_layout_shortcut(
        &mut self,
        ctx: &mut dyn DriverContext,
        command: &LayoutCommand,
    ) -> bool {
        let Some(srf) = ctx.current_surface() else { return false };
        let mut lctx = self.layout_context(ctx, &srf);
        let handled = self.layouts.current_layout(&srf).handle_shortcut(&mut lctx, command);
        self.run_requests(ctx, lctx.requests);
        handled
    }

    /// Offers `command` to the dock holding `id`.
    pub fn handle_dock_shortcut(&mut self, id: WindowId, command: &LayoutCommand) -> bool {
        let Some(window) = self.windows.get_mut(id) else { return false };
        let Some(srf) = window.surface() else { return false };
        self.docks.handle_shortcut(&srf.id, window, command)
    }

    /// Lets a drag-aware layout reassign `id` while it is being moved.
    /// Returns true if the layout changed.
    pub fn drag(&mut self, ctx: &mut dyn DriverContext, id: WindowId) -> bool {
        let Some(srf) = ctx.current_surface() else { return false };
        let mut lctx = self.layout_context(ctx, &srf);
        let layout = self.layouts.current_layout(&srf);
        if !layout.supports_drag() {
            return false;
        }
        let Some(window) = self.windows.get_mut(id) else { return false };
        if window.is_tiled() {
            window.set_state(WindowState::Dragging);
            lctx.parked.insert(id);
        }
        if window.state() != WindowState::Dragging {
            return false;
        }
        let point = ctx.cursor_position().unwrap_or_else(|| window.actual_geometry().center());
        let changed = layout.drag(&mut lctx, point, id, srf.working_area);
        self.run_requests(ctx, lctx.requests);
        changed
    }

    /// Ends a drag started by [`TilingEngine::drag`]. Returns false if the
    /// window was not being dragged.
    pub fn drop_dragged(&mut self, id: WindowId) -> bool {
        match self.windows.get_mut(id) {
            Some(window) if window.state() == WindowState::Dragging => {
                window.set_state(WindowState::Tiled);
                true
            }
            _ => false,
        }
    }

    /// Keeps the remembered floating placement inside the working area of
    /// the window's surface and centred on it.
    pub fn center_float_geometry(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(id) else { return };
        let Some(srf) = window.surface() else { return };
        let area = srf.working_area;
        let g = &mut window.float_geometry;
        g.width = g.width.min(area.width);
        g.height = g.height.min(area.height);
        g.x = area.x + (area.width - g.width) / 2;
        g.y = area.y + (area.height - g.height) / 2;
    }

    /// Sends a window back through the undecided state, so the next arrange
    /// picks tiled or floating again. Docked windows stay docked.
    pub fn undecide(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(id).filter(|w| !w.is_docked()) {
            window.set_state(WindowState::Undecided);
        }
    }

    pub fn focused(&mut self, id: WindowId, now: u64) {
        if let Some(window) = self.windows.get_mut(id) {
            window.timestamp = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::headless::{HeadlessContext, HeadlessWindow, WindowSpec, test_surface};

    const AREA: Rect = Rect::new(0, 0, 1000, 800);

    struct Setup {
        engine: TilingEngine,
        ctx: HeadlessContext,
        hosts: Vec<HeadlessWindow>,
    }

    impl Setup {
        fn new(config: Config) -> Self {
            let srf = test_surface("DP-1", AREA);
            Self {
                engine: TilingEngine::new(&config),
                ctx: HeadlessContext::new(vec![srf]),
                hosts: Vec::new(),
            }
        }

        fn add(&mut self, spec: WindowSpec) -> WindowId {
            let host = HeadlessWindow::new(spec);
            let mut window = Window::new(Box::new(host.clone()));
            let id = window.id;
            if let Some(srf) = self.ctx.current_surface() {
                window.set_surface(&srf);
            }
            self.hosts.push(host);
            self.engine.manage(window);
            id
        }

        fn add_windows(&mut self, n: u64) {
            for id in 1..=n {
                self.add(WindowSpec::new(id, "app", Rect::new(0, 0, 100, 100)));
            }
        }

        fn arrange(&mut self) { self.engine.arrange(&mut self.ctx) }

        fn geometry(&self, id: u64) -> Rect { self.hosts[id as usize - 1].geometry() }

        fn state(&self, id: u64) -> WindowState {
            self.engine.windows.get(WindowId(id)).map_or(WindowState::Unmanaged, |w| w.state())
        }

        fn srf(&self) -> Surface { test_surface("DP-1", AREA) }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.gaps.left = 10;
        config.gaps.right = 10;
        config.gaps.top = 5;
        config.gaps.bottom = 5;
        config.gaps.between = 8;
        config
    }

    #[test_log::test]
    fn columns_stack_new_windows_in_one_column() {
        let mut s = Setup::new(config());
        s.engine.set_layout(&mut s.ctx, LayoutKind::Columns);
        s.add_windows(3);
        s.arrange();

        let heights: Vec<i32> = (1..=3).map(|id| s.geometry(id).height).collect();
        assert_eq!(heights, vec![258, 258, 258]);
        for id in 1..=3 {
            let g = s.geometry(id);
            assert_eq!((g.x, g.width), (10, 980));
            assert_eq!(s.state(id), WindowState::Tiled);
        }
        assert_eq!(s.geometry(1).y, 5);
        assert_eq!(s.geometry(2).y, 5 + 258 + 8);
    }

    #[test_log::test]
    fn float_all_toggles_back_and_forth() {
        let mut s = Setup::new(Config::default());
        s.add_windows(4);
        s.arrange();
        let tiled: Vec<Rect> = (1..=4).map(|id| s.geometry(id)).collect();

        let srf = s.srf();
        s.engine.float_all(&mut s.ctx, &srf);
        s.arrange();
        for id in 1..=4 {
            assert_eq!(s.state(id), WindowState::Floating);
            assert_eq!(s.geometry(id), tiled[id as usize - 1].inset(FLOAT_ALL_INSET));
        }

        s.engine.float_all(&mut s.ctx, &srf);
        s.arrange();
        assert!((1..=4).all(|id| s.state(id) == WindowState::Tiled));
        assert_eq!(s.ctx.notifications, vec!["Float All".to_string(), "Tile All".to_string()]);
    }

    #[test]
    fn sole_window_without_gaps_fills_the_area() {
        let mut config = config();
        config.layout.sole_window_no_gaps = true;
        let mut s = Setup::new(config);
        s.add_windows(1);
        s.arrange();
        assert_eq!(s.geometry(1), AREA);
    }

    #[test]
    fn sole_window_is_shrunk_and_centred() {
        let mut config = Config::default();
        config.layout.sole_window_width = 50.0;
        let mut s = Setup::new(config);
        s.add_windows(1);
        s.arrange();
        assert_eq!(s.geometry(1), Rect::new(250, 0, 500, 800));

        s.add(WindowSpec::new(2, "app", Rect::new(0, 0, 10, 10)));
        s.arrange();
        assert_eq!(s.geometry(1), Rect::new(0, 0, 500, 800));
    }

    #[test]
    fn monocle_maximize_ignores_gaps() {
        let mut s = Setup::new(config());
        s.engine.set_layout(&mut s.ctx, LayoutKind::Monocle);
        s.add_windows(2);
        s.arrange();
        assert_eq!(s.geometry(1), AREA);
        assert_eq!(s.geometry(2), AREA);
    }

    #[test_log::test]
    fn tiles_too_small_for_their_minimum_float() {
        let mut config = Config::default();
        config.layout.unfit_greater = true;
        let mut s = Setup::new(config);
        s.add_windows(1);
        let mut wide = WindowSpec::new(2, "app", Rect::new(0, 0, 10, 10));
        wide.min_size = crate::sys::geometry::Size::new(700, 100);
        s.add(wide);
        s.arrange();

        assert_eq!(s.state(2), WindowState::Floating);
        assert_eq!(s.geometry(1), AREA);
    }

    #[test]
    fn wide_tiles_are_narrowed_and_centred() {
        let mut config = Config::default();
        config.layout.limit_tile_width_ratio = 0.5;
        let mut s = Setup::new(config);
        s.add_windows(1);
        s.arrange();
        assert_eq!(s.geometry(1), Rect::new(300, 0, 400, 800));
    }

    #[test]
    fn undecided_windows_follow_float_rules() {
        let mut config = Config::default();
        config.behavior.float_default = true;
        let mut s = Setup::new(config);
        s.add_windows(1);
        let mut dialog = WindowSpec::new(2, "dialog", Rect::new(0, 0, 10, 10));
        dialog.float = true;
        s.add(dialog);
        s.arrange();
        assert_eq!(s.state(1), WindowState::Floating);
        assert_eq!(s.state(2), WindowState::Floating);
    }

    #[test]
    fn focus_dir_prefers_the_most_recent_tile() {
        let mut s = Setup::new(Config::default());
        s.add_windows(3);
        s.arrange();
        // Master on the left, 2 and 3 stacked on the right.
        s.engine.focused(WindowId(2), 20);
        s.engine.focused(WindowId(3), 10);
        s.ctx.set_current_window(WindowId(1));
        s.engine.focus_dir(&mut s.ctx, Direction::Right);
        assert_eq!(s.ctx.current_window(), Some(WindowId(2)));

        s.ctx.set_current_window(WindowId(2));
        s.engine.focus_dir(&mut s.ctx, Direction::Down);
        assert_eq!(s.ctx.current_window(), Some(WindowId(3)));
        s.engine.focus_dir(&mut s.ctx, Direction::Right);
        assert_eq!(s.ctx.current_window(), Some(WindowId(3)));
    }

    #[test]
    fn equal_distance_ties_go_to_the_latest_focus() {
        let mut s = Setup::new(Config::default());
        s.add_windows(3);
        s.arrange();
        let srf = s.srf();
        s.engine.focused(WindowId(3), 20);
        s.engine.focused(WindowId(2), 10);
        // 2 and 3 share x, the tie on distance is broken by recency.
        let tiles: Vec<_> = s.engine.windows.visible_tiles(&srf).map(|w| w.geometry.x).collect();
        assert_eq!(tiles, vec![0, 500, 500]);
        assert_eq!(
            s.engine.neighbor_by_direction(&srf, WindowId(1), Direction::Right),
            Some(WindowId(3))
        );
        assert_eq!(s.engine.neighbor_by_direction(&srf, WindowId(1), Direction::Left), None);
    }

    #[test]
    fn focus_order_wraps_and_starts_at_the_first_tile() {
        let mut s = Setup::new(Config::default());
        s.add_windows(3);
        s.arrange();
        s.engine.focus_order(&mut s.ctx, 1);
        assert_eq!(s.ctx.current_window(), Some(WindowId(1)));
        s.engine.focus_order(&mut s.ctx, -1);
        assert_eq!(s.ctx.current_window(), Some(WindowId(3)));
        s.engine.focus_order(&mut s.ctx, 1);
        assert_eq!(s.ctx.current_window(), Some(WindowId(1)));
    }

    #[test]
    fn growing_the_last_tile_moves_its_west_border() {
        let mut s = Setup::new(Config::default());
        s.add_windows(2);
        s.arrange();
        assert_eq!(s.geometry(1).width, 500);

        s.engine.resize_window(WindowId(2), ResizeEdge::East, 1);
        s.arrange();
        assert!(s.geometry(1).width > 500, "{}", s.geometry(1));
        assert_eq!(s.geometry(2).max_x(), 1000);

        s.engine.resize_window(WindowId(1), ResizeEdge::East, -1);
        s.engine.resize_window(WindowId(1), ResizeEdge::East, -1);
        s.arrange();
        assert!(s.geometry(1).width < 500, "{}", s.geometry(1));
    }

    #[test]
    fn floating_windows_resize_by_a_fixed_step() {
        let mut s = Setup::new(Config::default());
        s.add_windows(1);
        s.arrange();
        s.engine.toggle_float(WindowId(1));
        s.arrange();
        assert_eq!(s.geometry(1), Rect::new(0, 0, 100, 100));
        s.engine.resize_window(WindowId(1), ResizeEdge::East, 1);
        assert_eq!(s.geometry(1), Rect::new(0, 0, 150, 100));
        s.engine.move_float(WindowId(1), Direction::Down);
        assert_eq!(s.geometry(1), Rect::new(0, 40, 150, 100));
    }

    #[test]
    fn drifted_tiles_are_put_back_later() {
        let mut s = Setup::new(Config::default());
        s.add_windows(1);
        s.arrange();
        s.hosts[0].move_to(Rect::new(5, 5, 50, 50));
        s.engine.enforce_size(&mut s.ctx, WindowId(1));
        assert_eq!(s.ctx.timeouts, vec![(ENFORCE_SIZE_DELAY, ScheduledTask::EnforceSize(WindowId(1)))]);
        for task in s.ctx.take_timeouts() {
            s.engine.run_task(task);
        }
        assert_eq!(s.geometry(1), AREA);

        s.engine.toggle_float(WindowId(1));
        s.hosts[0].move_to(Rect::new(5, 5, 50, 50));
        s.engine.enforce_size(&mut s.ctx, WindowId(1));
        assert!(s.ctx.timeouts.is_empty());
    }

    #[test]
    fn enforcing_a_window_that_went_floating_does_nothing() {
        let mut s = Setup::new(Config::default());
        s.add_windows(1);
        s.arrange();
        s.hosts[0].move_to(Rect::new(5, 5, 50, 50));
        s.engine.enforce_size(&mut s.ctx, WindowId(1));
        let tasks = s.ctx.take_timeouts();
        assert_eq!(tasks.len(), 1);

        s.engine.toggle_float(WindowId(1));
        let commits = s.hosts[0].commits();
        for task in tasks {
            s.engine.run_task(task);
        }
        assert_eq!(s.hosts[0].commits(), commits);
        assert_eq!(s.geometry(1), Rect::new(5, 5, 50, 50));
        assert_eq!(s.state(1), WindowState::Floating);
    }

    #[test]
    fn swapping_past_the_edge_moves_to_the_next_screen() {
        let mut s = Setup::new(Config::default());
        let second = test_surface("DP-2", Rect::new(1000, 0, 1000, 800));
        s.ctx = HeadlessContext::new(vec![s.srf(), second.clone()]);
        s.add_windows(1);
        s.arrange();
        s.ctx.set_current_window(WindowId(1));

        s.engine.swap_dir_or_move_float(&mut s.ctx, Direction::Right);
        assert_eq!(s.ctx.current_surface(), Some(second.clone()));
        let on = |s: &Setup| {
            s.engine.windows.get(WindowId(1)).and_then(|w| w.surface()).map(|srf| srf.id)
        };
        assert_eq!(on(&s), Some(second.id.clone()));
        s.arrange();
        assert_eq!(s.geometry(1), second.working_area);

        // Nothing lies further right or below.
        s.engine.swap_dir_or_move_float(&mut s.ctx, Direction::Right);
        s.engine.swap_dir_or_move_float(&mut s.ctx, Direction::Down);
        assert_eq!(on(&s), Some(second.id.clone()));

        s.engine.swap_dir_or_move_float(&mut s.ctx, Direction::Left);
        assert_eq!(on(&s), Some(s.srf().id));
        assert_eq!(s.ctx.current_surface(), Some(s.srf()));
    }

    #[test_log::test]
    fn dock_templates_dock_new_windows() {
        let mut config = Config::default();
        config.dock.window_classes.push("panel:l:".into());
        let mut s = Setup::new(config);
        s.add(WindowSpec::new(1, "panel", Rect::new(0, 0, 10, 10)));
        s.add(WindowSpec::new(2, "term", Rect::new(0, 0, 10, 10)));
        s.arrange();

        assert_eq!(s.state(1), WindowState::Docked);
        assert_eq!(s.geometry(1), Rect::new(0, 0, 150, 800));
        assert_eq!(s.geometry(2), Rect::new(150, 0, 850, 800));

        assert!(s.engine.step_dock(WindowId(1), &LayoutCommand::GrowWidth));
        s.arrange();
        assert_eq!(s.geometry(1).width, 160);

        assert!(s.engine.unmanage(WindowId(1)).is_some());
        s.arrange();
        assert_eq!(s.geometry(2), AREA);
    }

    #[test]
    fn ignored_windows_are_not_managed() {
        let mut s = Setup::new(Config::default());
        let mut spec = WindowSpec::new(1, "plasmashell", Rect::new(0, 0, 10, 10));
        spec.ignore = true;
        s.add(spec);
        assert!(s.engine.windows.is_empty());
    }

    #[test]
    fn insertion_follows_new_window_position() {
        let mut config = Config::default();
        config.behavior.new_window_position = NewWindowPosition::BesideFirst;
        let mut s = Setup::new(config);
        s.add_windows(3);
        assert_eq!(s.engine.windows.ids(), vec![WindowId(1), WindowId(3), WindowId(2)]);
    }

    #[test]
    fn full_layouts_push_new_windows_to_the_next_screen() {
        let mut s = Setup::new(Config::default());
        let second = test_surface("DP-2", Rect::new(1000, 0, 1000, 800));
        s.ctx = HeadlessContext::new(vec![s.srf(), second.clone()]);
        s.engine.set_layout(&mut s.ctx, LayoutKind::Quarter);
        s.add_windows(4);
        s.arrange();
        let id = s.add(WindowSpec::new(5, "app", Rect::new(0, 0, 10, 10)));
        s.engine.relocate_overflow(&mut s.ctx, id);

        assert_eq!(s.ctx.current_surface(), Some(second.clone()));
        let window = s.engine.windows.get(id).unwrap();
        assert_eq!(window.surface().map(|srf| srf.id), Some(second.id));
    }

    #[test]
    fn layout_changes_are_announced() {
        let mut s = Setup::new(Config::default());
        s.engine.cycle_layout(&mut s.ctx, 1);
        s.engine.set_layout(&mut s.ctx, LayoutKind::Columns);
        assert_eq!(s.ctx.notifications, vec!["Monocle".to_string(), "Columns".to_string()]);
    }

    #[test]
    fn swap_order_and_direction_reorder_windows() {
        let mut s = Setup::new(Config::default());
        s.add_windows(3);
        s.arrange();
        s.engine.swap_order(WindowId(3), 1);
        assert_eq!(s.engine.windows.ids(), vec![WindowId(3), WindowId(1), WindowId(2)]);

        s.arrange();
        s.ctx.set_current_window(WindowId(3));
        s.engine.swap_dir_or_move_float(&mut s.ctx, Direction::Right);
        assert_eq!(s.engine.windows.ids()[0], WindowId(1));
    }

    #[test]
    fn desktop_changes_keep_docks() {
        let mut s = Setup::new(Config::default());
        s.add_windows(2);
        s.arrange();
        s.engine.toggle_dock(WindowId(2));
        s.engine.undecide(WindowId(1));
        s.engine.undecide(WindowId(2));
        assert_eq!(s.state(1), WindowState::Undecided);
        assert_eq!(s.state(2), WindowState::Docked);
    }
}
