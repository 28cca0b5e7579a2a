use tracing::{debug, trace};

use crate::actor::reactor::{DRAG_FLOAT_DISTANCE, DRAG_THROTTLE_MS, Reactor};
use crate::model::{WindowId, WindowState};
use crate::sys::driver::DriverContext;
use crate::sys::geometry::RectPart;

pub struct DragEventHandler;

impl DragEventHandler {
    pub fn handle_move(reactor: &mut Reactor, ctx: &mut dyn DriverContext, id: WindowId) {
        let now = ctx.now();
        if reactor.drag_complete_time.is_some_and(|t| now.saturating_sub(t) < DRAG_THROTTLE_MS) {
            trace!(window = %id, "drag update throttled");
            return;
        }
        if reactor.engine.drag(ctx, id) {
            reactor.engine.arrange(ctx);
        }
        let dragging = reactor
            .engine
            .windows
            .get(id)
            .is_some_and(|w| w.state() == WindowState::Dragging);
        if dragging {
            reactor.drag_complete_time = Some(now);
        }
    }

    /// The user let go of a window. A dragged tile drops into its new slot, a
    /// tile released over exactly one other tile swaps with it. Otherwise the
    /// tile either floats where it was left or snaps back.
    pub fn handle_move_over(reactor: &mut Reactor, ctx: &mut dyn DriverContext, id: WindowId) {
        let engine = &mut reactor.engine;
        if engine.drop_dragged(id) {
            engine.arrange(ctx);
            return;
        }
        let Some(window) = engine.windows.get(id) else { return };
        if !window.is_tiled() {
            if let Some(window) = engine.windows.get_mut(id) {
                window.commit();
            }
            return;
        }

        if let Some(srf) = ctx.current_surface() {
            let cursor = ctx.cursor_position().unwrap_or_else(|| window.actual_geometry().center());
            let targets: Vec<WindowId> = engine
                .windows
                .visible_tiles(&srf)
                .filter(|t| t.id != id && t.actual_geometry().includes_point(cursor, RectPart::Whole))
                .map(|t| t.id)
                .collect();
            if let [target] = targets[..] {
                debug!(window = %id, %target, "swapping by drag");
                engine.windows.swap(id, target);
                engine.arrange(ctx);
                return;
            }
        }

        if !engine.behavior().keep_tiling_on_drag {
            let Some(window) = engine.windows.get_mut(id) else { return };
            let actual = window.actual_geometry();
            let diff = actual.subtract(&window.geometry);
            let distance = f64::from(diff.x).hypot(f64::from(diff.y));
            if distance > DRAG_FLOAT_DISTANCE {
                debug!(window = %id, distance, "floating by drag");
                window.float_geometry = actual;
                window.set_state(WindowState::Floating);
                engine.arrange(ctx);
                return;
            }
        }

        if let Some(window) = engine.windows.get_mut(id) {
            window.commit();
        }
    }

    pub fn handle_resize(reactor: &mut Reactor, ctx: &mut dyn DriverContext, id: WindowId) {
        let engine = &mut reactor.engine;
        let Some(state) = engine.windows.get(id).map(|w| w.state()) else { return };
        let behavior = engine.behavior();
        if behavior.adjust_layout && behavior.adjust_layout_live && state == WindowState::Tiled {
            engine.adjust_layout(id);
            engine.arrange(ctx);
        } else if state == WindowState::Docked {
            engine.adjust_dock(id);
            engine.arrange(ctx);
        }
    }

    pub fn handle_resize_over(reactor: &mut Reactor, ctx: &mut dyn DriverContext, id: WindowId) {
        let engine = &mut reactor.engine;
        let Some(state) = engine.windows.get(id).map(|w| w.state()) else { return };
        let adjust_layout = engine.behavior().adjust_layout;
        if adjust_layout && state.is_tiled() {
            engine.adjust_layout(id);
            engine.arrange(ctx);
        } else if state == WindowState::Docked {
            engine.adjust_dock(id);
            engine.arrange(ctx);
        } else if !adjust_layout {
            engine.enforce_size(ctx, id);
        }
    }
}
