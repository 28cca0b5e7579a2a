use tracing::info;

use crate::actor::reactor::Reactor;
use crate::common::config::DirectionalKeyMode;
use crate::layout_engine::{Direction, LayoutCommand, ResizeEdge};
use crate::sys::driver::DriverContext;

/// Gives the directional shortcuts their meaning for `mode`.
pub fn remap(mode: DirectionalKeyMode, command: LayoutCommand) -> LayoutCommand {
    use LayoutCommand::*;
    match (mode, command) {
        (DirectionalKeyMode::Dwm, FocusUp) => FocusNext,
        (DirectionalKeyMode::Dwm, FocusDown) => FocusPrev,
        (DirectionalKeyMode::Dwm, FocusLeft) => DwmLeft,
        (DirectionalKeyMode::Dwm, FocusRight) => DwmRight,
        (DirectionalKeyMode::Focus, ShiftUp) => SwapUp,
        (DirectionalKeyMode::Focus, ShiftDown) => SwapDown,
        (DirectionalKeyMode::Focus, ShiftLeft) => SwapLeft,
        (DirectionalKeyMode::Focus, ShiftRight) => SwapRight,
        (_, command) => command,
    }
}

pub struct CommandEventHandler;

impl CommandEventHandler {
    /// Offers the command to the dock of the current window, then to the
    /// current layout, and handles it here if neither took it. Always ends
    /// with an arrange.
    pub fn handle_shortcut(reactor: &mut Reactor, ctx: &mut dyn DriverContext, command: LayoutCommand) {
        let command = remap(reactor.engine.behavior().directional_key_mode, command);
        info!(?command);
        let engine = &mut reactor.engine;
        let current = ctx.current_window();
        let docked = current.filter(|&id| engine.windows.get(id).is_some_and(|w| w.is_docked()));

        let consumed = match docked {
            Some(id) => engine.handle_dock_shortcut(id, &command),
            None => false,
        } || engine.handle_layout_shortcut(ctx, &command);
        if consumed {
            engine.arrange(ctx);
            return;
        }

        match command {
            LayoutCommand::FocusNext => engine.focus_order(ctx, 1),
            LayoutCommand::FocusPrev => engine.focus_order(ctx, -1),
            LayoutCommand::FocusUp => engine.focus_dir(ctx, Direction::Up),
            LayoutCommand::FocusDown => engine.focus_dir(ctx, Direction::Down),
            LayoutCommand::FocusLeft | LayoutCommand::DwmLeft => {
                engine.focus_dir(ctx, Direction::Left)
            }
            LayoutCommand::FocusRight | LayoutCommand::DwmRight => {
                engine.focus_dir(ctx, Direction::Right)
            }

            LayoutCommand::GrowWidth
            | LayoutCommand::ShrinkWidth
            | LayoutCommand::GrowHeight
            | LayoutCommand::ShrinkHeight => {
                if let Some(id) = docked {
                    engine.step_dock(id, &command);
                } else if let Some(id) = current {
                    let (edge, step) = match command {
                        LayoutCommand::GrowWidth => (ResizeEdge::East, 1),
                        LayoutCommand::ShrinkWidth => (ResizeEdge::East, -1),
                        LayoutCommand::GrowHeight => (ResizeEdge::South, 1),
                        _ => (ResizeEdge::South, -1),
                    };
                    engine.resize_window(id, edge, step);
                }
            }

            LayoutCommand::ShiftUp => {
                if let Some(id) = current {
                    engine.swap_order(id, -1);
                }
            }
            LayoutCommand::ShiftDown => {
                if let Some(id) = current {
                    engine.swap_order(id, 1);
                }
            }
            LayoutCommand::SwapUp => engine.swap_dir_or_move_float(ctx, Direction::Up),
            LayoutCommand::SwapDown => engine.swap_dir_or_move_float(ctx, Direction::Down),
            LayoutCommand::SwapLeft => engine.swap_dir_or_move_float(ctx, Direction::Left),
            LayoutCommand::SwapRight => engine.swap_dir_or_move_float(ctx, Direction::Right),

            LayoutCommand::SetMaster => {
                if let Some(id) = current {
                    engine.set_master(id);
                }
            }
            LayoutCommand::ToggleFloat => {
                if let Some(id) = current {
                    engine.toggle_float(id);
                }
            }
            LayoutCommand::ToggleFloatAll => {
                if let Some(srf) = ctx.current_surface() {
                    engine.float_all(ctx, &srf);
                }
            }
            LayoutCommand::ToggleDock => {
                if let Some(id) = current {
                    engine.toggle_dock(id);
                }
            }

            LayoutCommand::NextLayout => engine.cycle_layout(ctx, 1),
            LayoutCommand::PreviousLayout => engine.cycle_layout(ctx, -1),
            LayoutCommand::SetLayout(kind) => engine.set_layout(ctx, kind),

            // Only meaningful to layouts, which had their chance above.
            LayoutCommand::ShiftLeft
            | LayoutCommand::ShiftRight
            | LayoutCommand::Increase
            | LayoutCommand::Decrease
            | LayoutCommand::Rotate
            | LayoutCommand::RotatePart => {}
        }
        engine.arrange(ctx);
    }
}
