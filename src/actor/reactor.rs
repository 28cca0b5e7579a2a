//! The reactor turns host notifications into engine operations.
//!
//! Every event runs to completion before the next one starts. An event that
//! arrives while another one is still being handled, for example because a
//! geometry commit made the host report a move synchronously, is dropped.

mod error;
mod events;
pub mod replay;

pub use error::ReactorError;
use events::command::CommandEventHandler;
use events::drag::DragEventHandler;
use events::space::SpaceEventHandler;
use events::window::WindowEventHandler;
pub use replay::{Placement, Scenario, Step, replay};
use tracing::{debug, trace};

use crate::common::config::Config;
use crate::layout_engine::{LayoutCommand, TilingEngine};
use crate::model::WindowId;
use crate::sys::driver::{DriverContext, DriverWindow, ScheduledTask};

/// Drag updates closer together than this are skipped.
pub const DRAG_THROTTLE_MS: u64 = 100;
/// A tile dropped further than this from its slot floats, unless tiles are
/// kept on drag.
pub const DRAG_FLOAT_DISTANCE: f64 = 30.0;

#[derive(Debug)]
pub enum Event {
    /// A window appeared. The handle stays with the engine until the window
    /// is removed.
    WindowAdded(Box<dyn DriverWindow>),
    WindowRemoved(WindowId),

    MoveStart(WindowId),
    /// The window is being dragged.
    Move(WindowId),
    MoveOver(WindowId),
    ResizeStart(WindowId),
    Resize(WindowId),
    ResizeOver(WindowId),

    MaximizeChanged(WindowId),
    /// The host moved or resized the window on its own.
    GeometryChanged(WindowId),
    /// Minimized state or another property changed.
    WindowChanged {
        window: WindowId,
        unminimized: bool,
    },
    Focused(WindowId),
    DesktopsChanged(WindowId),

    /// Screens were added, removed or resized.
    SurfaceUpdate,
    CurrentSurfaceChanged,
    ActivityChanged,

    Shortcut(LayoutCommand),
    /// A task the engine scheduled earlier is due.
    Scheduled(ScheduledTask),
}

pub struct Reactor {
    engine: TilingEngine,
    busy: bool,
    /// When the last drag update was handled, in host milliseconds.
    drag_complete_time: Option<u64>,
}

impl Reactor {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: TilingEngine::new(config),
            busy: false,
            drag_complete_time: None,
        }
    }

    pub fn engine(&self) -> &TilingEngine { &self.engine }

    pub fn engine_mut(&mut self) -> &mut TilingEngine { &mut self.engine }

    pub fn handle_event(
        &mut self,
        ctx: &mut dyn DriverContext,
        event: Event,
    ) -> Result<(), ReactorError> {
        self.guarded(ctx, |reactor, ctx| reactor.dispatch(ctx, event)).unwrap_or(Ok(()))
    }

    /// Runs `f` unless another handler is already running, in which case
    /// nothing happens and `None` is returned.
    pub fn guarded<R>(
        &mut self,
        ctx: &mut dyn DriverContext,
        f: impl FnOnce(&mut Self, &mut dyn DriverContext) -> R,
    ) -> Option<R> {
        if self.busy {
            debug!("handler already running, dropping event");
            return None;
        }
        self.busy = true;
        let result = f(self, ctx);
        self.busy = false;
        Some(result)
    }

    fn dispatch(&mut self, ctx: &mut dyn DriverContext, event: Event) -> Result<(), ReactorError> {
        trace!(?event, "handling");
        match event {
            Event::WindowAdded(handle) => {
                return WindowEventHandler::handle_window_added(self, ctx, handle);
            }
            Event::WindowRemoved(id) => WindowEventHandler::handle_window_removed(self, ctx, id),
            Event::MoveStart(_) | Event::ResizeStart(_) => {}
            Event::Move(id) => DragEventHandler::handle_move(self, ctx, id),
            Event::MoveOver(id) => DragEventHandler::handle_move_over(self, ctx, id),
            Event::Resize(id) => DragEventHandler::handle_resize(self, ctx, id),
            Event::ResizeOver(id) => DragEventHandler::handle_resize_over(self, ctx, id),
            Event::MaximizeChanged(_) => self.engine.arrange(ctx),
            Event::GeometryChanged(id) => self.engine.enforce_size(ctx, id),
            Event::WindowChanged { window, unminimized } => {
                WindowEventHandler::handle_window_changed(self, ctx, window, unminimized)
            }
            Event::Focused(id) => self.engine.focused(id, ctx.now()),
            Event::DesktopsChanged(id) => WindowEventHandler::handle_desktops_changed(self, ctx, id),
            Event::SurfaceUpdate | Event::CurrentSurfaceChanged | Event::ActivityChanged => {
                SpaceEventHandler::handle_surfaces_changed(self, ctx)
            }
            Event::Shortcut(command) => CommandEventHandler::handle_shortcut(self, ctx, command),
            Event::Scheduled(task) => {
                self.engine.run_task(task);
            }
        }
        Ok(())
    }
}
