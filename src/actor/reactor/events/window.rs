use tracing::{debug, info};

use crate::actor::reactor::{Reactor, ReactorError};
use crate::model::{Window, WindowId};
use crate::sys::driver::{DriverContext, DriverWindow};

pub struct WindowEventHandler;

impl WindowEventHandler {
    pub fn handle_window_added(
        reactor: &mut Reactor,
        ctx: &mut dyn DriverContext,
        handle: Box<dyn DriverWindow>,
    ) -> Result<(), ReactorError> {
        let mut window = Window::new(handle);
        let id = window.id;
        if reactor.engine.windows.contains(id) {
            return Err(ReactorError::DuplicateWindow(id));
        }
        if window.surface().is_none() {
            if let Some(srf) = ctx.current_surface() {
                window.set_surface(&srf);
            }
        }
        info!(window = %window, "window added");

        if reactor.engine.manage(window) {
            reactor.engine.relocate_overflow(ctx, id);
        }
        reactor.engine.arrange(ctx);
        Ok(())
    }

    pub fn handle_window_removed(reactor: &mut Reactor, ctx: &mut dyn DriverContext, id: WindowId) {
        match reactor.engine.unmanage(id) {
            Some(window) => info!(window = %window, "window removed"),
            None => debug!(window = %id, "removed window was not managed"),
        }
        reactor.engine.arrange(ctx);
    }

    pub fn handle_window_changed(
        reactor: &mut Reactor,
        ctx: &mut dyn DriverContext,
        id: WindowId,
        unminimized: bool,
    ) {
        if !reactor.engine.windows.contains(id) {
            return;
        }
        if unminimized {
            ctx.set_current_window(id);
        }
        reactor.engine.center_float_geometry(id);
        reactor.engine.arrange(ctx);
    }

    /// The window moved to other desktops, so its state is decided again.
    pub fn handle_desktops_changed(
        reactor: &mut Reactor,
        ctx: &mut dyn DriverContext,
        id: WindowId,
    ) {
        reactor.engine.undecide(id);
        reactor.engine.arrange(ctx);
    }
}
