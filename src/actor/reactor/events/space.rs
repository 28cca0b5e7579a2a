use tracing::debug;

use crate::actor::reactor::Reactor;
use crate::sys::driver::DriverContext;

pub struct SpaceEventHandler;

impl SpaceEventHandler {
    /// Screens, the current surface or the activity changed. Surfaces seen
    /// for the first time get their layout entry on this arrange.
    pub fn handle_surfaces_changed(reactor: &mut Reactor, ctx: &mut dyn DriverContext) {
        let current = ctx.current_surface().map(|s| s.id);
        debug!(screens = ctx.screens().len(), ?current, "surfaces changed");
        reactor.engine.arrange(ctx);
    }
}
