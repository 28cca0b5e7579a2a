use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::dock::Dock;
use crate::layout_engine::RectDelta;
use crate::sys::driver::{DriverWindow, Surface};
use crate::sys::geometry::{Rect, Size};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display
)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    /// Not known to the engine at all.
    #[default]
    Unmanaged,
    /// Managed, but not yet arranged once.
    Undecided,
    Tiled,
    /// Tileable, but left out of the partition because the layout is full.
    TiledAfloat,
    Floating,
    /// Being moved interactively by a layout that supports drag.
    Dragging,
    Docked,
}

impl WindowState {
    pub fn is_tiled(self) -> bool { self == WindowState::Tiled }

    pub fn is_tileable(self) -> bool {
        matches!(self, WindowState::Tiled | WindowState::TiledAfloat)
    }

    pub fn is_floating(self) -> bool {
        matches!(self, WindowState::Floating | WindowState::TiledAfloat)
    }
}

/// A managed window: the host handle plus everything the engine decides
/// about it.
#[derive(Debug)]
pub struct Window {
    pub id: WindowId,
    handle: Box<dyn DriverWindow>,
    /// Where the engine wants the window while tiled or docked.
    pub geometry: Rect,
    /// Remembered placement while floating.
    pub float_geometry: Rect,
    /// Last focus time, used as a recency tie-break.
    pub timestamp: u64,
    /// Relative share inside stack splits.
    pub weight: f64,
    pub dock: Option<Dock>,
    state: WindowState,
    prev_state: WindowState,
    should_commit_float: bool,
}

impl Window {
    pub fn new(handle: Box<dyn DriverWindow>) -> Self {
        let geometry = handle.geometry();
        Self {
            id: handle.id(),
            handle,
            geometry,
            float_geometry: geometry,
            timestamp: 0,
            weight: 1.0,
            dock: None,
            state: WindowState::Unmanaged,
            prev_state: WindowState::Unmanaged,
            should_commit_float: false,
        }
    }

    pub fn state(&self) -> WindowState { self.state }

    pub fn prev_state(&self) -> WindowState { self.prev_state }

    pub fn set_state(&mut self, value: WindowState) {
        let current = self.state;
        if current == value {
            return;
        }
        if (current == WindowState::Unmanaged || current.is_tileable()) && value.is_floating() {
            self.should_commit_float = true;
        } else if current.is_floating() && value.is_tileable() {
            self.float_geometry = self.actual_geometry();
        }
        trace!(window = %self.id, from = %current, to = %value, "state change");
        self.prev_state = current;
        self.state = value;
    }

    pub fn is_tiled(&self) -> bool { self.state.is_tiled() }

    pub fn is_tileable(&self) -> bool { self.state.is_tileable() }

    pub fn is_floating(&self) -> bool { self.state.is_floating() }

    pub fn is_docked(&self) -> bool { self.state == WindowState::Docked }

    pub fn actual_geometry(&self) -> Rect { self.handle.geometry() }

    /// How far the host geometry is from the engine's target.
    pub fn geometry_delta(&self) -> RectDelta {
        RectDelta::from_rects(self.geometry, self.actual_geometry())
    }

    pub fn class(&self) -> &str { self.handle.class() }

    pub fn min_size(&self) -> Size { self.handle.min_size() }

    pub fn max_size(&self) -> Size { self.handle.max_size() }

    pub fn minimized(&self) -> bool { self.handle.minimized() }

    pub fn maximized(&self) -> bool { self.handle.maximized() }

    pub fn full_screen(&self) -> bool { self.handle.full_screen() }

    pub fn should_ignore(&self) -> bool { self.handle.should_ignore() }

    pub fn should_float(&self) -> bool { self.handle.should_float() }

    pub fn surface(&self) -> Option<Surface> { self.handle.surface() }

    pub fn set_surface(&mut self, surface: &Surface) { self.handle.set_surface(surface) }

    pub fn visible_on(&self, surface: &Surface) -> bool { self.handle.visible_on(surface) }

    /// Commits the state-appropriate geometry to the host.
    pub fn commit(&mut self) {
        match self.state {
            WindowState::Tiled | WindowState::Docked => {
                trace!(window = %self.id, geometry = %self.geometry, "commit");
                self.handle.commit(self.geometry);
            }
            WindowState::Floating | WindowState::TiledAfloat => {
                if self.should_commit_float {
                    trace!(window = %self.id, geometry = %self.float_geometry, "commit float");
                    self.handle.commit(self.float_geometry);
                    self.should_commit_float = false;
                }
            }
            WindowState::Unmanaged | WindowState::Undecided | WindowState::Dragging => {}
        }
    }

    /// Sends `geometry` straight to the host without touching engine state.
    pub fn force_set_geometry(&mut self, geometry: Rect) { self.handle.commit(geometry) }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window({}.{})", self.id.0, self.handle.class())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sys::headless::{HeadlessWindow, WindowSpec};

    fn window(geometry: Rect) -> (Window, HeadlessWindow) {
        let host = HeadlessWindow::new(WindowSpec::new(1, "term", geometry));
        (Window::new(Box::new(host.clone())), host)
    }

    #[test]
    fn floating_remembers_geometry_when_tiled_again() {
        let (mut w, host) = window(Rect::new(0, 0, 100, 100));
        w.set_state(WindowState::Floating);
        host.move_to(Rect::new(50, 50, 200, 200));
        w.set_state(WindowState::Tiled);
        assert_eq!(w.float_geometry, Rect::new(50, 50, 200, 200));
        assert_eq!(w.prev_state(), WindowState::Floating);
    }

    #[test]
    fn float_geometry_is_committed_once() {
        let (mut w, host) = window(Rect::new(0, 0, 100, 100));
        w.set_state(WindowState::Tiled);
        w.geometry = Rect::new(0, 0, 500, 500);
        w.commit();
        assert_eq!(host.geometry(), Rect::new(0, 0, 500, 500));

        w.float_geometry = Rect::new(10, 10, 50, 50);
        w.set_state(WindowState::Floating);
        w.commit();
        assert_eq!(host.geometry(), Rect::new(10, 10, 50, 50));
        host.move_to(Rect::new(30, 30, 50, 50));
        w.commit();
        assert_eq!(host.geometry(), Rect::new(30, 30, 50, 50));
    }

    #[test]
    fn dragging_is_never_committed() {
        let (mut w, host) = window(Rect::new(0, 0, 100, 100));
        w.set_state(WindowState::Dragging);
        w.geometry = Rect::new(1, 1, 1, 1);
        w.commit();
        assert_eq!(host.geometry(), Rect::new(0, 0, 100, 100));
    }
}
