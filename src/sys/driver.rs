//! The boundary between the engine and whatever hosts the windows.
//!
//! An adapter turns native windows and screens into [`DriverWindow`] handles
//! and [`Surface`] values, feeds events to the reactor and receives geometry
//! commits back through the same handles.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout_engine::Direction;
use crate::model::WindowId;
use crate::sys::geometry::{Point, Rect, Size};

/// Stable surface identity: `output`, then `@activity` and `#desktop` when
/// layouts are kept per activity or per desktop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

    pub fn compose(
        output: &str,
        activity: &str,
        desktop: &str,
        per_activity: bool,
        per_desktop: bool,
    ) -> Self {
        let mut path = output.to_string();
        if per_activity {
            path.push('@');
            path.push_str(activity);
        }
        if per_desktop {
            path.push('#');
            path.push_str(desktop);
        }
        Self(path)
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// One placement domain as reported by the adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    pub id: SurfaceId,
    pub output: String,
    pub activity: String,
    pub desktop: String,
    /// Usable area, already excluding panels and other host chrome.
    pub working_area: Rect,
    /// Ignored surfaces always float everything and keep no layout state.
    pub ignore: bool,
}

/// Work the engine asks the host to run later. The host hands it back to
/// [`crate::actor::reactor::Reactor::handle_event`] when the delay expires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledTask {
    /// Re-commit a tiled window whose geometry drifted.
    EnforceSize(WindowId),
}

/// Capabilities of a single host window.
pub trait DriverWindow: fmt::Debug {
    fn id(&self) -> WindowId;

    /// Window class used to match dock templates and window rules.
    fn class(&self) -> &str;

    fn title(&self) -> &str;

    /// Geometry as last observed from the host.
    fn geometry(&self) -> Rect;

    fn min_size(&self) -> Size;

    fn max_size(&self) -> Size;

    fn full_screen(&self) -> bool;

    fn maximized(&self) -> bool;

    fn minimized(&self) -> bool;

    fn should_ignore(&self) -> bool;

    fn should_float(&self) -> bool;

    /// Surface the window currently lives on, if the host can tell.
    fn surface(&self) -> Option<Surface>;

    fn set_surface(&mut self, surface: &Surface);

    fn visible_on(&self, surface: &Surface) -> bool;

    /// Ask the host to move/resize the window.
    fn commit(&mut self, geometry: Rect);
}

/// Capabilities of the host as a whole.
pub trait DriverContext {
    fn screens(&self) -> Vec<Surface>;

    fn current_surface(&self) -> Option<Surface>;

    fn set_current_surface(&mut self, surface: &Surface);

    /// Surface following `surface` when a layout is full, if any.
    fn next_surface(&self, surface: &Surface) -> Option<Surface>;

    /// Screen adjacent to `surface` in `dir`. Left and right follow the
    /// screen order, up and down the screen geometry.
    fn surface_towards(&self, surface: &Surface, dir: Direction) -> Option<Surface>;

    fn current_window(&self) -> Option<WindowId>;

    fn set_current_window(&mut self, window: WindowId);

    fn cursor_position(&self) -> Option<Point>;

    /// Milliseconds on a monotonic clock.
    fn now(&self) -> u64;

    fn set_timeout(&mut self, delay: Duration, task: ScheduledTask);

    fn show_notification(&mut self, text: &str);
}
