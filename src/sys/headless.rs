//! In-memory host used by the tests and by the scenario runner.
//!
//! Windows live in shared cells, so a test can keep a [`HeadlessWindow`]
//! clone around and watch what the engine commits to it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::config::{LayoutSettings, RuleSettings};
use crate::layout_engine::Direction;
use crate::model::WindowId;
use crate::sys::driver::{DriverContext, DriverWindow, ScheduledTask, Surface, SurfaceId};
use crate::sys::geometry::{Point, Rect, Size};

fn unbounded() -> Size { Size::new(i32::MAX, i32::MAX) }

/// Everything the host knows about a window when it appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub id: u64,
    pub class: String,
    #[serde(default)]
    pub title: String,
    pub geometry: Rect,
    /// Output the window opens on. Empty means the current surface.
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub min_size: Size,
    #[serde(default = "unbounded")]
    pub max_size: Size,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub maximized: bool,
    #[serde(default)]
    pub full_screen: bool,
    #[serde(default)]
    pub ignore: bool,
    #[serde(default)]
    pub float: bool,
}

impl WindowSpec {
    pub fn new(id: u64, class: &str, geometry: Rect) -> Self {
        Self {
            id,
            class: class.to_string(),
            title: String::new(),
            geometry,
            output: String::new(),
            min_size: Size::default(),
            max_size: unbounded(),
            minimized: false,
            maximized: false,
            full_screen: false,
            ignore: false,
            float: false,
        }
    }
}

/// Class and title filters deciding which windows float or are left alone.
#[derive(Debug, Clone, Default)]
pub struct WindowRules {
    settings: RuleSettings,
}

impl WindowRules {
    pub fn new(settings: &RuleSettings) -> Self { Self { settings: settings.clone() } }

    pub fn should_ignore(&self, class: &str, title: &str) -> bool {
        let rules = &self.settings;
        class_matches(&rules.ignore_class, class)
            || title_matches(&rules.ignore_title, title)
            || (rules.tile_nothing && !class_matches(&rules.tiling_class, class))
    }

    pub fn should_float(&self, class: &str, title: &str) -> bool {
        class_matches(&self.settings.floating_class, class)
            || title_matches(&self.settings.floating_title, title)
    }

    /// Fills in the rule driven flags of `spec`.
    pub fn apply(&self, spec: &mut WindowSpec) {
        spec.ignore |= self.should_ignore(&spec.class, &spec.title);
        spec.float |= self.should_float(&spec.class, &spec.title);
    }
}

/// `[word]` matches any class containing `word`, anything else must equal
/// the class. Both ignore case.
fn class_matches(filters: &[String], class: &str) -> bool {
    let class = class.to_lowercase();
    filters.iter().map(|f| f.trim().to_lowercase()).filter(|f| !f.is_empty()).any(|filter| {
        match filter.strip_prefix('[').and_then(|f| f.strip_suffix(']')) {
            Some(word) => class.contains(word),
            None => class == filter,
        }
    })
}

fn title_matches(words: &[String], title: &str) -> bool {
    let title = title.to_lowercase();
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .any(|word| !word.is_empty() && title.contains(&word))
}

#[derive(Debug)]
struct HostWindow {
    geometry: Rect,
    min_size: Size,
    max_size: Size,
    minimized: bool,
    maximized: bool,
    full_screen: bool,
    ignore: bool,
    float: bool,
    surface: Option<Surface>,
    commits: usize,
}

#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    id: WindowId,
    class: String,
    title: String,
    host: Rc<RefCell<HostWindow>>,
}

impl HeadlessWindow {
    pub fn new(spec: WindowSpec) -> Self {
        Self {
            id: WindowId(spec.id),
            class: spec.class,
            title: spec.title,
            host: Rc::new(RefCell::new(HostWindow {
                geometry: spec.geometry,
                min_size: spec.min_size,
                max_size: spec.max_size,
                minimized: spec.minimized,
                maximized: spec.maximized,
                full_screen: spec.full_screen,
                ignore: spec.ignore,
                float: spec.float,
                surface: None,
                commits: 0,
            })),
        }
    }

    /// Simulates the user or the application moving the window.
    pub fn move_to(&self, geometry: Rect) { self.host.borrow_mut().geometry = geometry }

    pub fn geometry(&self) -> Rect { self.host.borrow().geometry }

    pub fn set_minimized(&self, minimized: bool) { self.host.borrow_mut().minimized = minimized }

    pub fn set_maximized(&self, maximized: bool) { self.host.borrow_mut().maximized = maximized }

    /// Number of geometry commits received so far.
    pub fn commits(&self) -> usize { self.host.borrow().commits }
}

impl DriverWindow for HeadlessWindow {
    fn id(&self) -> WindowId { self.id }

    fn class(&self) -> &str { &self.class }

    fn title(&self) -> &str { &self.title }

    fn geometry(&self) -> Rect { self.host.borrow().geometry }

    fn min_size(&self) -> Size { self.host.borrow().min_size }

    fn max_size(&self) -> Size { self.host.borrow().max_size }

    fn full_screen(&self) -> bool { self.host.borrow().full_screen }

    fn maximized(&self) -> bool { self.host.borrow().maximized }

    fn minimized(&self) -> bool { self.host.borrow().minimized }

    fn should_ignore(&self) -> bool { self.host.borrow().ignore }

    fn should_float(&self) -> bool { self.host.borrow().float }

    fn surface(&self) -> Option<Surface> { self.host.borrow().surface.clone() }

    fn set_surface(&mut self, surface: &Surface) {
        self.host.borrow_mut().surface = Some(surface.clone());
    }

    fn visible_on(&self, surface: &Surface) -> bool {
        let host = self.host.borrow();
        !host.minimized && host.surface.as_ref().is_some_and(|s| s.id == surface.id)
    }

    fn commit(&mut self, geometry: Rect) {
        let mut host = self.host.borrow_mut();
        host.geometry = geometry;
        host.commits += 1;
    }
}

/// Surface of `output` scoped the way the layout settings ask for.
pub fn surface(
    output: &str,
    activity: &str,
    desktop: &str,
    working_area: Rect,
    settings: &LayoutSettings,
) -> Surface {
    Surface {
        id: SurfaceId::compose(
            output,
            activity,
            desktop,
            settings.layout_per_activity,
            settings.layout_per_desktop,
        ),
        output: output.to_string(),
        activity: activity.to_string(),
        desktop: desktop.to_string(),
        working_area,
        ignore: false,
    }
}

/// A surface identified by its output name alone.
pub fn test_surface(output: &str, working_area: Rect) -> Surface {
    Surface {
        id: SurfaceId::new(output),
        output: output.to_string(),
        activity: String::new(),
        desktop: String::new(),
        working_area,
        ignore: false,
    }
}

#[derive(Debug, Default)]
pub struct HeadlessContext {
    screens: Vec<Surface>,
    current_surface: usize,
    current_window: Option<WindowId>,
    pub cursor: Option<Point>,
    pub clock: u64,
    pub timeouts: Vec<(Duration, ScheduledTask)>,
    pub notifications: Vec<String>,
}

impl HeadlessContext {
    pub fn new(screens: Vec<Surface>) -> Self { Self { screens, ..Default::default() } }

    pub fn advance(&mut self, millis: u64) { self.clock += millis }

    /// Hands back every scheduled task, oldest first.
    pub fn take_timeouts(&mut self) -> Vec<ScheduledTask> {
        self.timeouts.drain(..).map(|(_, task)| task).collect()
    }

    pub fn surface_for_output(&self, output: &str) -> Option<&Surface> {
        self.screens.iter().find(|s| s.output == output)
    }
}

impl DriverContext for HeadlessContext {
    fn screens(&self) -> Vec<Surface> { self.screens.clone() }

    fn current_surface(&self) -> Option<Surface> {
        self.screens.get(self.current_surface).cloned()
    }

    fn set_current_surface(&mut self, surface: &Surface) {
        if let Some(idx) = self.screens.iter().position(|s| s.id == surface.id) {
            self.current_surface = idx;
        }
    }

    fn next_surface(&self, surface: &Surface) -> Option<Surface> {
        let idx = self.screens.iter().position(|s| s.id == surface.id)?;
        self.screens.get(idx + 1).cloned()
    }

    fn surface_towards(&self, surface: &Surface, dir: Direction) -> Option<Surface> {
        let idx = self.screens.iter().position(|s| s.id == surface.id)?;
        let area = surface.working_area;
        let overlaps = |other: &Rect| area.x < other.max_x() && other.x < area.max_x();
        match dir {
            Direction::Left => idx.checked_sub(1).and_then(|prev| self.screens.get(prev)).cloned(),
            Direction::Right => self.screens.get(idx + 1).cloned(),
            Direction::Up => self
                .screens
                .iter()
                .filter(|s| s.working_area.max_y() <= area.y && overlaps(&s.working_area))
                .max_by_key(|s| s.working_area.max_y())
                .cloned(),
            Direction::Down => self
                .screens
                .iter()
                .filter(|s| s.working_area.y >= area.max_y() && overlaps(&s.working_area))
                .min_by_key(|s| s.working_area.y)
                .cloned(),
        }
    }

    fn current_window(&self) -> Option<WindowId> { self.current_window }

    fn set_current_window(&mut self, window: WindowId) { self.current_window = Some(window) }

    fn cursor_position(&self) -> Option<Point> { self.cursor }

    fn now(&self) -> u64 { self.clock }

    fn set_timeout(&mut self, delay: Duration, task: ScheduledTask) {
        self.timeouts.push((delay, task));
    }

    fn show_notification(&mut self, text: &str) {
        info!("{text}");
        self.notifications.push(text.to_string());
    }
}
