use tracing::warn;

use crate::common::collections::HashMap;
use crate::common::config::{DockOrder, DockSettings};
use crate::dock::parse::{SurfaceDockCfg, parse_class_line, parse_surface_line};
use crate::dock::{Dock, DockCfg, DockEntry};
use crate::layout_engine::LayoutCommand;
use crate::model::{Window, WindowId, WindowState};
use crate::sys::driver::{Surface, SurfaceId};
use crate::sys::geometry::Rect;

/// Dock entries of every surface plus the templates new docks are cloned
/// from.
#[derive(Debug, Clone)]
pub struct DockStore {
    entries: HashMap<SurfaceId, DockEntry>,
    default_cfg: DockCfg,
    order: DockOrder,
    surfaces: Vec<SurfaceDockCfg>,
    classes: HashMap<String, Dock>,
}

impl DockStore {
    /// Parses the override lines once. Broken lines are reported and skipped.
    pub fn new(settings: &DockSettings) -> Self {
        let default_cfg = DockCfg::from_settings(settings);

        let mut surfaces = Vec::new();
        for line in &settings.surfaces {
            match parse_surface_line(line, &default_cfg) {
                Ok(Some(cfg)) => surfaces.push(cfg),
                Ok(None) => {}
                Err(err) => warn!("invalid dock surface config: {err}"),
            }
        }

        let mut classes = HashMap::default();
        for line in &settings.window_classes {
            match parse_class_line(line, &default_cfg) {
                Ok((class, dock)) => {
                    classes.insert(class, dock);
                }
                Err(err) => warn!("invalid dock window class config: {err}"),
            }
        }

        Self {
            entries: HashMap::default(),
            default_cfg,
            order: settings.order,
            surfaces,
            classes,
        }
    }

    /// Whether windows of `class` start out docked.
    pub fn has_template(&self, class: &str) -> bool { self.classes.contains_key(class) }

    pub fn entry(&self, surface: &SurfaceId) -> Option<&DockEntry> { self.entries.get(surface) }

    /// Places the docked windows among `visibles` and returns the area left
    /// for tiling.
    pub fn render(&mut self, surface: &Surface, visibles: &mut [&mut Window], now: u64) -> Rect {
        let working_area = surface.working_area;
        if !self.entries.contains_key(&surface.id) {
            let cfg = self.surface_cfg(surface);
            self.entries.insert(surface.id.clone(), DockEntry::new(surface.id.clone(), cfg, &self.order));
        }

        let mut docked: Vec<&mut Window> = Vec::new();
        for window in visibles.iter_mut() {
            if window.state() != WindowState::Docked {
                continue;
            }
            if window.dock.is_none() {
                window.dock = self.classes.get(window.class()).cloned();
            }
            docked.push(&mut **window);
        }
        if docked.is_empty() {
            if let Some(entry) = self.entries.get_mut(&surface.id) {
                entry.clear();
            }
            return working_area;
        }

        match self.entries.get_mut(&surface.id) {
            Some(entry) => entry.arrange(&mut docked, working_area, now),
            None => working_area,
        }
    }

    pub fn remove(&mut self, window: WindowId) {
        for entry in self.entries.values_mut() {
            entry.remove(window);
        }
    }

    pub fn handle_shortcut(
        &mut self,
        surface: &SurfaceId,
        window: &mut Window,
        command: &LayoutCommand,
    ) -> bool {
        match self.entries.get_mut(surface) {
            Some(entry) => entry.handle_shortcut(window, command),
            None => false,
        }
    }

    fn surface_cfg(&self, surface: &Surface) -> DockCfg {
        self.surfaces
            .iter()
            .find(|s| s.selector.matches(&surface.output, &surface.activity, &surface.desktop))
            .map_or(self.default_cfg, |s| s.cfg)
    }
}
