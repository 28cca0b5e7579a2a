use tracing::debug;

use crate::common::collections::HashMap;
use crate::common::config::LayoutSettings;
use crate::common::parse::split_fields;
use crate::layout_engine::systems::{
    FloatingLayoutSystem, LayoutKind, LayoutSystem, LayoutSystemKind,
};
use crate::sys::driver::{Surface, SurfaceId};

/// Active layout of one surface. Layout objects are created on first use and
/// kept, so their ratios survive switching back and forth.
#[derive(Debug, Clone)]
pub struct LayoutStoreEntry {
    /// Position of `current` in the cycle, if it is part of it.
    current_index: Option<usize>,
    current: LayoutKind,
    previous: LayoutKind,
    layouts: HashMap<LayoutKind, LayoutSystemKind>,
}

impl LayoutStoreEntry {
    fn new(surface: &Surface, order: &[LayoutKind], defaults: &[String]) -> Self {
        let index = defaults
            .iter()
            .find_map(|line| default_layout_index(line, surface, order))
            .unwrap_or(0);
        let current = order.get(index).copied().unwrap_or(LayoutKind::Tile);
        debug!(surface = %surface.id, layout = %current, "new layout entry");
        Self {
            current_index: Some(index),
            current,
            previous: current,
            layouts: HashMap::default(),
        }
    }

    pub fn current_kind(&self) -> LayoutKind { self.current }

    pub fn previous_kind(&self) -> LayoutKind { self.previous }

    fn load(&mut self, kind: LayoutKind, settings: &LayoutSettings) -> &mut LayoutSystemKind {
        self.layouts.entry(kind).or_insert_with(|| kind.create(settings))
    }

    fn cycle(&mut self, step: i32, order: &[LayoutKind]) {
        self.previous = self.current;
        let len = order.len().max(1) as i32;
        let index = match self.current_index {
            Some(index) => (index as i32 + step).rem_euclid(len) as usize,
            None => 0,
        };
        self.current_index = Some(index);
        self.current = order.get(index).copied().unwrap_or(LayoutKind::Tile);
    }

    fn set(&mut self, target: LayoutKind, order: &[LayoutKind]) {
        if target.is_monocle() && self.current.is_monocle() {
            self.current = self.previous;
            self.previous = target;
        } else if self.current != target {
            self.previous = self.current;
            self.current = target;
        }
        self.current_index = order.iter().position(|&kind| kind == self.current);
    }
}

/// Picks the layout index a `screen_default_layout` line gives `surface`, if
/// the line matches it. Lines are `output:layout`, `output:desktop:layout`
/// or `output:activity:desktop:layout`.
fn default_layout_index(line: &str, surface: &Surface, order: &[LayoutKind]) -> Option<usize> {
    let fields = split_fields(line);
    let (output, activity, desktop, layout) = match fields[..] {
        [output, layout] => (output, "", "", layout),
        [output, desktop, layout] => (output, "", desktop, layout),
        [output, activity, desktop, layout] => (output, activity, desktop, layout),
        _ => return None,
    };

    let matches = (output.is_empty() || output == surface.output)
        && (activity.is_empty() || activity == surface.activity)
        && (desktop.is_empty() || desktop == surface.desktop);
    if !matches {
        return None;
    }

    let index = match layout.parse::<usize>() {
        Ok(index) => index,
        Err(_) => {
            let kind = LayoutKind::from_name(layout)?;
            order.iter().position(|&k| k == kind)?
        }
    };
    (index < order.len()).then_some(index)
}

/// One [`LayoutStoreEntry`] per surface id, created when the surface is
/// first seen. Ignored surfaces never get an entry and always float.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    entries: HashMap<SurfaceId, LayoutStoreEntry>,
    order: Vec<LayoutKind>,
    settings: LayoutSettings,
    floating: LayoutSystemKind,
}

impl LayoutStore {
    pub fn new(settings: &LayoutSettings) -> Self {
        Self {
            entries: HashMap::default(),
            order: settings.order.enabled(),
            settings: settings.clone(),
            floating: FloatingLayoutSystem.into(),
        }
    }

    pub fn order(&self) -> &[LayoutKind] { &self.order }

    fn entry(&mut self, surface: &Surface) -> &mut LayoutStoreEntry {
        let order = &self.order;
        let defaults = &self.settings.screen_default_layout;
        self.entries
            .entry(surface.id.clone())
            .or_insert_with(|| LayoutStoreEntry::new(surface, order, defaults))
    }

    pub fn current_kind(&mut self, surface: &Surface) -> LayoutKind {
        if surface.ignore {
            return LayoutKind::Floating;
        }
        self.entry(surface).current_kind()
    }

    pub fn current_layout(&mut self, surface: &Surface) -> &mut LayoutSystemKind {
        if surface.ignore {
            return &mut self.floating;
        }
        let kind = self.entry(surface).current;
        let settings = &self.settings;
        let entry = self.entries.get_mut(&surface.id);
        match entry {
            Some(entry) => entry.load(kind, settings),
            None => &mut self.floating,
        }
    }

    /// Moves `step` places through the enabled layouts, wrapping around.
    pub fn cycle_layout(&mut self, surface: &Surface, step: i32) -> Option<&mut LayoutSystemKind> {
        if surface.ignore {
            return None;
        }
        let order = self.order.clone();
        self.entry(surface).cycle(step, &order);
        Some(self.current_layout(surface))
    }

    /// Selects `kind`. Selecting monocle while it is active goes back to the
    /// layout that was active before.
    pub fn set_layout(
        &mut self,
        surface: &Surface,
        kind: LayoutKind,
    ) -> Option<&mut LayoutSystemKind> {
        if surface.ignore {
            return None;
        }
        let order = self.order.clone();
        self.entry(surface).set(kind, &order);
        Some(self.current_layout(surface))
    }
}
