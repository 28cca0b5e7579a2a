//! Docked windows: up to four edge slots per surface, carved out of the
//! working area before the layout runs.

pub mod config;
mod entry;
pub mod parse;
mod slot;
mod store;

use serde::{Deserialize, Serialize};

pub use config::{DockCfg, DockPosition, EdgeAlignment, HDockAlignment, VDockAlignment};
pub use entry::DockEntry;
pub use slot::DockSlot;
pub use store::DockStore;

use crate::sys::driver::SurfaceId;

/// Dock state carried by a window while it is docked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dock {
    /// Preferred edge. `None` until a slot has been won.
    pub position: Option<DockPosition>,
    pub priority: u32,
    pub cfg: DockCfg,
    /// Clock value of the last arrangement that placed this dock.
    pub rendered_time: Option<u64>,
    pub rendered_surface: Option<SurfaceId>,
}

impl Dock {
    pub fn new(cfg: DockCfg) -> Self {
        Self {
            position: None,
            priority: 0,
            cfg,
            rendered_time: None,
            rendered_surface: None,
        }
    }
}
