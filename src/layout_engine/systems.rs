use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use crate::common::collections::HashSet;
use crate::common::config::LayoutSettings;
use crate::layout_engine::{LayoutCommand, RectDelta};
use crate::model::{Window, WindowId};
use crate::sys::geometry::{Point, Rect};

/// Engine services a layout may ask for while it runs. Layouts never touch
/// the window store directly; reorderings are queued as requests and carried
/// out by the engine once the layout returns.
#[derive(Debug, Default)]
pub struct LayoutContext {
    pub current_window: Option<WindowId>,
    /// Visible windows on the surface that are floating or minimized. Layouts
    /// that remember membership keep these around.
    pub parked: HashSet<WindowId>,
    pub requests: Vec<LayoutRequest>,
}

impl LayoutContext {
    pub fn new(current_window: Option<WindowId>) -> Self {
        Self { current_window, ..Default::default() }
    }

    pub fn move_window(&mut self, window: WindowId, target: WindowId, after: bool) {
        self.requests.push(LayoutRequest::MoveWindow { window, target, after });
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutRequest {
    /// Relocate `window` next to `target` in the window order.
    MoveWindow {
        window: WindowId,
        target: WindowId,
        after: bool,
    },
    /// Move focus by this many steps through the visible windows.
    CycleFocus(i32),
    Notify(String),
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumIter
)]
pub enum LayoutKind {
    #[strum(serialize = "TileLayout")]
    Tile,
    #[strum(serialize = "MonocleLayout")]
    Monocle,
    #[strum(serialize = "ThreeColumnLayout")]
    ThreeColumn,
    #[strum(serialize = "SpiralLayout")]
    Spiral,
    #[strum(serialize = "QuarterLayout")]
    Quarter,
    #[strum(serialize = "StackedLayout")]
    Stacked,
    #[strum(serialize = "ColumnsLayout")]
    Columns,
    #[strum(serialize = "SpreadLayout")]
    Spread,
    #[strum(serialize = "FloatingLayout")]
    Floating,
    #[strum(serialize = "StairLayout")]
    Stair,
    #[strum(serialize = "BTreeLayout")]
    BTree,
    #[strum(serialize = "CascadeLayout")]
    Cascade,
}

impl LayoutKind {
    /// Matches `TileLayout`, `tile` and friends, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        use strum::IntoEnumIterator;
        let name = name.trim().to_lowercase();
        LayoutKind::iter().find(|kind| {
            let id = kind.to_string().to_lowercase();
            id == name || id.trim_end_matches("layout") == name
        })
    }

    pub fn is_monocle(self) -> bool { self == LayoutKind::Monocle }

    pub fn create(self, settings: &LayoutSettings) -> LayoutSystemKind {
        match self {
            LayoutKind::Tile => TileLayoutSystem::new(settings).into(),
            LayoutKind::Monocle => MonocleLayoutSystem::default().into(),
            LayoutKind::ThreeColumn => ThreeColumnLayoutSystem::default().into(),
            LayoutKind::Spiral => SpiralLayoutSystem.into(),
            LayoutKind::Quarter => QuarterLayoutSystem::new(settings).into(),
            LayoutKind::Stacked => StackedLayoutSystem::default().into(),
            LayoutKind::Columns => ColumnsLayoutSystem::new(settings).into(),
            LayoutKind::Spread => SpreadLayoutSystem::default().into(),
            LayoutKind::Floating => FloatingLayoutSystem.into(),
            LayoutKind::Stair => StairLayoutSystem::new(settings).into(),
            LayoutKind::BTree => BTreeLayoutSystem.into(),
            LayoutKind::Cascade => CascadeLayoutSystem::default().into(),
        }
    }
}

#[enum_dispatch]
pub trait LayoutSystem {
    fn kind(&self) -> LayoutKind;

    /// Text shown when the layout is selected.
    fn description(&self) -> String { self.kind().to_string().trim_end_matches("Layout").into() }

    /// Most windows the layout places; the rest become `TiledAfloat`.
    fn capacity(&self) -> Option<usize> { None }

    /// Sets the geometry, and where needed the state, of every tile.
    fn apply(
        &mut self,
        ctx: &mut LayoutContext,
        tiles: &mut [&mut Window],
        area: Rect,
        gap: i32,
    );

    fn supports_adjust(&self) -> bool { false }

    fn adjust(
        &mut self,
        _area: Rect,
        _tiles: &mut [&mut Window],
        _basis: WindowId,
        _delta: RectDelta,
        _gap: i32,
    ) {
    }

    /// Returns true if the command was consumed.
    fn handle_shortcut(&mut self, _ctx: &mut LayoutContext, _command: &LayoutCommand) -> bool {
        false
    }

    fn supports_drag(&self) -> bool { false }

    /// Reassigns `window` according to where it was dropped. Returns true if
    /// anything changed.
    fn drag(
        &mut self,
        _ctx: &mut LayoutContext,
        _point: Point,
        _window: WindowId,
        _working_area: Rect,
    ) -> bool {
        false
    }
}

/// Copies the tiles' weights out for the partition helpers.
pub(crate) fn weights_of(tiles: &[&mut Window]) -> Vec<f64> {
    tiles.iter().map(|t| t.weight).collect()
}

pub(crate) fn store_weights(tiles: &mut [&mut Window], weights: &[f64]) {
    for (tile, &weight) in tiles.iter_mut().zip(weights) {
        tile.weight = weight;
    }
}

mod btree;
pub use btree::BTreeLayoutSystem;
mod cascade;
pub use cascade::{CascadeDirection, CascadeLayoutSystem};
mod columns;
pub use columns::ColumnsLayoutSystem;
mod floating;
pub use floating::FloatingLayoutSystem;
mod monocle;
pub use monocle::MonocleLayoutSystem;
mod quarter;
pub use quarter::QuarterLayoutSystem;
mod spiral;
pub use spiral::SpiralLayoutSystem;
mod spread;
pub use spread::SpreadLayoutSystem;
mod stacked;
pub use stacked::StackedLayoutSystem;
mod stair;
pub use stair::StairLayoutSystem;
mod three_column;
pub use three_column::ThreeColumnLayoutSystem;
mod tile;
pub use tile::TileLayoutSystem;

#[derive(Debug, Clone)]
#[enum_dispatch(LayoutSystem)]
pub enum LayoutSystemKind {
    Tile(TileLayoutSystem),
    Monocle(MonocleLayoutSystem),
    ThreeColumn(ThreeColumnLayoutSystem),
    Spiral(SpiralLayoutSystem),
    Quarter(QuarterLayoutSystem),
    Stacked(StackedLayoutSystem),
    Columns(ColumnsLayoutSystem),
    Spread(SpreadLayoutSystem),
    Floating(FloatingLayoutSystem),
    Stair(StairLayoutSystem),
    BTree(BTreeLayoutSystem),
    Cascade(CascadeLayoutSystem),
}
