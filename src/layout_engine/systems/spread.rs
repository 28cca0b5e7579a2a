use crate::layout_engine::LayoutCommand;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutSystem};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

const DEFAULT_SPACE: f64 = 0.07;
const MIN_SPACE: f64 = 0.04;
const MAX_SPACE: f64 = 0.10;
const SPACE_STEP: f64 = 0.01;
/// Cards never get narrower than this share of the area.
const MIN_CARD_WIDTH: f64 = 0.4;

/// Full-height cards fanned out from the right, each leaving a strip of the
/// one below visible.
#[derive(Debug, Clone)]
pub struct SpreadLayoutSystem {
    /// Visible strip of each card as a share of the area width.
    space: f64,
}

impl Default for SpreadLayoutSystem {
    fn default() -> Self { Self { space: DEFAULT_SPACE } }
}

impl SpreadLayoutSystem {
    pub fn space(&self) -> f64 { self.space }
}

impl LayoutSystem for SpreadLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Spread }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, _gap: i32) {
        let strip = (f64::from(area.width) * self.space).floor() as i32;
        let min_card = (f64::from(area.width) * MIN_CARD_WIDTH).floor() as i32;
        let mut fanned = tiles.len() as i32;
        let mut card = area.width - strip * (fanned - 1).max(0);
        while card < min_card && fanned > 1 {
            card += strip;
            fanned -= 1;
        }
        // Cards past the fan pile up under the last one.
        for (i, tile) in tiles.iter_mut().enumerate() {
            let i = i as i32;
            let offset = if i < fanned { strip * (fanned - i - 1) } else { 0 };
            tile.set_state(WindowState::Tiled);
            tile.geometry = Rect::new(area.x + offset, area.y, card, area.height);
        }
    }

    fn handle_shortcut(&mut self, _ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::Decrease => self.space = (self.space - SPACE_STEP).max(MIN_SPACE),
            LayoutCommand::Increase => self.space = (self.space + SPACE_STEP).min(MAX_SPACE),
            _ => return false,
        }
        true
    }
}
