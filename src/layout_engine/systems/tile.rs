use crate::common::config::LayoutSettings;
use crate::layout_engine::parts::{HalfSplitPart, LayoutPart, RotatePart, StackPart};
use crate::layout_engine::systems::{
    LayoutContext, LayoutKind, LayoutRequest, LayoutSystem, store_weights, weights_of,
};
use crate::layout_engine::utils::{clip, slide};
use crate::layout_engine::{LayoutCommand, RectDelta};
use crate::model::{Window, WindowId, WindowState};
use crate::sys::geometry::Rect;

const MIN_MASTER_RATIO: f64 = 0.2;
const MAX_MASTER_RATIO: f64 = 0.8;
const MAX_MASTERS: usize = 10;
const RATIO_STEP: f64 = 0.05;

type TileParts = RotatePart<HalfSplitPart<RotatePart<StackPart>, StackPart>>;

/// Master area plus a stack of the remaining windows.
#[derive(Debug, Clone)]
pub struct TileLayoutSystem {
    parts: TileParts,
}

impl TileLayoutSystem {
    pub fn new(settings: &LayoutSettings) -> Self {
        let mut parts = RotatePart::new(HalfSplitPart::new(
            RotatePart::new(StackPart),
            StackPart,
        ));
        parts.angle = settings.tile_initial_angle;
        Self { parts }
    }

    pub fn master_ratio(&self) -> f64 { self.parts.inner.ratio }

    pub fn num_master(&self) -> usize { self.parts.inner.primary_size }

    fn step_ratio(&mut self, step: f64) {
        let ratio = slide(self.parts.inner.ratio, step);
        self.parts.inner.ratio = clip(ratio, MIN_MASTER_RATIO, MAX_MASTER_RATIO);
    }
}

impl LayoutSystem for TileLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Tile }

    fn description(&self) -> String { format!("Tile [{}]", self.num_master()) }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, gap: i32) {
        let rects = self.parts.apply(area, &weights_of(tiles), gap);
        for (tile, rect) in tiles.iter_mut().zip(rects) {
            tile.set_state(WindowState::Tiled);
            tile.geometry = rect;
        }
    }

    fn supports_adjust(&self) -> bool { true }

    fn adjust(
        &mut self,
        area: Rect,
        tiles: &mut [&mut Window],
        basis: WindowId,
        delta: RectDelta,
        gap: i32,
    ) {
        let Some(idx) = tiles.iter().position(|t| t.id == basis) else { return };
        let mut weights = weights_of(tiles);
        self.parts.adjust(area, &mut weights, idx, delta, gap);
        store_weights(tiles, &weights);
    }

    fn handle_shortcut(&mut self, ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::DwmLeft => self.step_ratio(-RATIO_STEP),
            LayoutCommand::DwmRight => self.step_ratio(RATIO_STEP),
            LayoutCommand::Increase => {
                if self.parts.inner.primary_size < MAX_MASTERS {
                    self.parts.inner.primary_size += 1;
                }
                ctx.requests.push(LayoutRequest::Notify(self.description()));
            }
            LayoutCommand::Decrease => {
                if self.parts.inner.primary_size > 0 {
                    self.parts.inner.primary_size -= 1;
                }
                ctx.requests.push(LayoutRequest::Notify(self.description()));
            }
            LayoutCommand::Rotate => self.parts.rotate_cw(),
            LayoutCommand::RotatePart => self.parts.inner.primary.rotate_cw(),
            _ => return false,
        }
        true
    }
}
