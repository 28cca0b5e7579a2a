use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::layout_engine::LayoutCommand;
use crate::layout_engine::systems::{LayoutContext, LayoutKind, LayoutRequest, LayoutSystem};
use crate::model::{Window, WindowState};
use crate::sys::geometry::Rect;

const STEP: i32 = 25;

/// Where each following window of the cascade is placed.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    IntoPrimitive,
    TryFromPrimitive,
    strum_macros::Display
)]
#[repr(u8)]
pub enum CascadeDirection {
    NorthWest = 0,
    North = 1,
    NorthEast = 2,
    East = 3,
    #[default]
    SouthEast = 4,
    South = 5,
    SouthWest = 6,
    West = 7,
}

impl CascadeDirection {
    /// Vertical and horizontal step signs.
    fn steps(self) -> (i32, i32) {
        match self {
            CascadeDirection::NorthWest => (-1, -1),
            CascadeDirection::North => (-1, 0),
            CascadeDirection::NorthEast => (-1, 1),
            CascadeDirection::East => (0, 1),
            CascadeDirection::SouthEast => (1, 1),
            CascadeDirection::South => (1, 0),
            CascadeDirection::SouthWest => (1, -1),
            CascadeDirection::West => (0, -1),
        }
    }

    fn turn(self, step: i8) -> Self {
        let next = (u8::from(self) as i8 + step).rem_euclid(8) as u8;
        CascadeDirection::try_from(next).unwrap_or_default()
    }
}

/// Equally sized windows, each offset from the previous one.
#[derive(Debug, Clone, Default)]
pub struct CascadeLayoutSystem {
    direction: CascadeDirection,
}

impl CascadeLayoutSystem {
    pub fn direction(&self) -> CascadeDirection { self.direction }
}

impl LayoutSystem for CascadeLayoutSystem {
    fn kind(&self) -> LayoutKind { LayoutKind::Cascade }

    fn description(&self) -> String { format!("Cascade [{}]", self.direction) }

    fn apply(&mut self, _ctx: &mut LayoutContext, tiles: &mut [&mut Window], area: Rect, _gap: i32) {
        let (vertical, horizontal) = self.direction.steps();
        let extra = (tiles.len() as i32 - 1).max(0);
        // Long cascades shrink the offset so every window keeps half the area.
        let step = if extra == 0 {
            STEP
        } else {
            STEP.min(area.width.min(area.height) / (2 * extra))
        };
        let width = if horizontal != 0 { area.width - step * extra } else { area.width };
        let height = if vertical != 0 { area.height - step * extra } else { area.height };
        let mut x = if horizontal >= 0 { area.x } else { area.max_x() - width };
        let mut y = if vertical >= 0 { area.y } else { area.max_y() - height };
        for tile in tiles.iter_mut() {
            tile.set_state(WindowState::Tiled);
            tile.geometry = Rect::new(x, y, width, height);
            x += horizontal * step;
            y += vertical * step;
        }
    }

    fn handle_shortcut(&mut self, ctx: &mut LayoutContext, command: &LayoutCommand) -> bool {
        match command {
            LayoutCommand::Increase => self.direction = self.direction.turn(1),
            LayoutCommand::Decrease => self.direction = self.direction.turn(-1),
            _ => return false,
        }
        ctx.requests.push(LayoutRequest::Notify(self.description()));
        true
    }
}
